use crate::{
    booking::Positioning,
    participant::Participant,
    policy::Policy,
    shared::entity::{Entity, ID},
};

/// A member of staff authenticated by the rest of the system (as opposed to a
/// `Participant` using its personal access token).
#[derive(Debug, Clone, PartialEq)]
pub struct InternalActor {
    pub id: ID,
    pub name: String,
    /// The `Participant` record of this actor, if it is also an agent.
    /// This is what makes an `InternalActor` the manager of other participants.
    pub participant_id: Option<ID>,
    pub api_key: String,
    pub policy: Policy,
}

impl InternalActor {
    pub fn new(name: &str) -> Self {
        Self {
            id: Default::default(),
            name: name.to_string(),
            participant_id: None,
            api_key: creneau_utils::create_random_secret(32),
            policy: Default::default(),
        }
    }
}

impl Entity for InternalActor {
    fn id(&self) -> &ID {
        &self.id
    }
}

/// The authenticated caller of a booking operation
#[derive(Debug, Clone)]
pub enum Actor {
    /// A participant identified by its personal access token
    Participant(Participant),
    Internal(InternalActor),
}

impl Actor {
    /// Identifier used in audit entries
    pub fn audit_name(&self) -> String {
        match self {
            Self::Participant(p) => format!("participant:{}", p.id),
            Self::Internal(a) => format!("actor:{}", a.id),
        }
    }
}

/// Scope (a service, optionally narrowed to one site) within which an
/// `InternalActor` may act as coordinator.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinatorPerimeter {
    pub id: ID,
    pub actor_id: ID,
    pub service: String,
    /// `None` means the whole service
    pub site: Option<String>,
}

impl CoordinatorPerimeter {
    pub fn new(actor_id: ID, service: &str, site: Option<&str>) -> Self {
        Self {
            id: Default::default(),
            actor_id,
            service: service.to_string(),
            site: site.map(String::from),
        }
    }

    pub fn covers(&self, participant: &Participant) -> bool {
        if self.service != participant.service {
            return false;
        }
        match &self.site {
            None => true,
            Some(site) => participant.site.as_ref() == Some(site),
        }
    }
}

impl Entity for CoordinatorPerimeter {
    fn id(&self) -> &ID {
        &self.id
    }
}

/// How an `Actor` stands towards a target `Participant`
#[derive(Debug, Clone, PartialEq)]
pub enum ActorStanding {
    SelfService,
    Manager {
        manager_id: ID,
        actor_id: Option<ID>,
    },
    Coordinator {
        actor_id: ID,
        perimeter: CoordinatorPerimeter,
    },
    Denied,
}

impl ActorStanding {
    pub fn is_denied(&self) -> bool {
        matches!(self, Self::Denied)
    }

    pub fn is_self(&self) -> bool {
        matches!(self, Self::SelfService)
    }

    /// How a `Booking` made with this standing is positioned, `None` if denied
    pub fn positioning(&self) -> Option<Positioning> {
        match self {
            Self::SelfService => Some(Positioning::SelfService),
            Self::Manager {
                manager_id,
                actor_id,
            } => Some(Positioning::Manager {
                manager_id: *manager_id,
                actor_id: *actor_id,
            }),
            Self::Coordinator { actor_id, .. } => Some(Positioning::Coordinator {
                actor_id: *actor_id,
            }),
            Self::Denied => None,
        }
    }
}

/// Decides whether `actor` may act for `target` and in which capacity.
///
/// Evaluated in the order self, manager, coordinator and the first match wins.
/// `perimeters` are the coordinator perimeters held by the actor, they are
/// ignored for participant actors.
pub fn resolve_standing(
    actor: &Actor,
    target: &Participant,
    perimeters: &[CoordinatorPerimeter],
) -> ActorStanding {
    match actor {
        Actor::Participant(participant) => {
            if participant.access_token == target.access_token {
                ActorStanding::SelfService
            } else if target.manager() == Some(&participant.id) {
                ActorStanding::Manager {
                    manager_id: participant.id,
                    actor_id: None,
                }
            } else {
                ActorStanding::Denied
            }
        }
        Actor::Internal(internal) => {
            if let Some(own_participant_id) = &internal.participant_id {
                if *own_participant_id == target.id {
                    return ActorStanding::SelfService;
                }
                if target.manager() == Some(own_participant_id) {
                    return ActorStanding::Manager {
                        manager_id: *own_participant_id,
                        actor_id: Some(internal.id),
                    };
                }
            }
            match perimeters
                .iter()
                .find(|p| p.actor_id == internal.id && p.covers(target))
            {
                Some(perimeter) => ActorStanding::Coordinator {
                    actor_id: internal.id,
                    perimeter: perimeter.clone(),
                },
                None => ActorStanding::Denied,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participant(service: &str, site: Option<&str>) -> Participant {
        let mut p = Participant::new("Agent", service);
        p.site = site.map(String::from);
        p
    }

    #[test]
    fn participant_token_is_self() {
        let target = participant("IT", None);
        let actor = Actor::Participant(target.clone());
        assert_eq!(
            resolve_standing(&actor, &target, &[]),
            ActorStanding::SelfService
        );

        let stranger = Actor::Participant(participant("IT", None));
        assert!(resolve_standing(&stranger, &target, &[]).is_denied());
    }

    #[test]
    fn direct_manager_only() {
        let boss = participant("IT", None);
        let mut manager = participant("IT", None);
        manager.manager_id = Some(boss.id);
        let mut target = participant("IT", None);
        target.manager_id = Some(manager.id);

        let standing = resolve_standing(&Actor::Participant(manager.clone()), &target, &[]);
        assert_eq!(
            standing,
            ActorStanding::Manager {
                manager_id: manager.id,
                actor_id: None
            }
        );

        // No transitive delegation
        assert!(resolve_standing(&Actor::Participant(boss), &target, &[]).is_denied());
    }

    #[test]
    fn internal_actor_linked_to_manager_record() {
        let manager = participant("IT", None);
        let mut target = participant("IT", None);
        target.manager_id = Some(manager.id);

        let mut internal = InternalActor::new("Manager");
        internal.participant_id = Some(manager.id);
        let standing = resolve_standing(&Actor::Internal(internal.clone()), &target, &[]);
        assert_eq!(
            standing,
            ActorStanding::Manager {
                manager_id: manager.id,
                actor_id: Some(internal.id)
            }
        );

        // Acting on its own record
        let standing = resolve_standing(&Actor::Internal(internal), &manager, &[]);
        assert!(standing.is_self());
    }

    #[test]
    fn coordinator_perimeter_matching() {
        let internal = InternalActor::new("Coordinator");
        let service_wide = CoordinatorPerimeter::new(internal.id, "IT", None);
        let site_only = CoordinatorPerimeter::new(internal.id, "HR", Some("Lyon"));
        let perimeters = vec![service_wide.clone(), site_only.clone()];
        let actor = Actor::Internal(internal.clone());

        let it_paris = participant("IT", Some("Paris"));
        assert_eq!(
            resolve_standing(&actor, &it_paris, &perimeters),
            ActorStanding::Coordinator {
                actor_id: internal.id,
                perimeter: service_wide
            }
        );

        let hr_lyon = participant("HR", Some("Lyon"));
        assert_eq!(
            resolve_standing(&actor, &hr_lyon, &perimeters),
            ActorStanding::Coordinator {
                actor_id: internal.id,
                perimeter: site_only
            }
        );

        let hr_paris = participant("HR", Some("Paris"));
        assert!(resolve_standing(&actor, &hr_paris, &perimeters).is_denied());

        let finance = participant("Finance", None);
        assert!(resolve_standing(&actor, &finance, &perimeters).is_denied());

        // Perimeters of another actor do not count
        let other = Actor::Internal(InternalActor::new("Other"));
        assert!(resolve_standing(&other, &it_paris, &perimeters).is_denied());
    }

    #[test]
    fn manager_wins_over_coordinator() {
        let manager = participant("IT", None);
        let mut target = participant("IT", None);
        target.manager_id = Some(manager.id);

        let mut internal = InternalActor::new("Both");
        internal.participant_id = Some(manager.id);
        let perimeters = vec![CoordinatorPerimeter::new(internal.id, "IT", None)];

        let standing = resolve_standing(&Actor::Internal(internal), &target, &perimeters);
        assert!(matches!(standing, ActorStanding::Manager { .. }));
    }
}
