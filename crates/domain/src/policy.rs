use serde::{Deserialize, Serialize};

/// A Policy is set on an `InternalActor` and decides which administrative
/// actions it can and cannot take.
///
/// Booking on behalf of a `Participant` is not governed by the `Policy` but by
/// the actor's standing towards that participant (see `resolve_standing`).
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Policy {
    /// `Permission`s allowed by the `Policy`
    pub allow: Option<Vec<Permission>>,
    /// `Permission`s rejected by the `Policy`
    pub reject: Option<Vec<Permission>>,
}

impl Policy {
    pub fn allow_all() -> Self {
        Self {
            allow: Some(vec![Permission::All]),
            reject: None,
        }
    }

    /// Checks if this `Policy` has the right to list of `Permission`s
    pub fn authorize(&self, permissions: &[Permission]) -> bool {
        if permissions.is_empty() {
            return true;
        }

        if let Some(rejected) = &self.reject {
            for rejected_permission in rejected {
                if *rejected_permission == Permission::All
                    || permissions.contains(rejected_permission)
                {
                    return false;
                }
            }
        }

        match &self.allow {
            Some(allowed) if allowed.contains(&Permission::All) => true,
            Some(allowed) => permissions.iter().all(|p| allowed.contains(p)),
            None => false,
        }
    }
}

/// `Permission` are the administrative actions an `InternalActor` can perform.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum Permission {
    #[serde(rename = "*")]
    All,
    ManageSlots,
    ExportBookings,
    InviteParticipants,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn permissions() {
        let policy = Policy::default();
        assert!(policy.authorize(&[]));
        assert!(!policy.authorize(&[Permission::ManageSlots]));

        let policy = Policy::allow_all();
        assert!(policy.authorize(&[Permission::ManageSlots]));

        let policy = Policy {
            allow: Some(vec![Permission::All]),
            reject: Some(vec![Permission::ExportBookings]),
        };
        assert!(policy.authorize(&[Permission::ManageSlots]));
        assert!(!policy.authorize(&[Permission::ManageSlots, Permission::ExportBookings]));

        let policy = Policy {
            allow: Some(vec![Permission::ManageSlots]),
            reject: Some(vec![Permission::All]),
        };
        assert!(!policy.authorize(&[Permission::ManageSlots]));

        let policy = Policy {
            allow: Some(vec![Permission::ManageSlots, Permission::InviteParticipants]),
            reject: None,
        };
        assert!(policy.authorize(&[Permission::InviteParticipants]));
        assert!(!policy.authorize(&[Permission::ExportBookings]));
    }

    #[test]
    fn deserializes_wildcard() {
        let policy: Policy = serde_json::from_str(r#"{"allow":["*"],"reject":null}"#).unwrap();
        assert_eq!(policy, Policy::allow_all());
    }
}
