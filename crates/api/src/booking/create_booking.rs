use super::{subscribers::NotifyParticipantOnBookingCreated, BookingChange};
use crate::error::CreneauError;
use crate::shared::{
    auth::{protect_route, resolve_actor_standing},
    usecase::{execute, Subscriber, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use creneau_api_structs::create_booking::*;
use creneau_domain::{Actor, Booking, ID};
use creneau_infra::{BookingStoreError, CreneauContext};

pub async fn create_booking_controller(
    http_req: HttpRequest,
    body: web::Json<RequestBody>,
    ctx: web::Data<CreneauContext>,
) -> Result<HttpResponse, CreneauError> {
    let actor = protect_route(&http_req, &ctx).await?;

    let usecase = CreateBookingUseCase {
        actor,
        participant_id: body.participant_id,
        slot_id: body.slot_id,
    };

    execute(usecase, &ctx)
        .await
        .map(|change| HttpResponse::Created().json(APIResponse::new(change.booking, change.slot)))
        .map_err(CreneauError::from)
}

/// Books `slot_id` for `participant_id`, either by the participant itself or
/// by someone standing for it
#[derive(Debug)]
pub struct CreateBookingUseCase {
    pub actor: Actor,
    pub participant_id: ID,
    pub slot_id: ID,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    SlotNotFound(ID),
    ParticipantNotFound(ID),
    CampaignReadOnly,
    AuthorizationDenied,
    ParticipantInactive,
    AlreadyBooked,
    SlotLocked,
    SlotFull,
    StorageError,
}

impl From<UseCaseError> for CreneauError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::SlotNotFound(id) => {
                Self::NotFound(format!("The slot with id: {}, was not found.", id))
            }
            UseCaseError::ParticipantNotFound(id) => {
                Self::NotFound(format!("The participant with id: {}, was not found.", id))
            }
            UseCaseError::CampaignReadOnly => {
                Self::Conflict("The campaign is archived and can no longer be modified".into())
            }
            UseCaseError::AuthorizationDenied => {
                Self::Forbidden("You are not allowed to book for this participant".into())
            }
            UseCaseError::ParticipantInactive => {
                Self::Conflict("The participant is no longer active".into())
            }
            UseCaseError::AlreadyBooked => Self::Conflict(
                "The participant already has a confirmed booking in this campaign".into(),
            ),
            UseCaseError::SlotLocked => {
                Self::Conflict("The slot is locked and can no longer be booked".into())
            }
            UseCaseError::SlotFull => Self::Conflict("The slot is full".into()),
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

impl From<BookingStoreError> for UseCaseError {
    fn from(e: BookingStoreError) -> Self {
        match e {
            BookingStoreError::SlotFull => Self::SlotFull,
            BookingStoreError::AlreadyBooked => Self::AlreadyBooked,
            BookingStoreError::SlotLocked => Self::SlotLocked,
            _ => Self::StorageError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for CreateBookingUseCase {
    type Response = BookingChange;

    type Error = UseCaseError;

    const NAME: &'static str = "CreateBooking";

    async fn execute(&mut self, ctx: &CreneauContext) -> Result<Self::Response, Self::Error> {
        let slot = ctx
            .repos
            .slots
            .find(&self.slot_id)
            .await
            .ok_or(UseCaseError::SlotNotFound(self.slot_id))?;
        let campaign = ctx
            .repos
            .campaigns
            .find(&slot.campaign_id)
            .await
            .ok_or(UseCaseError::StorageError)?;
        if campaign.is_read_only() {
            return Err(UseCaseError::CampaignReadOnly);
        }

        let participant = ctx
            .repos
            .participants
            .find(&self.participant_id)
            .await
            .ok_or(UseCaseError::ParticipantNotFound(self.participant_id))?;
        let acted_as = resolve_actor_standing(&self.actor, &participant, ctx)
            .await
            .positioning()
            .ok_or(UseCaseError::AuthorizationDenied)?;
        if !participant.active {
            return Err(UseCaseError::ParticipantInactive);
        }

        if ctx
            .repos
            .bookings
            .find_confirmed_by_participant(&participant.id, &campaign.id)
            .await
            .is_some()
        {
            return Err(UseCaseError::AlreadyBooked);
        }
        if slot.is_locked(ctx.today(), ctx.config.lock_window_days) {
            return Err(UseCaseError::SlotLocked);
        }

        let booking = Booking::new(
            participant.id,
            &slot,
            acted_as,
            ctx.sys.get_timestamp_millis(),
        );
        ctx.repos.bookings.insert_confirmed(&booking).await?;

        ctx.emit_audit(
            self.actor.audit_name(),
            format!(
                "Created booking {} for participant {} on slot {}",
                booking.id, participant.id, slot.id
            ),
        );

        Ok(BookingChange {
            booking,
            participant,
            slot,
            previous_slot: None,
            campaign,
            acted_as,
        })
    }

    fn subscribers() -> Vec<Box<dyn Subscriber<Self>>> {
        vec![Box::new(NotifyParticipantOnBookingCreated)]
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::booking::cancel_booking::CancelBookingUseCase;
    use crate::test_utils::{as_actor, setup, TestContext};
    use creneau_domain::{NotificationKind, Participant, Positioning, Slot};
    use futures::future::join_all;

    async fn book(
        test: &TestContext,
        actor: Actor,
        participant: &Participant,
        slot: &Slot,
    ) -> Result<BookingChange, UseCaseError> {
        execute(
            CreateBookingUseCase {
                actor,
                participant_id: participant.id,
                slot_id: slot.id,
            },
            &test.ctx,
        )
        .await
    }

    #[actix_web::test]
    async fn self_booking_is_confirmed_and_notified() {
        let test = setup().await;
        let slot = test.insert_slot(10, 1).await;
        let alice = test.insert_participant("Alice", "IT").await;

        let change = book(&test, as_actor(&alice), &alice, &slot).await.unwrap();
        assert!(change.booking.is_confirmed());
        assert_eq!(change.booking.positioning, Positioning::SelfService);
        assert_eq!(change.booking.created, crate::test_utils::NOW);

        let sent = test.sender.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, alice.id);
        assert_eq!(sent[0].1.kind, NotificationKind::Confirmation);
        assert_eq!(test.audit.entries().len(), 1);
        assert_eq!(test.audit.entries()[0].who, format!("participant:{}", alice.id));
    }

    #[actix_web::test]
    async fn full_slot_frees_up_after_cancellation() {
        let test = setup().await;
        let slot = test.insert_slot(10, 2).await;
        let p1 = test.insert_participant("P1", "IT").await;
        let p2 = test.insert_participant("P2", "IT").await;
        let p3 = test.insert_participant("P3", "IT").await;

        let b1 = book(&test, as_actor(&p1), &p1, &slot).await.unwrap();
        book(&test, as_actor(&p2), &p2, &slot).await.unwrap();
        let res = book(&test, as_actor(&p3), &p3, &slot).await;
        assert_eq!(res.unwrap_err(), UseCaseError::SlotFull);

        execute(
            CancelBookingUseCase {
                actor: as_actor(&p1),
                booking_id: b1.booking.id,
            },
            &test.ctx,
        )
        .await
        .unwrap();
        assert!(book(&test, as_actor(&p3), &p3, &slot).await.is_ok());
    }

    #[actix_web::test]
    async fn second_booking_in_campaign_is_rejected() {
        let test = setup().await;
        let slot = test.insert_slot(10, 5).await;
        let other_slot = test.insert_slot(11, 5).await;
        let alice = test.insert_participant("Alice", "IT").await;

        book(&test, as_actor(&alice), &alice, &slot).await.unwrap();
        let res = book(&test, as_actor(&alice), &alice, &other_slot).await;
        assert_eq!(res.unwrap_err(), UseCaseError::AlreadyBooked);
    }

    #[actix_web::test]
    async fn slot_within_lock_window_is_rejected() {
        let test = setup().await;
        let alice = test.insert_participant("Alice", "IT").await;

        let tomorrow = test.insert_slot(1, 5).await;
        let res = book(&test, as_actor(&alice), &alice, &tomorrow).await;
        assert_eq!(res.unwrap_err(), UseCaseError::SlotLocked);

        let mut manually_locked = test.slot_in_days(10);
        manually_locked.locked = true;
        test.ctx
            .repos
            .slots
            .bulk_insert(&[manually_locked.clone()])
            .await
            .unwrap();
        let res = book(&test, as_actor(&alice), &alice, &manually_locked).await;
        assert_eq!(res.unwrap_err(), UseCaseError::SlotLocked);
        assert!(test.sender.sent().is_empty());
    }

    #[actix_web::test]
    async fn archived_campaign_is_read_only() {
        let mut test = setup().await;
        let slot = test.insert_slot(10, 1).await;
        let alice = test.insert_participant("Alice", "IT").await;
        test.archive_campaign().await;

        let res = book(&test, as_actor(&alice), &alice, &slot).await;
        assert_eq!(res.unwrap_err(), UseCaseError::CampaignReadOnly);
    }

    #[actix_web::test]
    async fn manager_books_for_report() {
        let test = setup().await;
        let slot = test.insert_slot(10, 1).await;
        let manager = test.insert_participant("Manager", "IT").await;
        let mut report = Participant::new("Report", "IT");
        report.manager_id = Some(manager.id);
        test.ctx.repos.participants.insert(&report).await.unwrap();

        let change = book(&test, as_actor(&manager), &report, &slot).await.unwrap();
        assert_eq!(
            change.booking.positioning,
            Positioning::Manager {
                manager_id: manager.id,
                actor_id: None
            }
        );

        // The participant is notified, not the manager
        let sent = test.sender.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, report.id);
        assert!(sent[0].1.body.contains("par votre responsable"));

        // A report cannot book for its manager
        let res = book(&test, as_actor(&report), &manager, &slot).await;
        assert_eq!(res.unwrap_err(), UseCaseError::AuthorizationDenied);
    }

    #[actix_web::test]
    async fn coordinator_books_within_perimeter_only() {
        let test = setup().await;
        let slot = test.insert_slot(10, 5).await;
        let coordinator = test.insert_coordinator("IT").await;
        let it = test.insert_participant("Alice", "IT").await;
        let hr = test.insert_participant("Bob", "RH").await;

        let change = book(&test, Actor::Internal(coordinator.clone()), &it, &slot)
            .await
            .unwrap();
        assert_eq!(
            change.booking.positioning,
            Positioning::Coordinator {
                actor_id: coordinator.id
            }
        );
        assert_eq!(
            test.audit.entries()[0].who,
            format!("actor:{}", coordinator.id)
        );

        let res = book(&test, Actor::Internal(coordinator), &hr, &slot).await;
        assert_eq!(res.unwrap_err(), UseCaseError::AuthorizationDenied);
    }

    #[actix_web::test]
    async fn inactive_participant_cannot_book() {
        let test = setup().await;
        let slot = test.insert_slot(10, 1).await;
        let coordinator = test.insert_coordinator("IT").await;
        let mut alice = test.insert_participant("Alice", "IT").await;
        alice.active = false;
        test.ctx.repos.participants.save(&alice).await.unwrap();

        let res = book(&test, Actor::Internal(coordinator), &alice, &slot).await;
        assert_eq!(res.unwrap_err(), UseCaseError::ParticipantInactive);
    }

    #[actix_web::test]
    async fn unknown_slot_and_participant() {
        let test = setup().await;
        let slot = test.insert_slot(10, 1).await;
        let alice = test.insert_participant("Alice", "IT").await;

        let unknown_slot = test.slot_in_days(10);
        let res = book(&test, as_actor(&alice), &alice, &unknown_slot).await;
        assert_eq!(res.unwrap_err(), UseCaseError::SlotNotFound(unknown_slot.id));

        let stranger = Participant::new("Stranger", "IT");
        let res = book(&test, as_actor(&alice), &stranger, &slot).await;
        assert_eq!(res.unwrap_err(), UseCaseError::ParticipantNotFound(stranger.id));
    }

    #[actix_web::test]
    async fn concurrent_bookings_fill_slot_exactly() {
        let test = setup().await;
        let slot = test.insert_slot(10, 3).await;
        let mut participants = Vec::new();
        for i in 0..8 {
            participants.push(test.insert_participant(&format!("P{}", i), "IT").await);
        }

        let results = join_all(
            participants
                .iter()
                .map(|p| book(&test, as_actor(p), p, &slot)),
        )
        .await;

        let confirmed = results.iter().filter(|r| r.is_ok()).count();
        let full = results
            .iter()
            .filter(|r| matches!(r, Err(UseCaseError::SlotFull)))
            .count();
        assert_eq!(confirmed, 3);
        assert_eq!(full, 5);
        let counts = test
            .ctx
            .repos
            .bookings
            .count_confirmed_by_slots(&[slot.id])
            .await
            .unwrap();
        assert_eq!(counts.get(&slot.id), Some(&3));
    }
}
