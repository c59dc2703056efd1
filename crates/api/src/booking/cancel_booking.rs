use super::{subscribers::NotifyParticipantOnBookingCancelled, BookingChange};
use crate::error::CreneauError;
use crate::shared::{
    auth::{protect_route, resolve_actor_standing},
    usecase::{execute, Subscriber, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use creneau_api_structs::cancel_booking::*;
use creneau_domain::{Actor, ID};
use creneau_infra::{BookingStoreError, CreneauContext};

pub async fn cancel_booking_controller(
    http_req: HttpRequest,
    path: web::Path<PathParams>,
    ctx: web::Data<CreneauContext>,
) -> Result<HttpResponse, CreneauError> {
    let actor = protect_route(&http_req, &ctx).await?;

    let usecase = CancelBookingUseCase {
        actor,
        booking_id: path.booking_id,
    };

    execute(usecase, &ctx)
        .await
        .map(|change| HttpResponse::Ok().json(APIResponse::new(change.booking, change.slot)))
        .map_err(CreneauError::from)
}

#[derive(Debug)]
pub struct CancelBookingUseCase {
    pub actor: Actor,
    pub booking_id: ID,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    BookingNotFound(ID),
    CampaignReadOnly,
    AuthorizationDenied,
    BookingNotActive,
    SlotLocked,
    StorageError,
}

impl From<UseCaseError> for CreneauError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::BookingNotFound(id) => {
                Self::NotFound(format!("The booking with id: {}, was not found.", id))
            }
            UseCaseError::CampaignReadOnly => {
                Self::Conflict("The campaign is archived and can no longer be modified".into())
            }
            UseCaseError::AuthorizationDenied => {
                Self::Forbidden("You are not allowed to cancel this booking".into())
            }
            UseCaseError::BookingNotActive => {
                Self::Conflict("The booking is already cancelled".into())
            }
            UseCaseError::SlotLocked => {
                Self::Conflict("The slot is locked, the booking can no longer be cancelled".into())
            }
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for CancelBookingUseCase {
    type Response = BookingChange;

    type Error = UseCaseError;

    const NAME: &'static str = "CancelBooking";

    async fn execute(&mut self, ctx: &CreneauContext) -> Result<Self::Response, Self::Error> {
        let booking = ctx
            .repos
            .bookings
            .find(&self.booking_id)
            .await
            .ok_or(UseCaseError::BookingNotFound(self.booking_id))?;
        let campaign = ctx
            .repos
            .campaigns
            .find(&booking.campaign_id)
            .await
            .ok_or(UseCaseError::StorageError)?;
        if campaign.is_read_only() {
            return Err(UseCaseError::CampaignReadOnly);
        }

        let participant = ctx
            .repos
            .participants
            .find(&booking.participant_id)
            .await
            .ok_or(UseCaseError::StorageError)?;
        let acted_as = resolve_actor_standing(&self.actor, &participant, ctx)
            .await
            .positioning()
            .ok_or(UseCaseError::AuthorizationDenied)?;
        if !booking.is_confirmed() {
            return Err(UseCaseError::BookingNotActive);
        }

        let slot = ctx
            .repos
            .slots
            .find(&booking.slot_id)
            .await
            .ok_or(UseCaseError::StorageError)?;
        if slot.is_locked(ctx.today(), ctx.config.lock_window_days) {
            return Err(UseCaseError::SlotLocked);
        }

        let booking = ctx
            .repos
            .bookings
            .cancel(&booking.id, ctx.sys.get_timestamp_millis())
            .await
            .map_err(|e| match e {
                BookingStoreError::NotConfirmed => UseCaseError::BookingNotActive,
                BookingStoreError::SlotLocked => UseCaseError::SlotLocked,
                BookingStoreError::BookingNotFound => UseCaseError::BookingNotFound(self.booking_id),
                _ => UseCaseError::StorageError,
            })?;

        ctx.emit_audit(
            self.actor.audit_name(),
            format!("Cancelled booking {} on slot {}", booking.id, slot.id),
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
        vec![Box::new(NotifyParticipantOnBookingCancelled)]
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_utils::{as_actor, setup, TestContext};
    use creneau_domain::{Booking, BookingStatus, NotificationKind, Participant, Positioning};

    async fn insert_booking(test: &TestContext, participant: &Participant, days: i64) -> Booking {
        let slot = test.insert_slot(days, 2).await;
        let booking = Booking::new(participant.id, &slot, Positioning::SelfService, 0);
        test.ctx.repos.bookings.insert_confirmed(&booking).await.unwrap();
        booking
    }

    async fn cancel(
        test: &TestContext,
        actor: Actor,
        booking: &Booking,
    ) -> Result<BookingChange, UseCaseError> {
        execute(
            CancelBookingUseCase {
                actor,
                booking_id: booking.id,
            },
            &test.ctx,
        )
        .await
    }

    #[actix_web::test]
    async fn self_cancellation_is_silent() {
        let test = setup().await;
        let alice = test.insert_participant("Alice", "IT").await;
        let booking = insert_booking(&test, &alice, 10).await;

        let change = cancel(&test, as_actor(&alice), &booking).await.unwrap();
        assert_eq!(change.booking.status, BookingStatus::Cancelled);
        assert!(test.sender.sent().is_empty());
        assert_eq!(test.audit.entries().len(), 1);

        // Terminal state
        let res = cancel(&test, as_actor(&alice), &booking).await;
        assert_eq!(res.unwrap_err(), UseCaseError::BookingNotActive);
    }

    #[actix_web::test]
    async fn manager_cancellation_notifies_participant() {
        let test = setup().await;
        let manager = test.insert_participant("Manager", "IT").await;
        let mut report = Participant::new("Report", "IT");
        report.manager_id = Some(manager.id);
        test.ctx.repos.participants.insert(&report).await.unwrap();
        let booking = insert_booking(&test, &report, 10).await;

        cancel(&test, as_actor(&manager), &booking).await.unwrap();
        let sent = test.sender.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, report.id);
        assert_eq!(sent[0].1.kind, NotificationKind::Cancellation);
    }

    #[actix_web::test]
    async fn failed_delivery_does_not_undo_cancellation() {
        let test = setup().await;
        let coordinator = test.insert_coordinator("IT").await;
        let alice = test.insert_participant("Alice", "IT").await;
        let booking = insert_booking(&test, &alice, 10).await;
        test.sender.set_failing(true);

        cancel(&test, Actor::Internal(coordinator), &booking).await.unwrap();
        assert_eq!(
            test.ctx.repos.bookings.find(&booking.id).await.unwrap().status,
            BookingStatus::Cancelled
        );
        let notifications = test
            .ctx
            .repos
            .notifications
            .find_by_booking(&booking.id)
            .await;
        assert_eq!(notifications.len(), 1);
        assert_eq!(
            notifications[0].error.as_deref(),
            Some("Mail gateway unavailable")
        );
    }

    #[actix_web::test]
    async fn locked_slot_cannot_be_cancelled() {
        let test = setup().await;
        let alice = test.insert_participant("Alice", "IT").await;
        let booking = insert_booking(&test, &alice, 1).await;

        let res = cancel(&test, as_actor(&alice), &booking).await;
        assert_eq!(res.unwrap_err(), UseCaseError::SlotLocked);
    }

    #[actix_web::test]
    async fn archived_campaign_rejects_cancellation() {
        let mut test = setup().await;
        let alice = test.insert_participant("Alice", "IT").await;
        let booking = insert_booking(&test, &alice, 10).await;
        test.archive_campaign().await;

        let res = cancel(&test, as_actor(&alice), &booking).await;
        assert_eq!(res.unwrap_err(), UseCaseError::CampaignReadOnly);
    }
}
