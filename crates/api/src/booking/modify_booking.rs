use super::{subscribers::NotifyParticipantOnBookingModified, BookingChange};
use crate::error::CreneauError;
use crate::shared::{
    auth::{protect_route, resolve_actor_standing},
    usecase::{execute, Subscriber, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use creneau_api_structs::modify_booking::*;
use creneau_domain::{Actor, ID};
use creneau_infra::{BookingStoreError, CreneauContext};

pub async fn modify_booking_controller(
    http_req: HttpRequest,
    path: web::Path<PathParams>,
    body: web::Json<RequestBody>,
    ctx: web::Data<CreneauContext>,
) -> Result<HttpResponse, CreneauError> {
    let actor = protect_route(&http_req, &ctx).await?;

    let usecase = ModifyBookingUseCase {
        actor,
        booking_id: path.booking_id,
        slot_id: body.slot_id,
    };

    execute(usecase, &ctx)
        .await
        .map(|change| HttpResponse::Ok().json(APIResponse::new(change.booking, change.slot)))
        .map_err(CreneauError::from)
}

/// Moves a confirmed booking to another slot of the same campaign, the
/// booking keeps its identity
#[derive(Debug)]
pub struct ModifyBookingUseCase {
    pub actor: Actor,
    pub booking_id: ID,
    pub slot_id: ID,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    BookingNotFound(ID),
    SlotNotFound(ID),
    SlotNotInCampaign,
    CampaignReadOnly,
    AuthorizationDenied,
    BookingNotActive,
    SlotLocked,
    SlotFull,
    StorageError,
}

impl From<UseCaseError> for CreneauError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::BookingNotFound(id) => {
                Self::NotFound(format!("The booking with id: {}, was not found.", id))
            }
            UseCaseError::SlotNotFound(id) => {
                Self::NotFound(format!("The slot with id: {}, was not found.", id))
            }
            UseCaseError::SlotNotInCampaign => Self::BadClientData(
                "A booking can only be moved to a slot of its own campaign".into(),
            ),
            UseCaseError::CampaignReadOnly => {
                Self::Conflict("The campaign is archived and can no longer be modified".into())
            }
            UseCaseError::AuthorizationDenied => {
                Self::Forbidden("You are not allowed to modify this booking".into())
            }
            UseCaseError::BookingNotActive => {
                Self::Conflict("The booking is cancelled and can no longer be modified".into())
            }
            UseCaseError::SlotLocked => Self::Conflict(
                "The current or the requested slot is locked, the booking cannot be moved".into(),
            ),
            UseCaseError::SlotFull => Self::Conflict("The requested slot is full".into()),
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for ModifyBookingUseCase {
    type Response = BookingChange;

    type Error = UseCaseError;

    const NAME: &'static str = "ModifyBooking";

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

        let today = ctx.today();
        let lock_window_days = ctx.config.lock_window_days;
        let current_slot = ctx
            .repos
            .slots
            .find(&booking.slot_id)
            .await
            .ok_or(UseCaseError::StorageError)?;
        if current_slot.is_locked(today, lock_window_days) {
            return Err(UseCaseError::SlotLocked);
        }

        let slot = ctx
            .repos
            .slots
            .find(&self.slot_id)
            .await
            .ok_or(UseCaseError::SlotNotFound(self.slot_id))?;
        if slot.campaign_id != campaign.id {
            return Err(UseCaseError::SlotNotInCampaign);
        }
        if slot.is_locked(today, lock_window_days) {
            return Err(UseCaseError::SlotLocked);
        }

        let booking = ctx
            .repos
            .bookings
            .move_to_slot(
                &booking.id,
                &slot.id,
                acted_as,
                ctx.sys.get_timestamp_millis(),
            )
            .await
            .map_err(|e| match e {
                BookingStoreError::SlotFull => UseCaseError::SlotFull,
                BookingStoreError::SlotLocked => UseCaseError::SlotLocked,
                BookingStoreError::NotConfirmed => UseCaseError::BookingNotActive,
                BookingStoreError::BookingNotFound => UseCaseError::BookingNotFound(self.booking_id),
                BookingStoreError::SlotNotFound => UseCaseError::SlotNotFound(self.slot_id),
                _ => UseCaseError::StorageError,
            })?;

        ctx.emit_audit(
            self.actor.audit_name(),
            format!(
                "Moved booking {} from slot {} to slot {}",
                booking.id, current_slot.id, slot.id
            ),
        );

        Ok(BookingChange {
            booking,
            participant,
            slot,
            previous_slot: Some(current_slot),
            campaign,
            acted_as,
        })
    }

    fn subscribers() -> Vec<Box<dyn Subscriber<Self>>> {
        vec![Box::new(NotifyParticipantOnBookingModified)]
    }
}
