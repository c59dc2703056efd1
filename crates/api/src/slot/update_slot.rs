use crate::error::CreneauError;
use crate::notification::dispatcher::dispatch;
use crate::shared::{
    auth::protect_internal_route,
    usecase::{execute_with_policy, PermissionBoundary, Subscriber, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{NaiveDate, NaiveTime};
use creneau_api_structs::update_slot::*;
use creneau_domain::{NotificationContent, NotificationKind, Permission, Slot, TimeWindow, ID};
use creneau_infra::{CreneauContext, SlotStoreError};

pub async fn update_slot_controller(
    http_req: HttpRequest,
    path: web::Path<PathParams>,
    body: web::Json<RequestBody>,
    ctx: web::Data<CreneauContext>,
) -> Result<HttpResponse, CreneauError> {
    let actor = protect_internal_route(&http_req, &ctx).await?;

    let body = body.0;
    let usecase = UpdateSlotUseCase {
        slot_id: path.slot_id,
        date: body.date,
        start_time: body.start_time,
        end_time: body.end_time,
        capacity: body.capacity,
        location: body.location,
        actor_name: actor.name.clone(),
    };

    execute_with_policy(usecase, &actor.policy, &ctx)
        .await
        .map(|updated| HttpResponse::Ok().json(APIResponse::new(updated.slot)))
        .map_err(CreneauError::from)
}

#[derive(Debug, Default)]
pub struct UpdateSlotUseCase {
    pub slot_id: ID,
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub capacity: Option<i64>,
    pub location: Option<String>,
    pub actor_name: String,
}

#[derive(Debug)]
pub struct UpdatedSlot {
    pub slot: Slot,
    pub previous: Slot,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    SlotNotFound(ID),
    CampaignReadOnly,
    SlotLocked,
    OutsideCampaign,
    InvalidTimeWindow,
    InvalidCapacity(i64),
    CapacityBelowBookings(i64),
    StorageError,
}

impl From<UseCaseError> for CreneauError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::SlotNotFound(id) => {
                Self::NotFound(format!("The slot with id: {}, was not found.", id))
            }
            UseCaseError::CampaignReadOnly => {
                Self::Conflict("The campaign is archived and can no longer be modified".into())
            }
            UseCaseError::SlotLocked => {
                Self::Conflict("The slot is locked and can no longer be modified".into())
            }
            UseCaseError::OutsideCampaign => {
                Self::BadClientData("The date must be within the campaign dates".into())
            }
            UseCaseError::InvalidTimeWindow => {
                Self::BadClientData("The slot must end after it starts".into())
            }
            UseCaseError::InvalidCapacity(capacity) => Self::BadClientData(format!(
                "The capacity must be positive, got {}",
                capacity
            )),
            UseCaseError::CapacityBelowBookings(confirmed) => Self::Conflict(format!(
                "The slot has {} confirmed bookings, its capacity cannot go below that",
                confirmed
            )),
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for UpdateSlotUseCase {
    type Response = UpdatedSlot;

    type Error = UseCaseError;

    const NAME: &'static str = "UpdateSlot";

    async fn execute(&mut self, ctx: &CreneauContext) -> Result<Self::Response, Self::Error> {
        let previous = ctx
            .repos
            .slots
            .find(&self.slot_id)
            .await
            .ok_or(UseCaseError::SlotNotFound(self.slot_id))?;
        let campaign = match ctx.repos.campaigns.find(&previous.campaign_id).await {
            Some(campaign) if !campaign.is_read_only() => campaign,
            Some(_) => return Err(UseCaseError::CampaignReadOnly),
            None => return Err(UseCaseError::StorageError),
        };
        if previous.is_locked(ctx.today(), ctx.config.lock_window_days) {
            return Err(UseCaseError::SlotLocked);
        }

        let mut slot = previous.clone();
        if let Some(date) = self.date {
            if date < campaign.start_date || date > campaign.end_date {
                return Err(UseCaseError::OutsideCampaign);
            }
            slot.date = date;
        }
        if let Some(start_time) = self.start_time {
            slot.start_time = start_time;
        }
        if let Some(end_time) = self.end_time {
            slot.end_time = end_time;
        }
        if let Some(location) = &self.location {
            slot.location = location.clone();
        }
        if let Some(capacity) = self.capacity {
            if capacity <= 0 {
                return Err(UseCaseError::InvalidCapacity(capacity));
            }
            slot.capacity = capacity;
        }
        if !TimeWindow::new(slot.start_time, slot.end_time).is_valid() {
            return Err(UseCaseError::InvalidTimeWindow);
        }

        let slot = ctx.repos.slots.update(&slot).await.map_err(|e| match e {
            SlotStoreError::CapacityBelowBookings(confirmed) => {
                UseCaseError::CapacityBelowBookings(confirmed)
            }
            SlotStoreError::NotFound => UseCaseError::SlotNotFound(self.slot_id),
            _ => UseCaseError::StorageError,
        })?;

        ctx.emit_audit(self.actor_name.clone(), format!("Updated slot {}", slot.id));
        Ok(UpdatedSlot { slot, previous })
    }

    fn subscribers() -> Vec<Box<dyn Subscriber<Self>>> {
        vec![Box::new(NotifyParticipantsOnSlotRescheduled)]
    }
}

impl PermissionBoundary for UpdateSlotUseCase {
    fn permissions(&self) -> Vec<Permission> {
        vec![Permission::ManageSlots]
    }
}

/// Participants booked on a slot whose date or time changed are told about it
pub struct NotifyParticipantsOnSlotRescheduled;

#[async_trait::async_trait(?Send)]
impl Subscriber<UpdateSlotUseCase> for NotifyParticipantsOnSlotRescheduled {
    async fn notify(&self, updated: &UpdatedSlot, ctx: &CreneauContext) {
        if updated.slot.same_schedule(&updated.previous) {
            return;
        }
        let campaign = match ctx.repos.campaigns.find(&updated.slot.campaign_id).await {
            Some(campaign) => campaign,
            None => return,
        };

        let bookings = ctx
            .repos
            .bookings
            .find_confirmed_by_campaign(&campaign.id)
            .await
            .into_iter()
            .filter(|b| b.slot_id == updated.slot.id)
            .collect::<Vec<_>>();
        let participant_ids = bookings.iter().map(|b| b.participant_id).collect::<Vec<_>>();
        let participants = ctx.repos.participants.find_many(&participant_ids).await;

        for booking in bookings {
            let participant = match participants.iter().find(|p| p.id == booking.participant_id) {
                Some(participant) => participant,
                None => continue,
            };
            let content = NotificationContent::for_booking(
                NotificationKind::Modification,
                participant,
                &updated.slot,
                &campaign,
                &booking.positioning,
            );
            dispatch(
                ctx,
                participant,
                NotificationKind::Modification,
                Some(booking.id),
                content,
            )
            .await;
        }
    }
}
