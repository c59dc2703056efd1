use crate::error::CreneauError;
use crate::shared::{
    auth::protect_internal_route,
    usecase::{execute_with_policy, PermissionBoundary, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use creneau_api_structs::set_slot_lock::*;
use creneau_domain::{Permission, Slot, ID};
use creneau_infra::{CreneauContext, SlotStoreError};

pub async fn set_slot_lock_controller(
    http_req: HttpRequest,
    path: web::Path<PathParams>,
    body: web::Json<RequestBody>,
    ctx: web::Data<CreneauContext>,
) -> Result<HttpResponse, CreneauError> {
    let actor = protect_internal_route(&http_req, &ctx).await?;

    let usecase = SetSlotLockUseCase {
        slot_id: path.slot_id,
        locked: body.locked,
        actor_name: actor.name.clone(),
    };

    execute_with_policy(usecase, &actor.policy, &ctx)
        .await
        .map(|slot| HttpResponse::Ok().json(APIResponse::new(slot)))
        .map_err(CreneauError::from)
}

/// Manually closes (or reopens) a slot to bookings and moves
#[derive(Debug)]
pub struct SetSlotLockUseCase {
    pub slot_id: ID,
    pub locked: bool,
    pub actor_name: String,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    SlotNotFound(ID),
    CampaignReadOnly,
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
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for SetSlotLockUseCase {
    type Response = Slot;

    type Error = UseCaseError;

    const NAME: &'static str = "SetSlotLock";

    async fn execute(&mut self, ctx: &CreneauContext) -> Result<Self::Response, Self::Error> {
        let slot = ctx
            .repos
            .slots
            .find(&self.slot_id)
            .await
            .ok_or(UseCaseError::SlotNotFound(self.slot_id))?;
        match ctx.repos.campaigns.find(&slot.campaign_id).await {
            Some(campaign) if !campaign.is_read_only() => (),
            Some(_) => return Err(UseCaseError::CampaignReadOnly),
            None => return Err(UseCaseError::StorageError),
        }

        if slot.locked == self.locked {
            return Ok(slot);
        }
        let slot = ctx
            .repos
            .slots
            .set_locked(&self.slot_id, self.locked)
            .await
            .map_err(|e| match e {
                SlotStoreError::NotFound => UseCaseError::SlotNotFound(self.slot_id),
                _ => UseCaseError::StorageError,
            })?;

        let what = if slot.locked { "Locked" } else { "Unlocked" };
        ctx.emit_audit(self.actor_name.clone(), format!("{} slot {}", what, slot.id));
        Ok(slot)
    }
}

impl PermissionBoundary for SetSlotLockUseCase {
    fn permissions(&self) -> Vec<Permission> {
        vec![Permission::ManageSlots]
    }
}
