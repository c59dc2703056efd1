use crate::error::CreneauError;
use crate::shared::{
    auth::protect_route,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use creneau_api_structs::list_available_slots::*;
use creneau_domain::{group_available_slots, AvailableSlotsDate, ID};
use creneau_infra::CreneauContext;

pub async fn list_available_slots_controller(
    http_req: HttpRequest,
    path: web::Path<PathParams>,
    query: web::Query<QueryParams>,
    ctx: web::Data<CreneauContext>,
) -> Result<HttpResponse, CreneauError> {
    protect_route(&http_req, &ctx).await?;

    let usecase = ListAvailableSlotsUseCase {
        campaign_id: path.campaign_id,
        segment: query.0.segment,
    };

    execute(usecase, &ctx)
        .await
        .map(|dates| HttpResponse::Ok().json(APIResponse::new(dates)))
        .map_err(CreneauError::from)
}

/// Bookable slots of a campaign: neither locked nor full, grouped by date
#[derive(Debug)]
pub struct ListAvailableSlotsUseCase {
    pub campaign_id: ID,
    pub segment: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    CampaignNotFound(ID),
    StorageError,
}

impl From<UseCaseError> for CreneauError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::CampaignNotFound(id) => {
                Self::NotFound(format!("The campaign with id: {}, was not found.", id))
            }
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for ListAvailableSlotsUseCase {
    type Response = Vec<AvailableSlotsDate>;

    type Error = UseCaseError;

    const NAME: &'static str = "ListAvailableSlots";

    async fn execute(&mut self, ctx: &CreneauContext) -> Result<Self::Response, Self::Error> {
        let campaign = ctx
            .repos
            .campaigns
            .find(&self.campaign_id)
            .await
            .ok_or(UseCaseError::CampaignNotFound(self.campaign_id))?;
        // Nothing can be booked in an archived campaign
        if campaign.is_read_only() {
            return Ok(Vec::new());
        }

        let slots = ctx.repos.slots.find_by_campaign(&campaign.id).await;
        let slot_ids = slots.iter().map(|s| s.id).collect::<Vec<_>>();
        let confirmed_counts = ctx
            .repos
            .bookings
            .count_confirmed_by_slots(&slot_ids)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        Ok(group_available_slots(
            slots,
            &confirmed_counts,
            self.segment.as_deref(),
            ctx.today(),
            ctx.config.lock_window_days,
        ))
    }
}
