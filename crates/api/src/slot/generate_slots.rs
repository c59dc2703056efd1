use crate::error::CreneauError;
use crate::shared::{
    auth::protect_internal_route,
    usecase::{execute_with_policy, PermissionBoundary, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::NaiveDate;
use creneau_api_structs::generate_slots::*;
use creneau_domain::{
    generate_slots, split_around_lunch, InvalidRangeError, Permission, Slot,
    SlotGenerationOptions, TimeWindow, ID,
};
use creneau_infra::CreneauContext;

pub async fn generate_slots_controller(
    http_req: HttpRequest,
    path: web::Path<PathParams>,
    body: web::Json<RequestBody>,
    ctx: web::Data<CreneauContext>,
) -> Result<HttpResponse, CreneauError> {
    let actor = protect_internal_route(&http_req, &ctx).await?;

    let body = body.0;
    let usecase = GenerateSlotsUseCase {
        campaign_id: path.campaign_id,
        start_date: body.start_date,
        end_date: body.end_date,
        duration_minutes: body.duration_minutes,
        capacity: body.capacity,
        location: body.location,
        segment: body.segment,
        daily_windows: body.daily_windows.into_iter().map(TimeWindow::from).collect(),
        split_lunch: body.split_lunch.unwrap_or(true),
        actor_name: actor.name.clone(),
    };

    execute_with_policy(usecase, &actor.policy, &ctx)
        .await
        .map(|slots| HttpResponse::Created().json(APIResponse::new(slots)))
        .map_err(CreneauError::from)
}

#[derive(Debug)]
pub struct GenerateSlotsUseCase {
    pub campaign_id: ID,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub duration_minutes: i64,
    pub capacity: i64,
    pub location: String,
    pub segment: Option<String>,
    pub daily_windows: Vec<TimeWindow>,
    /// Pre-split every window around the lunch break before tiling
    pub split_lunch: bool,
    pub actor_name: String,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    CampaignNotFound(ID),
    CampaignReadOnly,
    OutsideCampaign,
    InvalidRange(InvalidRangeError),
    StorageError,
}

impl From<UseCaseError> for CreneauError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::CampaignNotFound(id) => {
                Self::NotFound(format!("The campaign with id: {}, was not found.", id))
            }
            UseCaseError::CampaignReadOnly => {
                Self::Conflict("The campaign is archived and can no longer be modified".into())
            }
            UseCaseError::OutsideCampaign => {
                Self::BadClientData("The dates must be within the campaign dates".into())
            }
            UseCaseError::InvalidRange(e) => Self::BadClientData(e.to_string()),
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for GenerateSlotsUseCase {
    type Response = Vec<Slot>;

    type Error = UseCaseError;

    const NAME: &'static str = "GenerateSlots";

    async fn execute(&mut self, ctx: &CreneauContext) -> Result<Self::Response, Self::Error> {
        let campaign = ctx
            .repos
            .campaigns
            .find(&self.campaign_id)
            .await
            .ok_or(UseCaseError::CampaignNotFound(self.campaign_id))?;
        if campaign.is_read_only() {
            return Err(UseCaseError::CampaignReadOnly);
        }
        if self.start_date < campaign.start_date || self.end_date > campaign.end_date {
            return Err(UseCaseError::OutsideCampaign);
        }

        let daily_windows = if self.split_lunch {
            self.daily_windows.iter().flat_map(split_around_lunch).collect()
        } else {
            self.daily_windows.clone()
        };
        let options = SlotGenerationOptions {
            campaign_id: campaign.id,
            start_date: self.start_date,
            end_date: self.end_date,
            duration_minutes: self.duration_minutes,
            capacity: self.capacity,
            location: self.location.clone(),
            segment: self.segment.clone(),
            daily_windows,
        };
        let slots = generate_slots(&options).map_err(UseCaseError::InvalidRange)?;

        ctx.repos
            .slots
            .bulk_insert(&slots)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        ctx.emit_audit(
            self.actor_name.clone(),
            format!("Generated {} slots for campaign {}", slots.len(), campaign.id),
        );
        Ok(slots)
    }
}

impl PermissionBoundary for GenerateSlotsUseCase {
    fn permissions(&self) -> Vec<Permission> {
        vec![Permission::ManageSlots]
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::shared::usecase::execute;
    use crate::test_utils::{setup, TestContext};
    use chrono::{NaiveTime, Weekday, Datelike};

    fn window(start: u32, end: u32) -> TimeWindow {
        TimeWindow::new(
            NaiveTime::from_hms_opt(start, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(end, 0, 0).unwrap(),
        )
    }

    fn usecase(campaign_id: ID, start: NaiveDate, end: NaiveDate) -> GenerateSlotsUseCase {
        GenerateSlotsUseCase {
            campaign_id,
            start_date: start,
            end_date: end,
            duration_minutes: 30,
            capacity: 4,
            location: "Salle 1".into(),
            segment: Some("Batiment A".into()),
            daily_windows: vec![window(9, 17)],
            split_lunch: true,
            actor_name: "Administration".into(),
        }
    }

    #[actix_web::test]
    async fn generates_and_stores_a_week_of_slots() {
        let TestContext {
            ctx,
            campaign,
            audit,
            ..
        } = setup().await;
        // Monday to Sunday
        let start = NaiveDate::from_ymd_opt(2024, 3, 11).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 17).unwrap();

        let slots = execute(usecase(campaign.id, start, end), &ctx).await.unwrap();

        assert_eq!(slots.len(), 5 * 12);
        assert!(slots
            .iter()
            .all(|s| s.date.weekday() != Weekday::Sat && s.date.weekday() != Weekday::Sun));
        assert!(slots.iter().all(|s| s.capacity == 4 && !s.locked));
        assert!(slots
            .iter()
            .all(|s| s.end_time <= window(12, 14).start || s.start_time >= window(12, 14).end));
        assert_eq!(ctx.repos.slots.find_by_campaign(&campaign.id).await.len(), 60);
        assert_eq!(audit.entries().len(), 1);
    }

    #[actix_web::test]
    async fn window_inside_lunch_is_kept_whole() {
        let TestContext { ctx, campaign, .. } = setup().await;
        let day = NaiveDate::from_ymd_opt(2024, 3, 11).unwrap();
        let mut usecase = usecase(campaign.id, day, day);
        usecase.daily_windows = vec![window(12, 13)];

        let slots = execute(usecase, &ctx).await.unwrap();
        assert_eq!(slots.len(), 2);
    }

    #[actix_web::test]
    async fn rejects_invalid_ranges() {
        let TestContext { ctx, campaign, .. } = setup().await;
        let start = NaiveDate::from_ymd_opt(2024, 3, 11).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();

        let res = execute(usecase(campaign.id, start, end), &ctx).await;
        assert!(matches!(res, Err(UseCaseError::InvalidRange(_))));

        let mut zero_duration = usecase(campaign.id, start, start);
        zero_duration.duration_minutes = 0;
        assert_eq!(
            execute(zero_duration, &ctx).await.unwrap_err(),
            UseCaseError::InvalidRange(InvalidRangeError::NonPositiveDuration(0))
        );
        assert!(ctx.repos.slots.find_by_campaign(&campaign.id).await.is_empty());
    }

    #[actix_web::test]
    async fn rejects_dates_outside_campaign() {
        let TestContext { ctx, campaign, .. } = setup().await;
        let start = NaiveDate::from_ymd_opt(2024, 4, 29).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 5, 3).unwrap();

        assert_eq!(
            execute(usecase(campaign.id, start, end), &ctx).await.unwrap_err(),
            UseCaseError::OutsideCampaign
        );
    }

    #[actix_web::test]
    async fn rejects_archived_campaign() {
        let mut test = setup().await;
        test.archive_campaign().await;
        let day = NaiveDate::from_ymd_opt(2024, 3, 11).unwrap();

        assert_eq!(
            execute(usecase(test.campaign.id, day, day), &test.ctx)
                .await
                .unwrap_err(),
            UseCaseError::CampaignReadOnly
        );
    }
}
