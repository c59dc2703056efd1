use crate::error::CreneauError;
use crate::shared::{
    auth::protect_internal_route,
    usecase::{execute_with_policy, PermissionBoundary, UseCase},
};
use actix_web::{http::header, web, HttpRequest, HttpResponse};
use creneau_api_structs::export_bookings::*;
use creneau_domain::{export_filename, to_csv, BookingExportRow, Permission, ID};
use creneau_infra::CreneauContext;

pub async fn export_bookings_controller(
    http_req: HttpRequest,
    path: web::Path<PathParams>,
    ctx: web::Data<CreneauContext>,
) -> Result<HttpResponse, CreneauError> {
    let actor = protect_internal_route(&http_req, &ctx).await?;

    let usecase = ExportBookingsUseCase {
        campaign_id: path.campaign_id,
        actor_name: actor.name.clone(),
    };

    execute_with_policy(usecase, &actor.policy, &ctx)
        .await
        .map(|export| {
            HttpResponse::Ok()
                .content_type("text/csv; charset=utf-8")
                .insert_header((
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", export.filename),
                ))
                .body(export.csv)
        })
        .map_err(CreneauError::from)
}

/// The confirmed bookings of a campaign as a CSV document, ordered by slot
/// schedule then participant name
#[derive(Debug)]
pub struct ExportBookingsUseCase {
    pub campaign_id: ID,
    pub actor_name: String,
}

#[derive(Debug)]
pub struct BookingsExport {
    pub filename: String,
    pub rows: Vec<BookingExportRow>,
    pub csv: String,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    CampaignNotFound(ID),
}

impl From<UseCaseError> for CreneauError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::CampaignNotFound(id) => {
                Self::NotFound(format!("The campaign with id: {}, was not found.", id))
            }
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for ExportBookingsUseCase {
    type Response = BookingsExport;

    type Error = UseCaseError;

    const NAME: &'static str = "ExportBookings";

    async fn execute(&mut self, ctx: &CreneauContext) -> Result<Self::Response, Self::Error> {
        let campaign = ctx
            .repos
            .campaigns
            .find(&self.campaign_id)
            .await
            .ok_or(UseCaseError::CampaignNotFound(self.campaign_id))?;

        let bookings = ctx.repos.bookings.find_confirmed_by_campaign(&campaign.id).await;
        let slot_ids = bookings.iter().map(|b| b.slot_id).collect::<Vec<_>>();
        let participant_ids = bookings.iter().map(|b| b.participant_id).collect::<Vec<_>>();
        let slots = ctx.repos.slots.find_many(&slot_ids).await;
        let participants = ctx.repos.participants.find_many(&participant_ids).await;

        let tz = ctx.config.timezone;
        let mut rows = bookings
            .iter()
            .filter_map(|booking| {
                let slot = slots.iter().find(|s| s.id == booking.slot_id)?;
                let participant = participants.iter().find(|p| p.id == booking.participant_id)?;
                Some(BookingExportRow::new(booking, participant, slot, &tz))
            })
            .collect::<Vec<_>>();
        rows.sort_by(|a, b| {
            (a.date, &a.start_time, &a.name, a.participant_id)
                .cmp(&(b.date, &b.start_time, &b.name, b.participant_id))
        });

        ctx.emit_audit(
            self.actor_name.clone(),
            format!("Exported {} bookings of campaign {}", rows.len(), campaign.id),
        );

        Ok(BookingsExport {
            filename: export_filename(&campaign.id, &ctx.today()),
            csv: to_csv(&rows),
            rows,
        })
    }
}

impl PermissionBoundary for ExportBookingsUseCase {
    fn permissions(&self) -> Vec<Permission> {
        vec![Permission::ExportBookings]
    }
}
