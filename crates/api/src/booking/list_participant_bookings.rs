use crate::error::CreneauError;
use crate::shared::{
    auth::{protect_route, resolve_actor_standing},
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use creneau_api_structs::list_participant_bookings::*;
use creneau_domain::{Actor, Booking, Slot, ID};
use creneau_infra::CreneauContext;

pub async fn list_participant_bookings_controller(
    http_req: HttpRequest,
    path: web::Path<PathParams>,
    ctx: web::Data<CreneauContext>,
) -> Result<HttpResponse, CreneauError> {
    let actor = protect_route(&http_req, &ctx).await?;

    let usecase = ListParticipantBookingsUseCase {
        actor,
        participant_id: path.participant_id,
    };

    execute(usecase, &ctx)
        .await
        .map(|bookings| HttpResponse::Ok().json(APIResponse::new(bookings)))
        .map_err(CreneauError::from)
}

/// Every booking of a participant, cancelled ones included, oldest first
#[derive(Debug)]
pub struct ListParticipantBookingsUseCase {
    pub actor: Actor,
    pub participant_id: ID,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    ParticipantNotFound(ID),
    AuthorizationDenied,
}

impl From<UseCaseError> for CreneauError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::ParticipantNotFound(id) => {
                Self::NotFound(format!("The participant with id: {}, was not found.", id))
            }
            UseCaseError::AuthorizationDenied => {
                Self::Forbidden("You are not allowed to see the bookings of this participant".into())
            }
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for ListParticipantBookingsUseCase {
    type Response = Vec<(Booking, Slot)>;

    type Error = UseCaseError;

    const NAME: &'static str = "ListParticipantBookings";

    async fn execute(&mut self, ctx: &CreneauContext) -> Result<Self::Response, Self::Error> {
        let participant = ctx
            .repos
            .participants
            .find(&self.participant_id)
            .await
            .ok_or(UseCaseError::ParticipantNotFound(self.participant_id))?;
        if resolve_actor_standing(&self.actor, &participant, ctx)
            .await
            .is_denied()
        {
            return Err(UseCaseError::AuthorizationDenied);
        }

        let mut bookings = ctx.repos.bookings.find_by_participant(&participant.id).await;
        bookings.sort_by_key(|b| b.created);
        let slot_ids = bookings.iter().map(|b| b.slot_id).collect::<Vec<_>>();
        let slots = ctx.repos.slots.find_many(&slot_ids).await;

        Ok(bookings
            .into_iter()
            .filter_map(|booking| {
                let slot = slots.iter().find(|s| s.id == booking.slot_id)?.clone();
                Some((booking, slot))
            })
            .collect())
    }
}
