use crate::error::CreneauError;
use crate::shared::{
    auth::{protect_route, resolve_actor_standing},
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use creneau_api_structs::get_booking::*;
use creneau_domain::{Actor, Booking, Slot, ID};
use creneau_infra::CreneauContext;

pub async fn get_booking_controller(
    http_req: HttpRequest,
    path: web::Path<PathParams>,
    ctx: web::Data<CreneauContext>,
) -> Result<HttpResponse, CreneauError> {
    let actor = protect_route(&http_req, &ctx).await?;

    let usecase = GetBookingUseCase {
        actor,
        booking_id: path.booking_id,
    };

    execute(usecase, &ctx)
        .await
        .map(|(booking, slot)| HttpResponse::Ok().json(APIResponse::new(booking, slot)))
        .map_err(CreneauError::from)
}

#[derive(Debug)]
pub struct GetBookingUseCase {
    pub actor: Actor,
    pub booking_id: ID,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    BookingNotFound(ID),
    AuthorizationDenied,
    StorageError,
}

impl From<UseCaseError> for CreneauError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::BookingNotFound(id) => {
                Self::NotFound(format!("The booking with id: {}, was not found.", id))
            }
            UseCaseError::AuthorizationDenied => {
                Self::Forbidden("You are not allowed to see this booking".into())
            }
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetBookingUseCase {
    type Response = (Booking, Slot);

    type Error = UseCaseError;

    const NAME: &'static str = "GetBooking";

    async fn execute(&mut self, ctx: &CreneauContext) -> Result<Self::Response, Self::Error> {
        let booking = ctx
            .repos
            .bookings
            .find(&self.booking_id)
            .await
            .ok_or(UseCaseError::BookingNotFound(self.booking_id))?;
        let participant = ctx
            .repos
            .participants
            .find(&booking.participant_id)
            .await
            .ok_or(UseCaseError::StorageError)?;
        if resolve_actor_standing(&self.actor, &participant, ctx)
            .await
            .is_denied()
        {
            return Err(UseCaseError::AuthorizationDenied);
        }

        let slot = ctx
            .repos
            .slots
            .find(&booking.slot_id)
            .await
            .ok_or(UseCaseError::StorageError)?;
        Ok((booking, slot))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_utils::{as_actor, setup};
    use creneau_domain::Positioning;

    #[actix_web::test]
    async fn only_those_standing_for_the_participant_can_read() {
        let test = setup().await;
        let slot = test.insert_slot(10, 1).await;
        let alice = test.insert_participant("Alice", "IT").await;
        let bob = test.insert_participant("Bob", "IT").await;
        let coordinator = test.insert_coordinator("IT").await;
        let booking = Booking::new(alice.id, &slot, Positioning::SelfService, 0);
        test.ctx.repos.bookings.insert_confirmed(&booking).await.unwrap();

        let usecase = |actor| GetBookingUseCase {
            actor,
            booking_id: booking.id,
        };
        let (found, found_slot) = execute(usecase(as_actor(&alice)), &test.ctx).await.unwrap();
        assert_eq!(found, booking);
        assert_eq!(found_slot, slot);
        assert!(execute(usecase(Actor::Internal(coordinator)), &test.ctx)
            .await
            .is_ok());

        let res = execute(usecase(as_actor(&bob)), &test.ctx).await;
        assert_eq!(res.unwrap_err(), UseCaseError::AuthorizationDenied);
    }
}
