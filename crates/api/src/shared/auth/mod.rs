use crate::error::CreneauError;
use actix_web::HttpRequest;
use creneau_domain::{resolve_standing, Actor, ActorStanding, InternalActor, Participant};
use creneau_infra::CreneauContext;

/// Header carrying the personal access token of a `Participant`
pub const PARTICIPANT_TOKEN_HEADER: &str = "creneau-participant-token";
/// Header carrying the api key of an `InternalActor`
pub const API_KEY_HEADER: &str = "x-api-key";

fn header_value<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
    req.headers().get(name).and_then(|value| value.to_str().ok())
}

/// Resolves the `Actor` behind a request, either a participant using its
/// access token or an internal actor using its api key
pub async fn protect_route(req: &HttpRequest, ctx: &CreneauContext) -> Result<Actor, CreneauError> {
    if let Some(api_key) = header_value(req, API_KEY_HEADER) {
        return match ctx.repos.actors.find_by_api_key(api_key).await {
            Some(actor) => Ok(Actor::Internal(actor)),
            None => Err(CreneauError::Unauthorized(format!(
                "Invalid value provided in the {} header",
                API_KEY_HEADER
            ))),
        };
    }

    if let Some(token) = header_value(req, PARTICIPANT_TOKEN_HEADER) {
        return match ctx.repos.participants.find_active_by_access_token(token).await {
            Some(participant) => Ok(Actor::Participant(participant)),
            None => Err(CreneauError::Unauthorized(format!(
                "Invalid value provided in the {} header",
                PARTICIPANT_TOKEN_HEADER
            ))),
        };
    }

    Err(CreneauError::Unauthorized(format!(
        "Expected either the {} or the {} header",
        API_KEY_HEADER, PARTICIPANT_TOKEN_HEADER
    )))
}

/// Only lets `InternalActor`s through, their `Policy` is then checked by the `UseCase`
pub async fn protect_internal_route(
    req: &HttpRequest,
    ctx: &CreneauContext,
) -> Result<InternalActor, CreneauError> {
    match protect_route(req, ctx).await? {
        Actor::Internal(actor) => Ok(actor),
        Actor::Participant(_) => Err(CreneauError::Forbidden(
            "This route is reserved to internal actors".into(),
        )),
    }
}

/// How the `actor` stands towards `target`, loading the coordinator
/// perimeters of internal actors
pub async fn resolve_actor_standing(
    actor: &Actor,
    target: &Participant,
    ctx: &CreneauContext,
) -> ActorStanding {
    let perimeters = match actor {
        Actor::Internal(internal) => ctx.repos.perimeters.find_by_actor(&internal.id).await,
        Actor::Participant(_) => Vec::new(),
    };
    resolve_standing(actor, target, &perimeters)
}
