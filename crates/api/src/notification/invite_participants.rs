use super::dispatcher::dispatch;
use crate::error::CreneauError;
use crate::shared::{
    auth::protect_internal_route,
    usecase::{execute_with_policy, PermissionBoundary, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use creneau_api_structs::invite_participants::*;
use creneau_domain::{Notification, NotificationContent, NotificationKind, Permission, ID};
use creneau_infra::CreneauContext;

pub async fn invite_participants_controller(
    http_req: HttpRequest,
    path: web::Path<PathParams>,
    body: web::Json<RequestBody>,
    ctx: web::Data<CreneauContext>,
) -> Result<HttpResponse, CreneauError> {
    let actor = protect_internal_route(&http_req, &ctx).await?;

    let usecase = InviteParticipantsUseCase {
        campaign_id: path.campaign_id,
        participant_ids: body.0.participant_ids,
        actor_name: actor.name.clone(),
    };

    execute_with_policy(usecase, &actor.policy, &ctx)
        .await
        .map(|res| HttpResponse::Ok().json(APIResponse::new(res.notifications, res.skipped)))
        .map_err(CreneauError::from)
}

/// Sends every active participant its self-service link for the campaign
#[derive(Debug)]
pub struct InviteParticipantsUseCase {
    pub campaign_id: ID,
    pub participant_ids: Vec<ID>,
    pub actor_name: String,
}

#[derive(Debug)]
pub struct Invitations {
    pub notifications: Vec<Notification>,
    pub skipped: Vec<ID>,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    CampaignNotFound(ID),
    CampaignReadOnly,
}

impl From<UseCaseError> for CreneauError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::CampaignNotFound(id) => {
                Self::NotFound(format!("The campaign with id: {}, was not found.", id))
            }
            UseCaseError::CampaignReadOnly => {
                Self::Conflict("The campaign is archived, nobody can book anymore".into())
            }
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for InviteParticipantsUseCase {
    type Response = Invitations;

    type Error = UseCaseError;

    const NAME: &'static str = "InviteParticipants";

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

        let participants = ctx.repos.participants.find_many(&self.participant_ids).await;
        let mut notifications = Vec::with_capacity(participants.len());
        let mut skipped = Vec::new();
        for participant_id in &self.participant_ids {
            let participant = match participants.iter().find(|p| p.id == *participant_id) {
                Some(participant) if participant.active => participant,
                _ => {
                    skipped.push(*participant_id);
                    continue;
                }
            };
            let link = ctx.config.self_service_link(&participant.access_token);
            let content = NotificationContent::invitation(participant, &campaign, &link);
            if let Some(notification) =
                dispatch(ctx, participant, NotificationKind::Invitation, None, content).await
            {
                notifications.push(notification);
            }
        }

        ctx.emit_audit(
            self.actor_name.clone(),
            format!(
                "Invited {} participants to campaign {}",
                notifications.len(),
                campaign.id
            ),
        );

        Ok(Invitations {
            notifications,
            skipped,
        })
    }
}

impl PermissionBoundary for InviteParticipantsUseCase {
    fn permissions(&self) -> Vec<Permission> {
        vec![Permission::InviteParticipants]
    }
}
