pub mod dispatcher;
mod invite_participants;
pub mod send_reminders;

use actix_web::web;
use invite_participants::invite_participants_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/campaigns/{campaign_id}/invitations",
        web::post().to(invite_participants_controller),
    );
}
