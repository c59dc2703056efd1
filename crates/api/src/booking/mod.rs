mod cancel_booking;
mod create_booking;
mod export_bookings;
mod get_booking;
mod list_participant_bookings;
mod modify_booking;
mod subscribers;

use actix_web::web;
use cancel_booking::cancel_booking_controller;
use create_booking::create_booking_controller;
use creneau_domain::{Booking, Campaign, Participant, Positioning, Slot};
use export_bookings::export_bookings_controller;
use get_booking::get_booking_controller;
use list_participant_bookings::list_participant_bookings_controller;
use modify_booking::modify_booking_controller;

/// Outcome of a committed booking operation, everything the subscribers
/// need to inform the participant
#[derive(Debug, Clone)]
pub struct BookingChange {
    pub booking: Booking,
    pub participant: Participant,
    pub slot: Slot,
    /// Slot the booking was on before a move
    pub previous_slot: Option<Slot>,
    pub campaign: Campaign,
    /// Capacity in which the actor performed the operation
    pub acted_as: Positioning,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/bookings", web::post().to(create_booking_controller));
    cfg.route("/bookings/{booking_id}", web::get().to(get_booking_controller));
    cfg.route("/bookings/{booking_id}", web::put().to(modify_booking_controller));
    cfg.route(
        "/bookings/{booking_id}/cancel",
        web::post().to(cancel_booking_controller),
    );
    cfg.route(
        "/participants/{participant_id}/bookings",
        web::get().to(list_participant_bookings_controller),
    );
    cfg.route(
        "/campaigns/{campaign_id}/export",
        web::get().to(export_bookings_controller),
    );
}
