mod delete_slot;
mod generate_slots;
mod list_available_slots;
mod set_slot_lock;
mod update_slot;

use actix_web::web;
use delete_slot::delete_slot_controller;
use generate_slots::generate_slots_controller;
use list_available_slots::list_available_slots_controller;
use set_slot_lock::set_slot_lock_controller;
use update_slot::update_slot_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/campaigns/{campaign_id}/slots/generate",
        web::post().to(generate_slots_controller),
    );
    cfg.route(
        "/campaigns/{campaign_id}/slots",
        web::get().to(list_available_slots_controller),
    );
    cfg.route("/slots/{slot_id}", web::put().to(update_slot_controller));
    cfg.route("/slots/{slot_id}", web::delete().to(delete_slot_controller));
    cfg.route("/slots/{slot_id}/lock", web::put().to(set_slot_lock_controller));
}
