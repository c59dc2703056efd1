use crate::dtos::SlotDTO;
use creneau_domain::{Booking, BookingStatus, Slot, ID};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingDTO {
    pub id: ID,
    pub participant_id: ID,
    pub slot_id: ID,
    pub campaign_id: ID,
    /// `self`, `manager` or `coordinator`
    pub positioned_by: String,
    pub manager_id: Option<ID>,
    pub internal_actor_id: Option<ID>,
    pub status: String,
    pub created: i64,
    pub updated: i64,
}

impl BookingDTO {
    pub fn new(booking: Booking) -> Self {
        let manager_id = match &booking.positioning {
            creneau_domain::Positioning::Manager { manager_id, .. } => Some(*manager_id),
            _ => None,
        };
        Self {
            id: booking.id,
            participant_id: booking.participant_id,
            slot_id: booking.slot_id,
            campaign_id: booking.campaign_id,
            positioned_by: booking.positioning.kind().to_string(),
            manager_id,
            internal_actor_id: booking.positioning.internal_actor().copied(),
            status: booking.status.to_string(),
            created: booking.created,
            updated: booking.updated,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == BookingStatus::Confirmed.as_str()
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BookingWithSlotDTO {
    pub booking: BookingDTO,
    pub slot: SlotDTO,
}

impl BookingWithSlotDTO {
    pub fn new(booking: Booking, slot: Slot) -> Self {
        Self {
            booking: BookingDTO::new(booking),
            slot: SlotDTO::new(slot),
        }
    }
}
