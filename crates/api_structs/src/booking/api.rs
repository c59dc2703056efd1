use crate::dtos::BookingWithSlotDTO;
use creneau_domain::{Booking, Slot, ID};
use serde::{Deserialize, Serialize};

pub type BookingResponse = BookingWithSlotDTO;

pub mod create_booking {
    use super::*;

    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub participant_id: ID,
        pub slot_id: ID,
    }

    pub type APIResponse = BookingResponse;
}

pub mod modify_booking {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub booking_id: ID,
    }

    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub slot_id: ID,
    }

    pub type APIResponse = BookingResponse;
}

pub mod cancel_booking {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub booking_id: ID,
    }

    pub type APIResponse = BookingResponse;
}

pub mod get_booking {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub booking_id: ID,
    }

    pub type APIResponse = BookingResponse;
}

pub mod list_participant_bookings {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub participant_id: ID,
    }

    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub bookings: Vec<BookingWithSlotDTO>,
    }

    impl APIResponse {
        pub fn new(bookings: Vec<(Booking, Slot)>) -> Self {
            Self {
                bookings: bookings
                    .into_iter()
                    .map(|(booking, slot)| BookingWithSlotDTO::new(booking, slot))
                    .collect(),
            }
        }
    }
}

pub mod export_bookings {
    use super::*;

    /// The response is a csv attachment
    #[derive(Deserialize)]
    pub struct PathParams {
        pub campaign_id: ID,
    }
}
