use crate::dtos::{AvailableSlotsDateDTO, SlotDTO, TimeWindowDTO};
use chrono::{NaiveDate, NaiveTime};
use creneau_domain::{AvailableSlotsDate, Slot, ID};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotResponse {
    pub slot: SlotDTO,
}

impl SlotResponse {
    pub fn new(slot: Slot) -> Self {
        Self {
            slot: SlotDTO::new(slot),
        }
    }
}

pub mod generate_slots {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub campaign_id: ID,
    }

    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub start_date: NaiveDate,
        pub end_date: NaiveDate,
        pub duration_minutes: i64,
        pub capacity: i64,
        pub location: String,
        pub segment: Option<String>,
        pub daily_windows: Vec<TimeWindowDTO>,
        /// Split the windows around the 12:00 - 14:00 lunch break, defaults to true
        pub split_lunch: Option<bool>,
    }

    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub slots: Vec<SlotDTO>,
    }

    impl APIResponse {
        pub fn new(slots: Vec<Slot>) -> Self {
            Self {
                slots: slots.into_iter().map(SlotDTO::new).collect(),
            }
        }
    }
}

pub mod list_available_slots {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub campaign_id: ID,
    }

    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct QueryParams {
        pub segment: Option<String>,
    }

    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub dates: Vec<AvailableSlotsDateDTO>,
    }

    impl APIResponse {
        pub fn new(dates: Vec<AvailableSlotsDate>) -> Self {
            Self {
                dates: dates.into_iter().map(AvailableSlotsDateDTO::new).collect(),
            }
        }
    }
}

pub mod update_slot {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub slot_id: ID,
    }

    #[derive(Serialize, Deserialize, Default)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub date: Option<NaiveDate>,
        pub start_time: Option<NaiveTime>,
        pub end_time: Option<NaiveTime>,
        pub capacity: Option<i64>,
        pub location: Option<String>,
    }

    pub type APIResponse = SlotResponse;
}

pub mod set_slot_lock {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub slot_id: ID,
    }

    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub locked: bool,
    }

    pub type APIResponse = SlotResponse;
}

pub mod delete_slot {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub slot_id: ID,
    }

    pub type APIResponse = SlotResponse;
}
