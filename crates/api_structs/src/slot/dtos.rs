use chrono::{NaiveDate, NaiveTime};
use creneau_domain::{AvailableSlot, AvailableSlotsDate, Slot, TimeWindow, ID};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SlotDTO {
    pub id: ID,
    pub campaign_id: ID,
    pub segment: Option<String>,
    pub location: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub capacity: i64,
    pub locked: bool,
}

impl SlotDTO {
    pub fn new(slot: Slot) -> Self {
        Self {
            id: slot.id,
            campaign_id: slot.campaign_id,
            segment: slot.segment,
            location: slot.location,
            date: slot.date,
            start_time: slot.start_time,
            end_time: slot.end_time,
            capacity: slot.capacity,
            locked: slot.locked,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AvailableSlotDTO {
    #[serde(flatten)]
    pub slot: SlotDTO,
    /// Places left on the slot
    pub remaining: i64,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AvailableSlotsDateDTO {
    pub date: NaiveDate,
    pub slots: Vec<AvailableSlotDTO>,
}

impl AvailableSlotsDateDTO {
    pub fn new(date: AvailableSlotsDate) -> Self {
        Self {
            date: date.date,
            slots: date
                .slots
                .into_iter()
                .map(|AvailableSlot { slot, remaining }| AvailableSlotDTO {
                    slot: SlotDTO::new(slot),
                    remaining,
                })
                .collect(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindowDTO {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl From<TimeWindowDTO> for TimeWindow {
    fn from(window: TimeWindowDTO) -> Self {
        TimeWindow::new(window.start, window.end)
    }
}
