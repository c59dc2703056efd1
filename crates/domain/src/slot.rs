use crate::shared::entity::{Entity, ID};
use chrono::{Duration, NaiveDate, NaiveTime};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Number of days before its date during which a `Slot` can no longer be
/// booked, moved out of or cancelled
pub const DEFAULT_LOCK_WINDOW_DAYS: i64 = 2;

/// A time-of-day range, `start` inclusive and `end` exclusive
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    pub fn is_valid(&self) -> bool {
        self.start < self.end
    }
}

/// A capacity-limited, date/time-bounded bookable unit of a `Campaign`
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub id: ID,
    pub campaign_id: ID,
    /// Optional grouping label, e.g. a building or a team
    pub segment: Option<String>,
    pub location: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    /// Maximum number of confirmed `Booking`s, always positive
    pub capacity: i64,
    /// Manual lock set by an administrator
    pub locked: bool,
}

impl Slot {
    pub fn new(
        campaign_id: ID,
        date: NaiveDate,
        window: TimeWindow,
        capacity: i64,
        location: &str,
        segment: Option<String>,
    ) -> Self {
        Self {
            id: Default::default(),
            campaign_id,
            segment,
            location: location.to_string(),
            date,
            start_time: window.start,
            end_time: window.end,
            capacity,
            locked: false,
        }
    }

    /// A slot is locked when manually flagged or once its date is within
    /// `lock_window_days` of `today`. The time based lock never reverts as
    /// `today` only moves forward.
    pub fn is_locked(&self, today: NaiveDate, lock_window_days: i64) -> bool {
        self.locked || self.date <= today + Duration::days(lock_window_days)
    }

    pub fn has_room(&self, confirmed_count: i64) -> bool {
        confirmed_count < self.capacity
    }

    /// Whether both slots take place at the same date and time
    pub fn same_schedule(&self, other: &Slot) -> bool {
        self.date == other.date
            && self.start_time == other.start_time
            && self.end_time == other.end_time
    }
}

impl Entity for Slot {
    fn id(&self) -> &ID {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AvailableSlot {
    pub slot: Slot,
    pub remaining: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AvailableSlotsDate {
    pub date: NaiveDate,
    pub slots: Vec<AvailableSlot>,
}

/// Keeps the bookable slots, i.e. neither locked nor full and matching the
/// optional `segment`, sorted and grouped by date.
///
/// `confirmed_counts` maps slot ids to their number of confirmed bookings,
/// missing entries count as zero.
pub fn group_available_slots(
    slots: Vec<Slot>,
    confirmed_counts: &HashMap<ID, i64>,
    segment: Option<&str>,
    today: NaiveDate,
    lock_window_days: i64,
) -> Vec<AvailableSlotsDate> {
    let mut available = slots
        .into_iter()
        .filter(|slot| match segment {
            Some(segment) => slot.segment.as_deref() == Some(segment),
            None => true,
        })
        .filter(|slot| !slot.is_locked(today, lock_window_days))
        .filter_map(|slot| {
            let confirmed = confirmed_counts.get(&slot.id).copied().unwrap_or(0);
            if slot.has_room(confirmed) {
                Some(AvailableSlot {
                    remaining: slot.capacity - confirmed,
                    slot,
                })
            } else {
                None
            }
        })
        .collect::<Vec<_>>();
    available.sort_by(|a, b| {
        (a.slot.date, a.slot.start_time, &a.slot.location).cmp(&(
            b.slot.date,
            b.slot.start_time,
            &b.slot.location,
        ))
    });

    let grouped = available.into_iter().group_by(|s| s.slot.date);
    let dates = grouped
        .into_iter()
        .map(|(date, slots)| AvailableSlotsDate {
            date,
            slots: slots.collect(),
        })
        .collect::<Vec<_>>();
    dates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn slot_on(day: NaiveDate, hour: u32, capacity: i64) -> Slot {
        Slot::new(
            ID::new(),
            day,
            TimeWindow::new(time(hour, 0), time(hour, 30)),
            capacity,
            "Room 1",
            None,
        )
    }

    #[test]
    fn time_based_lock() {
        let today = date(2024, 3, 4);
        assert!(slot_on(date(2024, 3, 5), 9, 1).is_locked(today, 2));
        assert!(slot_on(date(2024, 3, 6), 9, 1).is_locked(today, 2));
        assert!(!slot_on(date(2024, 3, 7), 9, 1).is_locked(today, 2));
        // Past slots stay locked
        assert!(slot_on(date(2024, 3, 1), 9, 1).is_locked(today, 2));
    }

    #[test]
    fn lock_is_monotonic() {
        let slot = slot_on(date(2024, 3, 10), 9, 1);
        let mut locked_once = false;
        for day in date(2024, 3, 1).iter_days().take(20) {
            let locked = slot.is_locked(day, 2);
            if locked_once {
                assert!(locked);
            }
            locked_once |= locked;
        }
        assert!(locked_once);
    }

    #[test]
    fn manual_lock() {
        let mut slot = slot_on(date(2024, 6, 10), 9, 1);
        assert!(!slot.is_locked(date(2024, 3, 1), 2));
        slot.locked = true;
        assert!(slot.is_locked(date(2024, 3, 1), 2));
    }

    #[test]
    fn groups_available_slots_by_date() {
        let today = date(2024, 3, 1);
        let late = slot_on(date(2024, 3, 11), 10, 2);
        let early = slot_on(date(2024, 3, 11), 9, 2);
        let full = slot_on(date(2024, 3, 11), 11, 1);
        let next_day = slot_on(date(2024, 3, 12), 9, 3);
        let locked = slot_on(date(2024, 3, 2), 9, 3);
        let mut manual = slot_on(date(2024, 3, 12), 14, 3);
        manual.locked = true;

        let mut counts = HashMap::new();
        counts.insert(full.id, 1);
        counts.insert(late.id, 1);

        let dates = group_available_slots(
            vec![
                late.clone(),
                next_day.clone(),
                full,
                early.clone(),
                locked,
                manual,
            ],
            &counts,
            None,
            today,
            2,
        );
        assert_eq!(dates.len(), 2);
        assert_eq!(dates[0].date, date(2024, 3, 11));
        assert_eq!(
            dates[0].slots.iter().map(|s| s.slot.id).collect::<Vec<_>>(),
            vec![early.id, late.id]
        );
        assert_eq!(dates[0].slots[1].remaining, 1);
        assert_eq!(dates[1].slots.len(), 1);
        assert_eq!(dates[1].slots[0].slot.id, next_day.id);
    }

    #[test]
    fn filters_on_segment() {
        let mut a = slot_on(date(2024, 3, 11), 9, 1);
        a.segment = Some("Building A".into());
        let b = slot_on(date(2024, 3, 11), 10, 1);

        let dates = group_available_slots(
            vec![a.clone(), b],
            &HashMap::new(),
            Some("Building A"),
            date(2024, 3, 1),
            2,
        );
        assert_eq!(dates.len(), 1);
        assert_eq!(dates[0].slots.len(), 1);
        assert_eq!(dates[0].slots[0].slot.id, a.id);
    }
}
