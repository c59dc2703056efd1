//! Tiling of campaign days into bookable `Slot`s.
//!
//! The generator is pure: it returns the slots and never persists them.
use crate::{
    shared::entity::ID,
    slot::{Slot, TimeWindow},
};
use chrono::{Datelike, NaiveDate, NaiveTime, Timelike, Weekday};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum InvalidRangeError {
    #[error("End date {end} is before start date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },
    #[error("Slot duration must be positive, got {0} minutes")]
    NonPositiveDuration(i64),
    #[error("Slot capacity must be positive, got {0}")]
    NonPositiveCapacity(i64),
    #[error("Daily window {0:?} does not end after it starts")]
    EmptyWindow(TimeWindow),
}

fn lunch_break() -> TimeWindow {
    TimeWindow {
        start: NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN),
        end: NaiveTime::from_hms_opt(14, 0, 0).unwrap_or(NaiveTime::MIN),
    }
}

/// Splits a daily window overlapping the 12:00-14:00 lunch break into the
/// part before and the part after it.
///
/// A window lying fully outside or fully inside the lunch break is returned
/// unchanged. Empty parts are dropped so at most two windows are returned.
pub fn split_around_lunch(window: &TimeWindow) -> Vec<TimeWindow> {
    let lunch = lunch_break();
    let fully_outside = window.end <= lunch.start || window.start >= lunch.end;
    let fully_inside = window.start >= lunch.start && window.end <= lunch.end;
    if fully_outside || fully_inside {
        return vec![*window];
    }

    let mut parts = Vec::with_capacity(2);
    if window.start < lunch.start {
        parts.push(TimeWindow::new(window.start, lunch.start));
    }
    if window.end > lunch.end {
        parts.push(TimeWindow::new(lunch.end, window.end));
    }
    parts
}

#[derive(Debug, Clone)]
pub struct SlotGenerationOptions {
    pub campaign_id: ID,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub duration_minutes: i64,
    pub capacity: i64,
    pub location: String,
    pub segment: Option<String>,
    /// Windows already split around the lunch break
    pub daily_windows: Vec<TimeWindow>,
}

fn is_weekend(date: &NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

fn minutes_from_midnight(time: &NaiveTime) -> i64 {
    (time.num_seconds_from_midnight() / 60) as i64
}

fn time_from_minutes(minutes: i64) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt((minutes / 60) as u32, (minutes % 60) as u32, 0)
}

/// Tiles a window into consecutive slots of exactly `duration` minutes, a
/// trailing remainder shorter than `duration` is discarded.
fn tile_window(window: &TimeWindow, duration: i64) -> Vec<TimeWindow> {
    let end = minutes_from_midnight(&window.end);
    let mut cursor = minutes_from_midnight(&window.start);
    let mut tiles = Vec::new();
    while cursor + duration <= end {
        if let (Some(start), Some(end)) =
            (time_from_minutes(cursor), time_from_minutes(cursor + duration))
        {
            tiles.push(TimeWindow::new(start, end));
        }
        cursor += duration;
    }
    tiles
}

/// Generates the slots of every weekday between `start_date` and `end_date`
/// (both inclusive) for each daily window.
pub fn generate_slots(options: &SlotGenerationOptions) -> Result<Vec<Slot>, InvalidRangeError> {
    if options.end_date < options.start_date {
        return Err(InvalidRangeError::EndBeforeStart {
            start: options.start_date,
            end: options.end_date,
        });
    }
    if options.duration_minutes <= 0 {
        return Err(InvalidRangeError::NonPositiveDuration(
            options.duration_minutes,
        ));
    }
    if options.capacity <= 0 {
        return Err(InvalidRangeError::NonPositiveCapacity(options.capacity));
    }
    if let Some(window) = options.daily_windows.iter().find(|w| !w.is_valid()) {
        return Err(InvalidRangeError::EmptyWindow(*window));
    }

    let tiles = options
        .daily_windows
        .iter()
        .flat_map(|window| tile_window(window, options.duration_minutes))
        .collect::<Vec<_>>();
    let tiles = &tiles;

    let slots = options
        .start_date
        .iter_days()
        .take_while(|day| *day <= options.end_date)
        .filter(|day| !is_weekend(day))
        .flat_map(move |day| {
            tiles.iter().map(move |tile| {
                Slot::new(
                    options.campaign_id,
                    day,
                    *tile,
                    options.capacity,
                    &options.location,
                    options.segment.clone(),
                )
            })
        })
        .collect();

    Ok(slots)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn options(start: NaiveDate, end: NaiveDate, windows: Vec<TimeWindow>) -> SlotGenerationOptions {
        SlotGenerationOptions {
            campaign_id: ID::new(),
            start_date: start,
            end_date: end,
            duration_minutes: 30,
            capacity: 3,
            location: "Hall B".into(),
            segment: Some("North".into()),
            daily_windows: windows,
        }
    }

    #[test]
    fn splits_windows_around_lunch() {
        let full_day = TimeWindow::new(time(9, 0), time(17, 0));
        assert_eq!(
            split_around_lunch(&full_day),
            vec![
                TimeWindow::new(time(9, 0), time(12, 0)),
                TimeWindow::new(time(14, 0), time(17, 0))
            ]
        );

        let morning = TimeWindow::new(time(8, 0), time(11, 0));
        assert_eq!(split_around_lunch(&morning), vec![morning]);

        let inside = TimeWindow::new(time(12, 30), time(13, 30));
        assert_eq!(split_around_lunch(&inside), vec![inside]);

        let late_morning = TimeWindow::new(time(10, 0), time(13, 0));
        assert_eq!(
            split_around_lunch(&late_morning),
            vec![TimeWindow::new(time(10, 0), time(12, 0))]
        );

        let early_afternoon = TimeWindow::new(time(13, 0), time(15, 0));
        assert_eq!(
            split_around_lunch(&early_afternoon),
            vec![TimeWindow::new(time(14, 0), time(15, 0))]
        );
    }

    #[test]
    fn tiles_weekdays_only() {
        let windows = split_around_lunch(&TimeWindow::new(time(9, 0), time(17, 0)));
        // 2024-03-08 is a friday, 09 and 10 are the weekend
        let opts = options(date(2024, 3, 8), date(2024, 3, 10), windows);
        let slots = generate_slots(&opts).unwrap();
        assert_eq!(slots.len(), 12);
        assert!(slots.iter().all(|s| s.date == date(2024, 3, 8)));

        let morning = slots.iter().filter(|s| s.start_time < time(12, 0)).count();
        assert_eq!(morning, 6);
        assert_eq!(slots[0].start_time, time(9, 0));
        assert_eq!(slots[0].end_time, time(9, 30));
        assert_eq!(slots[11].start_time, time(16, 30));
        assert_eq!(slots[11].end_time, time(17, 0));

        for slot in &slots {
            assert_eq!(slot.capacity, 3);
            assert_eq!(slot.location, "Hall B");
            assert_eq!(slot.segment.as_deref(), Some("North"));
            assert!(!slot.locked);
        }
    }

    #[test]
    fn weekend_only_range_is_empty() {
        let windows = vec![TimeWindow::new(time(9, 0), time(11, 0))];
        let opts = options(date(2024, 3, 9), date(2024, 3, 10), windows);
        assert!(generate_slots(&opts).unwrap().is_empty());
    }

    #[test]
    fn discards_trailing_remainder() {
        let mut opts = options(
            date(2024, 3, 11),
            date(2024, 3, 11),
            vec![TimeWindow::new(time(9, 0), time(10, 40))],
        );
        opts.duration_minutes = 45;
        let slots = generate_slots(&opts).unwrap();
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[1].end_time, time(10, 30));
    }

    #[test]
    fn window_shorter_than_duration_is_empty() {
        let mut opts = options(
            date(2024, 3, 11),
            date(2024, 3, 11),
            vec![TimeWindow::new(time(11, 30), time(12, 0))],
        );
        opts.duration_minutes = 60;
        assert!(generate_slots(&opts).unwrap().is_empty());
    }

    #[test]
    fn rejects_invalid_ranges() {
        let windows = vec![TimeWindow::new(time(9, 0), time(10, 0))];
        let opts = options(date(2024, 3, 12), date(2024, 3, 11), windows.clone());
        assert!(matches!(
            generate_slots(&opts),
            Err(InvalidRangeError::EndBeforeStart { .. })
        ));

        let mut opts = options(date(2024, 3, 11), date(2024, 3, 12), windows.clone());
        opts.duration_minutes = 0;
        assert_eq!(
            generate_slots(&opts),
            Err(InvalidRangeError::NonPositiveDuration(0))
        );

        let mut opts = options(date(2024, 3, 11), date(2024, 3, 12), windows);
        opts.capacity = 0;
        assert_eq!(
            generate_slots(&opts),
            Err(InvalidRangeError::NonPositiveCapacity(0))
        );

        let opts = options(
            date(2024, 3, 11),
            date(2024, 3, 12),
            vec![TimeWindow::new(time(10, 0), time(9, 0))],
        );
        assert!(matches!(
            generate_slots(&opts),
            Err(InvalidRangeError::EmptyWindow(_))
        ));
    }
}
