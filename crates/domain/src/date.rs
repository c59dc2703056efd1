use chrono::{NaiveDate, TimeZone};
use chrono_tz::Tz;

/// The calendar date of `now_millis` in the given timezone
pub fn today(now_millis: i64, tz: &Tz) -> NaiveDate {
    tz.timestamp_millis_opt(now_millis)
        .earliest()
        .map(|dt| dt.date_naive())
        .unwrap_or(NaiveDate::MIN)
}

/// RFC 3339 representation of a millisecond timestamp in the given timezone
pub fn format_timestamp(millis: i64, tz: &Tz) -> String {
    tz.timestamp_millis_opt(millis)
        .earliest()
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_default()
}

/// `2024-03-08` style
pub fn format_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// `08/03/2024` style, used in messages sent to participants
pub fn format_date_fr(date: &NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}
