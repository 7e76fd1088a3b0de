use crate::warehouse::models::TimeRow;
use chrono::{DateTime, Datelike, NaiveDateTime, Timelike};

/// Epoch milliseconds to a naive UTC timestamp, `None` when out of range.
pub fn start_time_from_millis(ts: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_millis(ts).map(|dt| dt.naive_utc())
}

pub fn time_row(start_time: NaiveDateTime) -> TimeRow {
    TimeRow {
        start_time,
        hour: start_time.hour(),
        day: start_time.day(),
        week: start_time.iso_week().week(),
        month: start_time.month(),
        year: start_time.year(),
        weekday: start_time.weekday().num_days_from_monday(),
    }
}
