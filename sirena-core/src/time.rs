//! Conversions between [`Timestamp`] and `chrono` instants

use chrono::{DateTime, TimeZone, Utc};

use crate::{SECONDS_PER_DAY, Seconds, Timestamp};

pub fn to_timestamp(instant: DateTime<Utc>) -> Timestamp {
    instant.timestamp_millis() as f64 / 1000.0
}

/// Returns `None` when the timestamp is outside of the range `chrono` can represent
#[allow(clippy::cast_possible_truncation)]
pub fn from_timestamp(timestamp: Timestamp) -> Option<DateTime<Utc>> {
    if !timestamp.is_finite() {
        return None;
    }
    Utc.timestamp_millis_opt((timestamp * 1000.0).round() as i64)
        .single()
}

pub fn now() -> Timestamp {
    to_timestamp(Utc::now())
}

/// Position of an instant inside the daily cycle, always in `[0, 86400)`
pub fn seconds_of_day(timestamp: Timestamp) -> Seconds {
    timestamp.rem_euclid(SECONDS_PER_DAY)
}
