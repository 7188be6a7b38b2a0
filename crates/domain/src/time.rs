//! Time and wall-clock helpers.
//!
//! The engine reasons in local wall-clock time (alarms, "midnight", "9 AM"),
//! so timestamps are naive local date-times rather than UTC instants.

use chrono::{Duration, Local, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer};

use crate::error::ValidationError;

/// Local wall-clock timestamp.
pub type WallClock = NaiveDateTime;

/// Return the current local wall-clock time.
#[must_use]
pub fn now() -> WallClock {
    Local::now().naive_local()
}

/// Time of day from hour and minute; out-of-range input yields midnight.
#[must_use]
pub fn hour_minute(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default()
}

/// First instant strictly after `after` whose time of day is `at`.
#[must_use]
pub fn next_occurrence(after: WallClock, at: NaiveTime) -> WallClock {
    let same_day = after.date().and_time(at);
    if same_day > after {
        same_day
    } else {
        same_day + Duration::days(1)
    }
}

/// Parse `HH:MM` (or `HH:MM:SS`) into a time of day.
///
/// # Errors
///
/// Returns [`ValidationError::TimeOfDay`] when the text matches neither form.
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime, ValidationError> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| ValidationError::TimeOfDay {
            value: value.to_string(),
        })
}

/// Serde adapter for `HH:MM` fields in configuration files.
///
/// # Errors
///
/// Fails deserialisation when the string is not a valid time of day.
pub fn deserialize_time_of_day<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_time_of_day(&raw).map_err(serde::de::Error::custom)
}
