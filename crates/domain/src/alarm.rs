//! Next-alarm sensor parsing.

use chrono::{DateTime, Local, NaiveDateTime};

use crate::time::WallClock;

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a next-alarm sensor state into local wall-clock time.
///
/// Accepts RFC 3339 timestamps (converted to local time) and naive
/// `YYYY-MM-DD[T ]HH:MM[:SS]` forms. Empty, `unknown`, `unavailable` and
/// anything else unparsable yield `None`.
#[must_use]
pub fn parse_alarm(state: &str) -> Option<WallClock> {
    let state = state.trim();
    if state.is_empty() || state == "unknown" || state == "unavailable" {
        return None;
    }
    if let Ok(instant) = DateTime::parse_from_rfc3339(state) {
        return Some(instant.with_timezone(&Local).naive_local());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(state, format).ok())
}
