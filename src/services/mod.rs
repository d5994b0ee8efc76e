pub mod auth;
pub mod grading;
pub mod messaging;
pub mod progress;
pub mod recommendations;
pub mod scheduling;
pub mod streaks;

pub use messaging::MessageHub;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Parses RFC 3339, or a naive `YYYY-MM-DDTHH:MM:SS` taken as UTC, or a bare
/// date taken as UTC midnight.
pub fn parse_timestamp(ts: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(ts, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
