//! Time conversions for values reported by the backend.

use chrono::{DateTime, NaiveDateTime, Utc};

/// The time on Steam's servers.
pub type ServerTime = DateTime<Utc>;

/// Format of the `acquired` item property e.g. `20240131T104512Z`.
const ACQUIRED_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Converts a timestamp into a [`ServerTime`]. Out of range values are clamped to the epoch.
pub fn timestamp_to_server_time(timestamp: i64) -> ServerTime {
    DateTime::from_timestamp(timestamp, 0).unwrap_or_default()
}

/// Gets the current time.
pub fn get_server_time_now() -> ServerTime {
    Utc::now()
}

/// Parses the compact ISO 8601 format Steam uses for item acquisition times.
pub fn parse_acquired_time(value: &str) -> Option<ServerTime> {
    NaiveDateTime::parse_from_str(value, ACQUIRED_FORMAT)
        .ok()
        .map(|date| date.and_utc())
}
