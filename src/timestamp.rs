//! GitLab webhook timestamp parsing

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::{BridgeError, Result};

/// Format of real webhook deliveries, e.g. `2024-01-01 12:30:15 UTC`.
const GITLAB_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Parses a GitLab event timestamp into unix nanoseconds.
///
/// Real deliveries use [`GITLAB_TIME_FORMAT`]; the "test webhook" button in
/// the GitLab UI sends RFC 3339 instead, so both are accepted. An unset
/// field arrives as `""` or the literal string `"null"` and maps to the
/// zero instant rather than an error.
pub fn parse_gitlab_time(value: &str) -> Result<u64> {
    if value.is_empty() || value == "null" {
        return Ok(0);
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(value, GITLAB_TIME_FORMAT) {
        return Ok(unix_nanos(dt.and_utc()));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(unix_nanos(dt.with_timezone(&Utc)));
    }

    Err(BridgeError::UnparseableTimestamp(value.to_string()))
}

fn unix_nanos(dt: DateTime<Utc>) -> u64 {
    // In-range for any plausible CI timestamp; saturate instead of wrapping.
    dt.timestamp_nanos_opt().unwrap_or(0).max(0) as u64
}
