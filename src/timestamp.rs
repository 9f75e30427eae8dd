//! Timestamp handling for access-log entries and `--from`/`--to` bounds.

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};

/// `10/Oct/2023:13:55:36 +0000`
pub const LOG_TIMESTAMP_FORMAT: &str = "%d/%b/%Y:%H:%M:%S %z";

/// `2023-10-10T13:55:36+0000`
const BOUND_FORMAT_WITH_TIME: &str = "%Y-%m-%dT%H:%M:%S%z";
/// `2023-10-10`, interpreted as midnight UTC
const BOUND_FORMAT_DATE_ONLY: &str = "%Y-%m-%d";

/// Parse the bracketed timestamp of an access-log line.
///
/// Returns `None` when the text does not follow [`LOG_TIMESTAMP_FORMAT`]; the
/// parser turns that into an invalid-data rejection.
pub fn parse_log_timestamp(text: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_str(text, LOG_TIMESTAMP_FORMAT).ok()
}

pub fn format_log_timestamp(ts: &DateTime<FixedOffset>) -> String {
    ts.format(LOG_TIMESTAMP_FORMAT).to_string()
}

/// Parse a window bound given on the command line.
///
/// Accepts `YYYY-MM-DDTHH:MM:SS±ZZZZ`, RFC 3339 and a bare `YYYY-MM-DD`
/// (midnight UTC). Surrounding whitespace is ignored.
pub fn parse_bound(text: &str) -> Option<DateTime<FixedOffset>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_str(text, BOUND_FORMAT_WITH_TIME) {
        return Some(dt);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt);
    }

    let date = NaiveDate::parse_from_str(text, BOUND_FORMAT_DATE_ONLY).ok()?;
    let midnight = date.and_hms_opt(0, 0, 0)?;
    Some(Utc.from_utc_datetime(&midnight).fixed_offset())
}
