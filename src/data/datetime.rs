use chrono::{NaiveDateTime, SecondsFormat, Timelike, Utc};

/// Format a spreadsheet date cell as ISO 8601 text.
/// Dates without a time component drop the `T00:00:00` suffix; sub-second
/// precision is kept to milliseconds.
pub fn format_datetime(dt: NaiveDateTime) -> String {
    if dt.num_seconds_from_midnight() == 0 && dt.nanosecond() == 0 {
        dt.format("%Y-%m-%d").to_string()
    } else if dt.nanosecond() == 0 {
        dt.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        dt.format("%Y-%m-%dT%H:%M:%S%.3f").to_string()
    }
}

/// Current UTC time as RFC 3339, used to stamp stored statistics.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}
