use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Default pattern for timestamps shown to users
pub const DISPLAY_FORMAT: &str = "%d %b %Y, %H:%M";

/// Parses a backend timestamp into local wall-clock time.
///
/// Offset-carrying ISO 8601 values are converted to the local zone; naive values are
/// already local. Date-only values resolve to midnight.
pub fn parse_local(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Local).naive_local());
    }

    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::default()))
}

/// Ordering key for attachment lists; missing or unparsable values sort as the epoch
pub fn sort_key(raw: Option<&str>) -> NaiveDateTime {
    raw.and_then(parse_local).unwrap_or_default()
}

/// First and last millisecond of a calendar day
pub fn day_bounds(date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let start = date.and_time(NaiveTime::default());
    let end = start + Duration::milliseconds(86_399_999);
    (start, end)
}

/// Display form used by the CLI listing; unparsable values are shown raw
pub fn format_local(raw: Option<&str>) -> String {
    format_local_with(raw, DISPLAY_FORMAT)
}

/// Like [`format_local`] with a caller-supplied `strftime` pattern
pub fn format_local_with(raw: Option<&str>, pattern: &str) -> String {
    match raw {
        Some(value) => parse_local(value)
            .map(|dt| dt.format(pattern).to_string())
            .unwrap_or_else(|| value.to_string()),
        None => "-".to_string(),
    }
}
