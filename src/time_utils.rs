use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Parse the calendar date of a backend date string.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps (the date in the timestamp's own
/// offset) and naive `YYYY-MM-DD[T ]HH:MM:SS` timestamps.
pub fn parse_entry_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|ts| ts.date())
}

/// Short month/day label, e.g. `Jan 5`.
///
/// Unparseable input is returned unchanged so the axis still shows something.
pub fn format_date_label(raw: &str) -> String {
    match parse_entry_date(raw) {
        Some(date) => date.format("%b %-d").to_string(),
        None => raw.to_string(),
    }
}
