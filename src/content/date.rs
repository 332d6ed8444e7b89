//! Date parsing for entry `date` fields

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Parse an entry date string into a UTC timestamp
///
/// Values without an offset are read as UTC. Returns `None` for anything
/// unrecognised; callers decide how an undated entry is ordered.
pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    // The CMS date widget emits minute precision with an offset
    let offset_formats = ["%Y-%m-%dT%H:%M%:z", "%Y-%m-%dT%H:%M%z", "%Y-%m-%dT%H:%M:%S%z"];
    for fmt in offset_formats {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    let naive_formats = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];
    for fmt in naive_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc());
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }

    None
}

/// Format a raw date string for display, leaving unparsable input untouched
pub fn format_date(raw: &str, format: &str) -> String {
    match parse_date(raw) {
        Some(date) => date.format(format).to_string(),
        None => raw.to_string(),
    }
}

/// ISO 8601 form used in `<time datetime="...">`
pub fn date_xml(raw: &str) -> Option<String> {
    parse_date(raw).map(|d| d.format("%Y-%m-%dT%H:%M:%SZ").to_string())
}
