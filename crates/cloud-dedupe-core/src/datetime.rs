use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

/// Formats with an explicit UTC offset. `%z` accepts both `+05:00` and
/// `+0500`; `%.f` tolerates missing fractional seconds.
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Formats with no offset at all; these are assumed UTC.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parses the modification-time strings cloud-drive APIs hand back.
///
/// Accepts ISO-8601 with `Z`, with a numeric offset (colon optional), with a
/// `T` or space separator, and with or without fractional seconds. Returns
/// `None` when nothing matches; the caller keeps the file and logs a warning.
pub fn parse_modified(raw: &str) -> Option<DateTime<Utc>> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    None
}
