//! Timestamp normalisation for the ISO-8601 variants SOS servers emit.

use crate::error::{Result, SosError};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

// chrono's %z accepts both +hh:mm and +hhmm
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M%z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// Parse an ISO-ish timestamp into UTC.
///
/// Offsets are honoured when present; naive timestamps are taken as UTC.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, format) {
            return Ok(dt.with_timezone(&Utc));
        }
    }

    let naive = value.trim_end_matches('Z');
    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(naive, format) {
            return Ok(dt.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(naive, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(dt.and_utc());
        }
    }

    Err(SosError::InvalidTimestamp {
        value: value.to_string(),
    })
}

/// Drop everything from the first `.` onwards (fractional seconds and
/// whatever follows them).
pub fn strip_fractional_seconds(value: &str) -> &str {
    value.split('.').next().unwrap_or(value)
}

/// Second-precision UTC form used in `eventTime` request parameters
pub fn format_event_time(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Render a timestamp for a `datetime-local` style input (`YYYY-MM-DDTHH:MM`).
///
/// Retries with any `+hh:mm` suffix removed before giving up.
pub fn format_for_datetime_input(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        return None;
    }
    let parsed = parse_timestamp(value).or_else(|_| {
        let without_offset = value.split('+').next().unwrap_or(value);
        parse_timestamp(without_offset)
    });
    parsed
        .ok()
        .map(|dt| dt.format("%Y-%m-%dT%H:%M").to_string())
}
