//! Parsing of stored reference timestamps.
//!
//! Reference instants usually come from a separate column written by whatever
//! captured the relative text, so they arrive in a handful of formats. Naive
//! forms (no offset) are interpreted in the caller's timezone.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};
use chrono_tz::Tz;

use crate::error::{DateError, Result};

/// Naive datetime layouts accepted, tried in order.
const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse an IANA timezone name into `Tz`.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| DateError::InvalidTimezone(format!("'{}'", name)))
}

/// Parse a reference timestamp.
///
/// Accepts RFC 3339 (converted into `tz`), `YYYY-MM-DD[T ]HH:MM[:SS[.fff]]`,
/// and a bare `YYYY-MM-DD` (local midnight). Naive times that fall in a DST
/// gap are rejected; times in a DST overlap take the earlier instant.
///
/// # Errors
///
/// Returns [`DateError::InvalidReference`] if no format matches.
pub fn parse_reference(text: &str, tz: Tz) -> Result<DateTime<Tz>> {
    let s = text.trim();
    if s.is_empty() {
        return Err(DateError::InvalidReference("empty timestamp".to_string()));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&tz));
    }

    let naive = NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| DateError::InvalidReference(format!("'{}': unrecognized format", s)))?;

    tz.from_local_datetime(&naive).earliest().ok_or_else(|| {
        DateError::InvalidReference(format!("'{}': nonexistent local time in {}", s, tz))
    })
}
