//! Time zone support for date fields.
//!
//! Time zones are IANA names resolved through [`chrono_tz`]. Stored
//! timestamps are interpreted as UTC and converted into the zone a field (or
//! the settings) asks for before they are formatted.
//!
//! ```
//! use backoffice_core::i18n::timezone;
//!
//! let tz = timezone::parse_time_zone("America/New_York").unwrap();
//! let instant = timezone::parse_instant("2024-01-15T03:30:00Z").unwrap();
//! let local = timezone::in_time_zone(instant, tz);
//! assert_eq!(local.date_naive().to_string(), "2024-01-14");
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{AdminError, AdminResult};

/// Resolves an IANA time zone name such as `"Europe/Paris"` or `"UTC"`.
pub fn parse_time_zone(name: &str) -> AdminResult<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| AdminError::ConfigurationError(format!("Unknown time zone '{name}'")))
}

/// Resolves a time zone name, logging and falling back to UTC when unknown.
pub fn time_zone_or_utc(name: &str) -> Tz {
    parse_time_zone(name).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "falling back to UTC");
        Tz::UTC
    })
}

/// Converts a UTC instant into the given zone.
pub fn in_time_zone(instant: DateTime<Utc>, tz: Tz) -> DateTime<Tz> {
    instant.with_timezone(&tz)
}

/// Parses a stored timestamp.
///
/// Accepts RFC 3339 (`2024-01-15T10:00:00+02:00`), naive date-times
/// (`2024-01-15 10:00:00` or `2024-01-15T10:00:00`, read as UTC) and bare
/// dates (midnight UTC). Returns `None` for anything else.
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Returns the current instant in UTC.
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_time_zone() {
        assert_eq!(parse_time_zone("UTC").unwrap(), Tz::UTC);
        assert_eq!(parse_time_zone(" Europe/Paris ").unwrap(), Tz::Europe__Paris);
        assert!(parse_time_zone("Mars/Olympus").is_err());
    }

    #[test]
    fn test_time_zone_or_utc() {
        assert_eq!(time_zone_or_utc("Asia/Tokyo"), Tz::Asia__Tokyo);
        assert_eq!(time_zone_or_utc("nowhere"), Tz::UTC);
    }

    #[test]
    fn test_parse_instant_formats() {
        let rfc = parse_instant("2024-03-01T12:00:00+02:00").unwrap();
        assert_eq!(rfc.to_rfc3339(), "2024-03-01T10:00:00+00:00");

        let naive = parse_instant("2024-03-01 12:00:00").unwrap();
        assert_eq!(naive.to_rfc3339(), "2024-03-01T12:00:00+00:00");

        let date = parse_instant("2024-03-01").unwrap();
        assert_eq!(date.to_rfc3339(), "2024-03-01T00:00:00+00:00");

        assert!(parse_instant("yesterday").is_none());
    }

    #[test]
    fn test_in_time_zone_crosses_date_line() {
        let instant = parse_instant("2024-06-30T23:30:00Z").unwrap();
        let tokyo = in_time_zone(instant, Tz::Asia__Tokyo);
        assert_eq!(tokyo.date_naive().to_string(), "2024-07-01");
    }
}
