//! Date and date-time fields.
//!
//! Stored values are timestamps (RFC 3339, `YYYY-MM-DD HH:MM:SS` read as
//! UTC) or bare dates. Before formatting, timestamps are converted into the
//! field's time zone, so a late-evening UTC timestamp can land on the next
//! day for a zone east of UTC. Bare dates are calendar dates and are never
//! shifted.

use backoffice_core::i18n::timezone;
use backoffice_core::i18n::Localizer;
use backoffice_core::utils::text;
use backoffice_core::AdminResult;
use chrono::{DateTime, NaiveDate, TimeZone};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// The format used when a field does not name one.
pub const DEFAULT_FORMAT: &str = "default";

/// Options shared by date and date-time fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateOptions {
    /// A named format (`default`, `short`, `long`) or a strftime pattern.
    pub format: Option<String>,
    /// An IANA time zone overriding the configured one.
    pub timezone: Option<String>,
    /// The format handed to client-side date pickers.
    pub datetimepicker_format: Option<String>,
}

impl DateOptions {
    /// Creates empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the display format.
    #[must_use]
    pub fn format(mut self, format: &str) -> Self {
        self.format = Some(format.to_string());
        self
    }

    /// Sets the time zone.
    #[must_use]
    pub fn timezone(mut self, timezone: &str) -> Self {
        self.timezone = Some(timezone.to_string());
        self
    }

    /// Sets the date picker format.
    #[must_use]
    pub fn datetimepicker_format(mut self, format: &str) -> Self {
        self.datetimepicker_format = Some(format.to_string());
        self
    }
}

/// A date value bound to its options and a localizer.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use backoffice_admin::field::{DateField, DateOptions};
/// use backoffice_core::i18n::{Localizer, Translations};
/// use serde_json::json;
///
/// let localizer = Localizer::new(
///     Arc::new(Translations::with_defaults()),
///     "en",
///     chrono_tz::Tz::UTC,
/// );
/// let data = json!("2024-06-30T23:30:00Z");
/// let options = DateOptions::new().timezone("Asia/Tokyo");
///
/// let field = DateField::new(&data, &options, &localizer);
/// assert_eq!(field.date().unwrap(), Some("2024-07-01".to_string()));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct DateField<'a> {
    data: &'a serde_json::Value,
    options: &'a DateOptions,
    localizer: &'a Localizer,
}

enum Parsed {
    Date(NaiveDate),
    Instant(DateTime<Tz>),
}

impl<'a> DateField<'a> {
    /// Binds a value to its options.
    pub const fn new(
        data: &'a serde_json::Value,
        options: &'a DateOptions,
        localizer: &'a Localizer,
    ) -> Self {
        Self {
            data,
            options,
            localizer,
        }
    }

    /// The calendar date in the field's time zone, formatted with the
    /// `date.formats` entry named by the field's format.
    ///
    /// Returns `Ok(None)` for blank values. Values that are not dates are
    /// returned as-is. A format name with no catalog entry is an error.
    pub fn date(&self) -> AdminResult<Option<String>> {
        let Some(raw) = self.raw() else {
            return Ok(None);
        };
        let date = match self.parse(raw) {
            Some(Parsed::Date(date)) => date,
            Some(Parsed::Instant(instant)) => instant.date_naive(),
            None => return Ok(Some(raw.to_string())),
        };
        self.localizer
            .localize_date(date, self.format())
            .map(Some)
    }

    /// The instant in the field's time zone, formatted with the
    /// `time.formats` entry named by the field's format.
    ///
    /// Falls back to the raw value when the value cannot be parsed or the
    /// format is unknown.
    pub fn datetime(&self) -> Option<String> {
        let raw = self.raw()?;
        let instant = match self.parse(raw) {
            Some(Parsed::Instant(instant)) => instant,
            Some(Parsed::Date(date)) => {
                let midnight = date.and_hms_opt(0, 0, 0)?;
                match self.time_zone().from_local_datetime(&midnight).earliest() {
                    Some(instant) => instant,
                    None => return Some(raw.to_string()),
                }
            }
            None => return Some(raw.to_string()),
        };
        Some(
            self.localizer
                .localize_time(&instant, self.format())
                .unwrap_or_else(|_| raw.to_string()),
        )
    }

    /// The client-side picker format, empty unless configured.
    pub fn datetimepicker_format(&self) -> &str {
        self.options.datetimepicker_format.as_deref().unwrap_or("")
    }

    /// The display format name or pattern.
    pub fn format(&self) -> &str {
        self.options.format.as_deref().unwrap_or(DEFAULT_FORMAT)
    }

    /// The field's time zone: its own option, else the localizer's default.
    pub fn time_zone(&self) -> Tz {
        self.options
            .timezone
            .as_deref()
            .map_or_else(|| self.localizer.time_zone(), timezone::time_zone_or_utc)
    }

    fn raw(&self) -> Option<&'a str> {
        self.data.as_str().filter(|s| !text::is_blank(s))
    }

    fn parse(&self, raw: &str) -> Option<Parsed> {
        if let Ok(date) = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
            return Some(Parsed::Date(date));
        }
        timezone::parse_instant(raw)
            .map(|utc| Parsed::Instant(timezone::in_time_zone(utc, self.time_zone())))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use backoffice_core::i18n::Translations;
    use serde_json::json;

    use super::*;

    fn localizer(tz: Tz) -> Localizer {
        Localizer::new(Arc::new(Translations::with_defaults()), "en", tz)
    }

    #[test]
    fn test_blank_is_none() {
        let l = localizer(Tz::UTC);
        let opts = DateOptions::new();
        for data in [json!(null), json!(""), json!("  ")] {
            let field = DateField::new(&data, &opts, &l);
            assert_eq!(field.date().unwrap(), None);
            assert_eq!(field.datetime(), None);
        }
    }

    #[test]
    fn test_date_uses_configured_zone() {
        let l = localizer(Tz::America__New_York);
        let opts = DateOptions::new();
        let data = json!("2024-01-15T03:30:00Z");
        let field = DateField::new(&data, &opts, &l);
        assert_eq!(field.date().unwrap().as_deref(), Some("2024-01-14"));
    }

    #[test]
    fn test_bare_date_is_not_shifted() {
        let l = localizer(Tz::America__New_York);
        let opts = DateOptions::new().format("long");
        let data = json!("2024-03-01");
        let field = DateField::new(&data, &opts, &l);
        assert_eq!(field.date().unwrap().as_deref(), Some("March 01, 2024"));
    }

    #[test]
    fn test_date_unknown_format_errors() {
        let l = localizer(Tz::UTC);
        let opts = DateOptions::new().format("fancy");
        let data = json!("2024-03-01");
        assert!(DateField::new(&data, &opts, &l).date().is_err());
    }

    #[test]
    fn test_datetime_formats_in_zone() {
        let l = localizer(Tz::UTC);
        let opts = DateOptions::new().timezone("Europe/Paris");
        let data = json!("2024-07-01 08:00:00");
        let field = DateField::new(&data, &opts, &l);
        assert_eq!(
            field.datetime().as_deref(),
            Some("Mon, 01 Jul 2024 10:00:00 +0200")
        );
    }

    #[test]
    fn test_datetime_falls_back_to_raw() {
        let l = localizer(Tz::UTC);
        let opts = DateOptions::new().format("fancy");
        let data = json!("2024-07-01 08:00:00");
        assert_eq!(
            DateField::new(&data, &opts, &l).datetime().as_deref(),
            Some("2024-07-01 08:00:00")
        );
        let opts = DateOptions::new();
        let data = json!("soon");
        assert_eq!(DateField::new(&data, &opts, &l).datetime().as_deref(), Some("soon"));
    }

    #[test]
    fn test_datetimepicker_format() {
        let l = localizer(Tz::UTC);
        let data = json!(null);
        let plain = DateOptions::new();
        assert_eq!(DateField::new(&data, &plain, &l).datetimepicker_format(), "");
        let custom = DateOptions::new().datetimepicker_format("YYYY-MM-DD");
        assert_eq!(
            DateField::new(&data, &custom, &l).datetimepicker_format(),
            "YYYY-MM-DD"
        );
    }
}
