//! Internationalization and localization.
//!
//! - **Catalogs**: [`catalog::Translations`] maps dotted keys to plain or
//!   pluralized strings per locale.
//! - **Time zones**: [`timezone`] resolves IANA names and converts stored
//!   UTC timestamps.
//!
//! [`load_translations`] builds the catalog set the admin uses from
//! [`Settings`]: the built-in English entries first, then every file in
//! `locale_paths` in order, later files overriding earlier ones.

pub mod catalog;
pub mod timezone;

use std::sync::Arc;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;

use crate::error::{AdminError, AdminResult};
use crate::settings::Settings;

pub use catalog::{interpolate, Entry, Translations};

/// Builds the translation catalogs described by `settings`.
pub fn load_translations(settings: &Settings) -> AdminResult<Translations> {
    let mut translations = Translations::with_defaults();
    for path in &settings.locale_paths {
        translations.load_file(path)?;
        tracing::debug!(path = %path.display(), "loaded translations");
    }
    Ok(translations)
}

/// Resolves a named format (`default`, `short`, ...) under `scope`
/// (`date` or `time`) into a strftime pattern.
///
/// Names that are not in the catalog are treated as literal patterns when
/// they contain a `%` directive.
pub fn format_pattern(
    translations: &Translations,
    locale: &str,
    scope: &str,
    name: &str,
) -> AdminResult<String> {
    let key = format!("{scope}.formats.{name}");
    if let Some(pattern) = translations.translate(locale, &key, &[]) {
        return Ok(pattern);
    }
    if name.contains('%') {
        return validate_pattern(name);
    }
    Err(AdminError::ConfigurationError(format!(
        "Translation missing: {locale}.{key}"
    )))
}

/// Formats dates and times for one locale and default time zone.
///
/// A request builds one `Localizer` from the shared catalogs and the
/// configured language and time zone; date fields borrow it to render
/// themselves.
#[derive(Debug, Clone)]
pub struct Localizer {
    translations: Arc<Translations>,
    locale: String,
    time_zone: Tz,
}

impl Localizer {
    /// Creates a localizer for `locale` whose default zone is `time_zone`.
    pub fn new(translations: Arc<Translations>, locale: impl Into<String>, time_zone: Tz) -> Self {
        Self {
            translations,
            locale: locale.into(),
            time_zone,
        }
    }

    /// Creates a localizer from the language and time zone in `settings`.
    ///
    /// An unknown time zone name falls back to UTC.
    pub fn from_settings(translations: Arc<Translations>, settings: &Settings) -> Self {
        Self::new(
            translations,
            settings.language_code.clone(),
            timezone::time_zone_or_utc(&settings.time_zone),
        )
    }

    /// The active locale.
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// The default time zone.
    pub const fn time_zone(&self) -> Tz {
        self.time_zone
    }

    /// The catalogs this localizer reads from.
    pub fn translations(&self) -> &Translations {
        &self.translations
    }

    /// Translates `key` in the active locale.
    pub fn translate(&self, key: &str, vars: &[(&str, &str)]) -> Option<String> {
        self.translations.translate(&self.locale, key, vars)
    }

    /// Formats a date with the named (or literal) `date` format.
    pub fn localize_date(&self, date: NaiveDate, format: &str) -> AdminResult<String> {
        let pattern = format_pattern(&self.translations, &self.locale, "date", format)?;
        Ok(date.format(&pattern).to_string())
    }

    /// Formats an instant with the named (or literal) `time` format.
    pub fn localize_time(&self, instant: &DateTime<Tz>, format: &str) -> AdminResult<String> {
        let pattern = format_pattern(&self.translations, &self.locale, "time", format)?;
        Ok(instant.format(&pattern).to_string())
    }
}

fn validate_pattern(pattern: &str) -> AdminResult<String> {
    if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
        return Err(AdminError::ConfigurationError(format!(
            "Invalid date format '{pattern}'"
        )));
    }
    Ok(pattern.to_string())
}
