//! Settings for the backoffice admin.
//!
//! [`Settings`] holds every knob the admin reads at request time. It is built
//! once at startup (see [`settings_loader`](crate::settings_loader)) and then
//! shared read-only behind an `Arc`.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Number of records shown per index page when the request does not ask for
/// a specific page size.
pub const DEFAULT_RECORDS_PER_PAGE: usize = 20;

/// The complete set of admin settings.
///
/// # Examples
///
/// ```
/// use backoffice_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert!(settings.debug);
/// assert_eq!(settings.namespace, "admin");
/// assert_eq!(settings.records_per_page, 20);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    // ── Core ─────────────────────────────────────────────────────────

    /// Whether debug mode is enabled.
    pub debug: bool,
    /// The URL namespace the admin is mounted under (e.g. "admin").
    pub namespace: String,

    // ── Listing ──────────────────────────────────────────────────────

    /// Default page size for index pages.
    pub records_per_page: usize,

    // ── Internationalization ─────────────────────────────────────────

    /// The locale used for translations (e.g. "en").
    pub language_code: String,
    /// The default time zone for date fields (an IANA name such as "UTC").
    pub time_zone: String,
    /// Files (JSON or TOML) containing additional translations.
    pub locale_paths: Vec<PathBuf>,

    // ── Logging ──────────────────────────────────────────────────────

    /// The log level filter (e.g. "info", "backoffice_admin=debug").
    pub log_level: String,

    // ── Escape hatch ─────────────────────────────────────────────────

    /// Custom settings that don't fit into the above categories.
    pub extra: HashMap<String, serde_json::Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: true,
            namespace: "admin".to_string(),
            records_per_page: DEFAULT_RECORDS_PER_PAGE,
            language_code: "en".to_string(),
            time_zone: "UTC".to_string(),
            locale_paths: Vec::new(),
            log_level: "info".to_string(),
            extra: HashMap::new(),
        }
    }
}

impl Settings {
    /// Returns the path prefix all admin routes live under (e.g. "/admin").
    pub fn url_prefix(&self) -> String {
        let trimmed = self.namespace.trim_matches('/');
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{trimmed}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let s = Settings::default();
        assert!(s.debug);
        assert_eq!(s.namespace, "admin");
        assert_eq!(s.records_per_page, DEFAULT_RECORDS_PER_PAGE);
        assert_eq!(s.language_code, "en");
        assert_eq!(s.time_zone, "UTC");
        assert_eq!(s.log_level, "info");
        assert!(s.locale_paths.is_empty());
        assert!(s.extra.is_empty());
    }

    #[test]
    fn test_url_prefix() {
        let mut s = Settings::default();
        assert_eq!(s.url_prefix(), "/admin");
        s.namespace = "/backstage/".to_string();
        assert_eq!(s.url_prefix(), "/backstage");
        s.namespace = String::new();
        assert_eq!(s.url_prefix(), "");
    }

    #[test]
    fn test_settings_roundtrip_through_json() {
        let s = Settings::default();
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["records_per_page"], 20);
        let back: Settings = serde_json::from_value(json).unwrap();
        assert_eq!(back.namespace, "admin");
    }
}
