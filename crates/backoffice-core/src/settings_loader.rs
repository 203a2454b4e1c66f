//! Settings loading from configuration files.
//!
//! ## Loading Order
//!
//! 1. Start with default settings.
//! 2. Load from a TOML or JSON file (overriding defaults).
//! 3. Apply environment variable overrides (highest priority).
//!
//! ## Environment Variable Mapping
//!
//! | Env Var | Setting |
//! |---|---|
//! | `BACKOFFICE_DEBUG` | `debug` |
//! | `BACKOFFICE_NAMESPACE` | `namespace` |
//! | `BACKOFFICE_RECORDS_PER_PAGE` | `records_per_page` |
//! | `BACKOFFICE_LANGUAGE_CODE` | `language_code` |
//! | `BACKOFFICE_TIME_ZONE` | `time_zone` |
//! | `BACKOFFICE_LOCALE_PATHS` | `locale_paths` (comma-separated) |
//! | `BACKOFFICE_LOG_LEVEL` | `log_level` |
//!
//! ## Examples
//!
//! ```rust,no_run
//! use backoffice_core::settings_loader;
//!
//! let settings = settings_loader::from_toml_file_with_env("config/backoffice.toml").unwrap();
//! ```

use std::path::{Path, PathBuf};

use crate::error::AdminError;
use crate::settings::Settings;

/// Prefix shared by every environment variable the loader reads.
pub const ENV_PREFIX: &str = "BACKOFFICE_";

/// Loads settings from a TOML string.
///
/// Any fields not present in the TOML keep their default values.
pub fn from_toml_str(toml_str: &str) -> Result<Settings, AdminError> {
    // Merge through serde_json so that absent keys fall back to defaults.
    let toml_value: toml::Value = toml::from_str(toml_str)
        .map_err(|e| AdminError::ConfigurationError(format!("Failed to parse TOML: {e}")))?;

    merge_over_defaults(toml_to_json(toml_value), "TOML")
}

/// Loads settings from a TOML file.
pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Settings, AdminError> {
    from_toml_str(&read_config(path.as_ref(), "TOML")?)
}

/// Loads settings from a TOML file and then applies environment variable overrides.
pub fn from_toml_file_with_env(path: impl AsRef<Path>) -> Result<Settings, AdminError> {
    let mut settings = from_toml_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from a JSON string.
pub fn from_json_str(json_str: &str) -> Result<Settings, AdminError> {
    let json_value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| AdminError::ConfigurationError(format!("Failed to parse JSON: {e}")))?;

    merge_over_defaults(json_value, "JSON")
}

/// Loads settings from a JSON file.
pub fn from_json_file(path: impl AsRef<Path>) -> Result<Settings, AdminError> {
    from_json_str(&read_config(path.as_ref(), "JSON")?)
}

/// Loads settings from just environment variables (starting from defaults).
pub fn from_env() -> Settings {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings);
    settings
}

/// Applies `BACKOFFICE_*` environment variable overrides to a settings struct.
pub fn apply_env_overrides(settings: &mut Settings) {
    apply_overrides(settings, |name| std::env::var(name).ok());
}

/// Applies overrides using `lookup` to resolve each variable name.
///
/// Values that fail to parse (e.g. a non-numeric page size) are ignored and
/// logged at warn level.
pub fn apply_overrides<F>(settings: &mut Settings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let var = |suffix: &str| lookup(&format!("{ENV_PREFIX}{suffix}"));

    if let Some(val) = var("DEBUG") {
        settings.debug = matches!(val.to_lowercase().as_str(), "true" | "1" | "yes");
    }

    if let Some(val) = var("NAMESPACE") {
        settings.namespace = val;
    }

    if let Some(val) = var("RECORDS_PER_PAGE") {
        match val.parse::<usize>() {
            Ok(n) if n > 0 => settings.records_per_page = n,
            _ => tracing::warn!(value = %val, "ignoring invalid BACKOFFICE_RECORDS_PER_PAGE"),
        }
    }

    if let Some(val) = var("LANGUAGE_CODE") {
        settings.language_code = val;
    }

    if let Some(val) = var("TIME_ZONE") {
        settings.time_zone = val;
    }

    if let Some(val) = var("LOCALE_PATHS") {
        settings.locale_paths = val
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .collect();
    }

    if let Some(val) = var("LOG_LEVEL") {
        settings.log_level = val;
    }
}

// ============================================================
// Helpers
// ============================================================

fn read_config(path: &Path, kind: &str) -> Result<String, AdminError> {
    std::fs::read_to_string(path).map_err(|e| {
        AdminError::ConfigurationError(format!(
            "Failed to read {kind} file '{}': {e}",
            path.display()
        ))
    })
}

fn merge_over_defaults(value: serde_json::Value, kind: &str) -> Result<Settings, AdminError> {
    let default_json = serde_json::to_value(Settings::default()).map_err(|e| {
        AdminError::ConfigurationError(format!("Failed to serialize default settings: {e}"))
    })?;

    let merged = merge_json(default_json, value);
    serde_json::from_value(merged).map_err(|e| {
        AdminError::ConfigurationError(format!("Failed to deserialize settings from {kind}: {e}"))
    })
}

/// Converts a TOML value to a `serde_json::Value`.
pub(crate) fn toml_to_json(value: toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::json!(i),
        toml::Value::Float(f) => serde_json::json!(f),
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        toml::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(toml_to_json).collect())
        }
        toml::Value::Table(table) => {
            let map: serde_json::Map<String, serde_json::Value> = table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect();
            serde_json::Value::Object(map)
        }
    }
}

/// Deep-merges two JSON values. The `override_val` takes precedence.
fn merge_json(base: serde_json::Value, override_val: serde_json::Value) -> serde_json::Value {
    match (base, override_val) {
        (serde_json::Value::Object(mut base_map), serde_json::Value::Object(override_map)) => {
            for (key, override_v) in override_map {
                let merged = if let Some(base_v) = base_map.remove(&key) {
                    merge_json(base_v, override_v)
                } else {
                    override_v
                };
                base_map.insert(key, merged);
            }
            serde_json::Value::Object(base_map)
        }
        (_, override_val) => override_val,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    // ── TOML loading ────────────────────────────────────────────────

    #[test]
    fn test_from_toml_str_basic() {
        let toml = r#"
            debug = false
            namespace = "backstage"
            records_per_page = 50
        "#;

        let settings = from_toml_str(toml).unwrap();
        assert!(!settings.debug);
        assert_eq!(settings.namespace, "backstage");
        assert_eq!(settings.records_per_page, 50);
        // Defaults preserved
        assert_eq!(settings.time_zone, "UTC");
    }

    #[test]
    fn test_from_toml_str_empty() {
        let settings = from_toml_str("").unwrap();
        assert!(settings.debug);
        assert_eq!(settings.records_per_page, 20);
    }

    #[test]
    fn test_from_toml_str_extra() {
        let toml = r#"
            [extra]
            brand = "Acme"
        "#;
        let settings = from_toml_str(toml).unwrap();
        assert_eq!(settings.extra["brand"], "Acme");
    }

    #[test]
    fn test_from_toml_str_invalid() {
        let err = from_toml_str("debug = [").unwrap_err();
        assert!(err.to_string().contains("Failed to parse TOML"));
    }

    #[test]
    fn test_from_toml_str_wrong_type() {
        let err = from_toml_str("records_per_page = \"many\"").unwrap_err();
        assert!(matches!(err, AdminError::ConfigurationError(_)));
    }

    // ── JSON loading ────────────────────────────────────────────────

    #[test]
    fn test_from_json_str_basic() {
        let json = r#"{"language_code": "fr", "time_zone": "Europe/Paris"}"#;
        let settings = from_json_str(json).unwrap();
        assert_eq!(settings.language_code, "fr");
        assert_eq!(settings.time_zone, "Europe/Paris");
        assert_eq!(settings.namespace, "admin");
    }

    #[test]
    fn test_from_json_str_invalid() {
        assert!(from_json_str("{not json").is_err());
    }

    #[test]
    fn test_from_toml_file_missing() {
        let err = from_toml_file("/definitely/not/here.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read TOML file"));
    }

    // ── Overrides ───────────────────────────────────────────────────

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_apply_overrides() {
        let mut settings = Settings::default();
        apply_overrides(
            &mut settings,
            lookup_from(&[
                ("BACKOFFICE_DEBUG", "false"),
                ("BACKOFFICE_NAMESPACE", "staff"),
                ("BACKOFFICE_RECORDS_PER_PAGE", "5"),
                ("BACKOFFICE_LOCALE_PATHS", "locales/en.json, locales/fr.toml,"),
                ("BACKOFFICE_LOG_LEVEL", "debug"),
            ]),
        );
        assert!(!settings.debug);
        assert_eq!(settings.namespace, "staff");
        assert_eq!(settings.records_per_page, 5);
        assert_eq!(
            settings.locale_paths,
            vec![PathBuf::from("locales/en.json"), PathBuf::from("locales/fr.toml")]
        );
        assert_eq!(settings.log_level, "debug");
    }

    #[test]
    fn test_apply_overrides_ignores_invalid_page_size() {
        let mut settings = Settings::default();
        apply_overrides(
            &mut settings,
            lookup_from(&[("BACKOFFICE_RECORDS_PER_PAGE", "0")]),
        );
        assert_eq!(settings.records_per_page, 20);
        apply_overrides(
            &mut settings,
            lookup_from(&[("BACKOFFICE_RECORDS_PER_PAGE", "lots")]),
        );
        assert_eq!(settings.records_per_page, 20);
    }

    #[test]
    fn test_merge_json_nested() {
        let base = serde_json::json!({"a": {"b": 1, "c": 2}, "d": 3});
        let over = serde_json::json!({"a": {"b": 10}});
        let merged = merge_json(base, over);
        assert_eq!(merged, serde_json::json!({"a": {"b": 10, "c": 2}, "d": 3}));
    }
}
