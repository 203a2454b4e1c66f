//! Translation catalogs.
//!
//! A [`Translations`] value stores, per locale, a flat map of dotted keys
//! (`backoffice.controller.create.success`, `models.customer`) to either a
//! plain string or a set of plural forms. Catalogs are built at startup from
//! the built-in English defaults plus any JSON/TOML files listed in the
//! settings, then shared read-only.
//!
//! ## File Format
//!
//! Top-level keys are locales; nested tables become dotted keys; a table
//! with an `other` key (and optionally `zero`/`one`) is a plural entry.
//!
//! ```json
//! {
//!   "en": {
//!     "models": {
//!       "customer": { "one": "User", "other": "Users" }
//!     },
//!     "backoffice": {
//!       "controller": { "create": { "success": "%{resource} saved." } }
//!     }
//!   }
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use crate::error::{AdminError, AdminResult};

/// Keys that mark a nested table as a plural entry rather than a namespace.
const PLURAL_KEYS: &[&str] = &["zero", "one", "two", "few", "many", "other"];

/// A single catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// A plain translated string.
    Text(String),
    /// Count-dependent forms.
    Plural {
        /// Form used when the count is 0, if provided.
        zero: Option<String>,
        /// Form used when the count is exactly 1.
        one: String,
        /// Form used for every other count.
        other: String,
    },
}

impl Entry {
    /// Picks the form for `count`.
    pub fn for_count(&self, count: usize) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Plural { zero, one, other } => match count {
                0 => zero.as_deref().unwrap_or(other),
                1 => one,
                _ => other,
            },
        }
    }
}

/// Translation catalogs for every configured locale.
///
/// # Examples
///
/// ```
/// use backoffice_core::i18n::catalog::Translations;
///
/// let mut translations = Translations::with_defaults();
/// translations.insert_plural("en", "models.customer", "User", "Users");
///
/// assert_eq!(
///     translations.translate_count("en", "models.customer", 1, &[]),
///     Some("User".to_string())
/// );
/// assert_eq!(
///     translations.translate("en", "backoffice.controller.create.success", &[("resource", "User")]),
///     Some("User was successfully created.".to_string())
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct Translations {
    locales: HashMap<String, HashMap<String, Entry>>,
}

impl Translations {
    /// Creates an empty catalog set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog set pre-loaded with the built-in English entries:
    /// controller notices and the default date/time formats.
    pub fn with_defaults() -> Self {
        let mut translations = Self::new();
        for (key, text) in [
            (
                "backoffice.controller.create.success",
                "%{resource} was successfully created.",
            ),
            (
                "backoffice.controller.update.success",
                "%{resource} was successfully updated.",
            ),
            (
                "backoffice.controller.destroy.success",
                "%{resource} was successfully destroyed.",
            ),
            ("date.formats.default", "%Y-%m-%d"),
            ("date.formats.short", "%b %d"),
            ("date.formats.long", "%B %d, %Y"),
            ("time.formats.default", "%a, %d %b %Y %H:%M:%S %z"),
            ("time.formats.short", "%d %b %H:%M"),
            ("time.formats.long", "%B %d, %Y %H:%M"),
        ] {
            translations.insert_text("en", key, text);
        }
        translations
    }

    /// Inserts (or replaces) a plain entry.
    pub fn insert_text(&mut self, locale: &str, key: &str, text: impl Into<String>) {
        self.insert(locale, key, Entry::Text(text.into()));
    }

    /// Inserts (or replaces) a plural entry.
    pub fn insert_plural(
        &mut self,
        locale: &str,
        key: &str,
        one: impl Into<String>,
        other: impl Into<String>,
    ) {
        self.insert(
            locale,
            key,
            Entry::Plural {
                zero: None,
                one: one.into(),
                other: other.into(),
            },
        );
    }

    /// Inserts (or replaces) an entry.
    pub fn insert(&mut self, locale: &str, key: &str, entry: Entry) {
        self.locales
            .entry(locale.to_string())
            .or_default()
            .insert(key.to_string(), entry);
    }

    /// Returns `true` if entries exist for `locale`.
    pub fn has_locale(&self, locale: &str) -> bool {
        self.locales.contains_key(locale)
    }

    /// Looks up an entry, falling back from a regional locale (`en-us`) to
    /// its base language (`en`).
    pub fn lookup(&self, locale: &str, key: &str) -> Option<&Entry> {
        let exact = self.locales.get(locale).and_then(|entries| entries.get(key));
        exact.or_else(|| {
            let base = locale.split(['-', '_']).next()?;
            if base == locale {
                return None;
            }
            self.locales.get(base).and_then(|entries| entries.get(key))
        })
    }

    /// Translates `key`, interpolating `%{name}` placeholders from `vars`.
    pub fn translate(&self, locale: &str, key: &str, vars: &[(&str, &str)]) -> Option<String> {
        self.translate_count(locale, key, usize::MAX, vars)
    }

    /// Translates `key` choosing the plural form for `count`.
    pub fn translate_count(
        &self,
        locale: &str,
        key: &str,
        count: usize,
        vars: &[(&str, &str)],
    ) -> Option<String> {
        self.lookup(locale, key)
            .map(|entry| interpolate(entry.for_count(count), vars))
    }

    /// Merges every locale from a JSON document into this catalog set.
    pub fn load_json_str(&mut self, json: &str) -> AdminResult<()> {
        let value: serde_json::Value = serde_json::from_str(json).map_err(|e| {
            AdminError::ConfigurationError(format!("Invalid translation JSON: {e}"))
        })?;
        self.load_value(value)
    }

    /// Merges every locale from a TOML document into this catalog set.
    pub fn load_toml_str(&mut self, toml_str: &str) -> AdminResult<()> {
        let value: toml::Value = toml::from_str(toml_str).map_err(|e| {
            AdminError::ConfigurationError(format!("Invalid translation TOML: {e}"))
        })?;
        self.load_value(crate::settings_loader::toml_to_json(value))
    }

    /// Loads a translation file, choosing the parser from its extension.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> AdminResult<()> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            AdminError::ConfigurationError(format!(
                "Failed to read translation file '{}': {e}",
                path.display()
            ))
        })?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => self.load_toml_str(&content),
            Some("json") => self.load_json_str(&content),
            _ => Err(AdminError::ConfigurationError(format!(
                "Unsupported translation file '{}' (expected .json or .toml)",
                path.display()
            ))),
        }
    }

    fn load_value(&mut self, value: serde_json::Value) -> AdminResult<()> {
        let serde_json::Value::Object(locales) = value else {
            return Err(AdminError::ConfigurationError(
                "Translation documents must map locales to tables".to_string(),
            ));
        };
        for (locale, tree) in locales {
            let mut flat = Vec::new();
            flatten(String::new(), &tree, &mut flat);
            for (key, entry) in flat {
                self.insert(&locale, &key, entry);
            }
        }
        Ok(())
    }
}

/// Replaces every `%{name}` in `template` with the matching value.
///
/// Unknown placeholders are left untouched.
pub fn interpolate(template: &str, vars: &[(&str, &str)]) -> String {
    vars.iter().fold(template.to_string(), |acc, (name, value)| {
        acc.replace(&format!("%{{{name}}}"), value)
    })
}

fn plural_entry(table: &serde_json::Map<String, serde_json::Value>) -> Option<Entry> {
    if table.is_empty() || !table.keys().all(|k| PLURAL_KEYS.contains(&k.as_str())) {
        return None;
    }
    let other = table.get("other")?.as_str()?.to_string();
    let one = table
        .get("one")
        .and_then(serde_json::Value::as_str)
        .map_or_else(|| other.clone(), str::to_string);
    let zero = table
        .get("zero")
        .and_then(serde_json::Value::as_str)
        .map(str::to_string);
    Some(Entry::Plural { zero, one, other })
}

fn flatten(prefix: String, value: &serde_json::Value, out: &mut Vec<(String, Entry)>) {
    match value {
        serde_json::Value::String(text) => out.push((prefix, Entry::Text(text.clone()))),
        serde_json::Value::Object(table) => {
            if let Some(entry) = plural_entry(table) {
                out.push((prefix, entry));
                return;
            }
            for (key, child) in table {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten(path, child, out);
            }
        }
        other => tracing::debug!(key = %prefix, value = %other, "skipping non-string translation"),
    }
}
