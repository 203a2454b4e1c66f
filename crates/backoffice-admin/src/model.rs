//! Store-side schema for resource types.
//!
//! A [`Model`] tells a store how to validate a resource before saving it and
//! which dependent records block its deletion. Messages follow the usual
//! admin phrasing ("can't be blank", "is too long (maximum is 5
//! characters)") so that [`ValidationErrors::full_messages`] reads naturally.

use std::sync::OnceLock;

use backoffice_core::utils::{inflector, text};
use backoffice_core::ValidationErrors;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::resource::Resource;

/// A single validation rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Validation {
    /// The attribute must be present and not blank.
    Presence(String),
    /// String length bounds, in characters.
    Length {
        /// The attribute to check.
        attribute: String,
        /// Minimum length, inclusive.
        min: Option<usize>,
        /// Maximum length, inclusive.
        max: Option<usize>,
    },
    /// The attribute, when present, must look like an email address.
    Email(String),
    /// The attribute, when present, must be one of `values`.
    Inclusion {
        /// The attribute to check.
        attribute: String,
        /// Accepted values.
        values: Vec<String>,
    },
    /// The attribute, when present, must be numeric.
    Numericality(String),
}

/// A dependent relation that prevents deletion while records reference
/// this one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependent {
    /// The dependent resource type (e.g. "order").
    pub type_name: String,
    /// The attribute on the dependent holding this record's id.
    pub foreign_key: String,
    /// The association label used in error messages (e.g. "orders").
    pub label: String,
}

impl Dependent {
    /// Creates a dependent relation; the label is the pluralized, humanized
    /// type name.
    pub fn new(type_name: impl Into<String>, foreign_key: impl Into<String>) -> Self {
        let type_name = type_name.into();
        let label = inflector::humanize(&inflector::pluralize(&type_name)).to_lowercase();
        Self {
            type_name,
            foreign_key: foreign_key.into(),
            label,
        }
    }
}

/// The schema for one resource type.
///
/// # Examples
///
/// ```
/// use backoffice_admin::model::Model;
/// use backoffice_admin::resource::Resource;
/// use serde_json::json;
///
/// let model = Model::new("customer")
///     .validates_presence_of("name")
///     .validates_email_of("email");
///
/// let mut customer = Resource::new("customer");
/// customer.set("email", json!("not-an-email"));
///
/// let errors = model.validate(&customer);
/// assert_eq!(
///     errors.full_messages(),
///     vec!["Name can't be blank".to_string(), "Email is invalid".to_string()]
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    /// The resource type name.
    pub type_name: String,
    /// Validations, run in declaration order.
    pub validations: Vec<Validation>,
    /// Relations that restrict deletion.
    pub restrict_dependents: Vec<Dependent>,
}

impl Model {
    /// Creates a schema with no validations.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            validations: Vec::new(),
            restrict_dependents: Vec::new(),
        }
    }

    /// Adds a presence validation.
    #[must_use]
    pub fn validates_presence_of(mut self, attribute: &str) -> Self {
        self.validations
            .push(Validation::Presence(attribute.to_string()));
        self
    }

    /// Adds a length validation.
    #[must_use]
    pub fn validates_length_of(
        mut self,
        attribute: &str,
        min: Option<usize>,
        max: Option<usize>,
    ) -> Self {
        self.validations.push(Validation::Length {
            attribute: attribute.to_string(),
            min,
            max,
        });
        self
    }

    /// Adds an email format validation.
    #[must_use]
    pub fn validates_email_of(mut self, attribute: &str) -> Self {
        self.validations.push(Validation::Email(attribute.to_string()));
        self
    }

    /// Adds an inclusion validation.
    #[must_use]
    pub fn validates_inclusion_of(mut self, attribute: &str, values: &[&str]) -> Self {
        self.validations.push(Validation::Inclusion {
            attribute: attribute.to_string(),
            values: values.iter().map(|v| (*v).to_string()).collect(),
        });
        self
    }

    /// Adds a numericality validation.
    #[must_use]
    pub fn validates_numericality_of(mut self, attribute: &str) -> Self {
        self.validations
            .push(Validation::Numericality(attribute.to_string()));
        self
    }

    /// Blocks deletion while `type_name` records point at this one through
    /// `foreign_key`.
    #[must_use]
    pub fn restrict_dependent(mut self, type_name: &str, foreign_key: &str) -> Self {
        self.restrict_dependents
            .push(Dependent::new(type_name, foreign_key));
        self
    }

    /// Runs every validation against `resource`.
    pub fn validate(&self, resource: &Resource) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        for validation in &self.validations {
            check(validation, resource, &mut errors);
        }
        errors
    }
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid regex"))
}

fn check(validation: &Validation, resource: &Resource, errors: &mut ValidationErrors) {
    match validation {
        Validation::Presence(attribute) => {
            if is_blank(resource.get(attribute)) {
                errors.add(attribute, "can't be blank");
            }
        }
        Validation::Length {
            attribute,
            min,
            max,
        } => {
            let len = resource
                .get(attribute)
                .and_then(serde_json::Value::as_str)
                .map_or(0, |s| s.chars().count());
            if let Some(min) = min.filter(|min| len < *min) {
                errors.add(
                    attribute,
                    format!("is too short (minimum is {min} characters)"),
                );
            }
            if let Some(max) = max.filter(|max| len > *max) {
                errors.add(
                    attribute,
                    format!("is too long (maximum is {max} characters)"),
                );
            }
        }
        Validation::Email(attribute) => {
            if let Some(value) = present_text(resource.get(attribute)) {
                if !email_regex().is_match(&value) {
                    errors.add(attribute, "is invalid");
                }
            }
        }
        Validation::Inclusion { attribute, values } => {
            if let Some(value) = present_text(resource.get(attribute)) {
                if !values.contains(&value) {
                    errors.add(attribute, "is not included in the list");
                }
            }
        }
        Validation::Numericality(attribute) => match resource.get(attribute) {
            None | Some(serde_json::Value::Null | serde_json::Value::Number(_)) => {}
            Some(serde_json::Value::String(s)) if s.trim().parse::<f64>().is_ok() => {}
            Some(serde_json::Value::String(s)) if text::is_blank(s) => {}
            Some(_) => errors.add(attribute, "is not a number"),
        },
    }
}

fn is_blank(value: Option<&serde_json::Value>) -> bool {
    match value {
        None | Some(serde_json::Value::Null) => true,
        Some(serde_json::Value::String(s)) => text::is_blank(s),
        Some(serde_json::Value::Array(items)) => items.is_empty(),
        Some(serde_json::Value::Object(map)) => map.is_empty(),
        Some(_) => false,
    }
}

fn present_text(value: Option<&serde_json::Value>) -> Option<String> {
    if is_blank(value) {
        return None;
    }
    value.map(|v| match v {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}
