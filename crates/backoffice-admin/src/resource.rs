//! Persisted resources.
//!
//! A [`Resource`] is the admin's view of one stored record: a type name, an
//! optional primary key (absent until the record is first saved), a dynamic
//! attribute map, and the validation errors left behind by the last failed
//! save or destroy.

use backoffice_core::utils::inflector;
use backoffice_core::ValidationErrors;
use serde::{Deserialize, Serialize};

/// The dynamic attribute map of a resource.
pub type Attributes = serde_json::Map<String, serde_json::Value>;

/// One record of a registered resource type.
///
/// # Examples
///
/// ```
/// use backoffice_admin::resource::Resource;
/// use serde_json::json;
///
/// let mut customer = Resource::new("customer");
/// customer.set("name", json!("Ada"));
/// assert!(!customer.is_persisted());
/// assert_eq!(customer.get("name"), Some(&json!("Ada")));
/// assert_eq!(customer.class_name(), "Customer");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// The resource type name (e.g. "customer", "blog__post").
    pub type_name: String,
    /// The primary key, once persisted.
    pub id: Option<u64>,
    /// Attribute values keyed by attribute name.
    pub attributes: Attributes,
    /// Errors from the last failed mutation.
    #[serde(default, skip_serializing_if = "ValidationErrors::is_empty")]
    pub errors: ValidationErrors,
}

impl Resource {
    /// Creates a new, unsaved resource with no attributes.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            id: None,
            attributes: Attributes::new(),
            errors: ValidationErrors::new(),
        }
    }

    /// Sets the primary key.
    #[must_use]
    pub const fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    /// Replaces the attribute map.
    #[must_use]
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Returns `true` once the resource has been saved.
    pub const fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Returns a stored attribute value.
    pub fn get(&self, attribute: &str) -> Option<&serde_json::Value> {
        self.attributes.get(attribute)
    }

    /// Returns an attribute value, treating `"id"` as the primary key.
    pub fn value_of(&self, attribute: &str) -> serde_json::Value {
        if attribute == "id" {
            return self.id.map_or(serde_json::Value::Null, serde_json::Value::from);
        }
        self.attributes
            .get(attribute)
            .cloned()
            .unwrap_or(serde_json::Value::Null)
    }

    /// Sets one attribute.
    pub fn set(&mut self, attribute: impl Into<String>, value: serde_json::Value) {
        self.attributes.insert(attribute.into(), value);
    }

    /// Merges `attributes` into the resource, overwriting existing keys.
    pub fn assign(&mut self, attributes: Attributes) {
        for (key, value) in attributes {
            self.attributes.insert(key, value);
        }
    }

    /// The class-style name of the type (`line_item` -> `LineItem`,
    /// `blog__post` -> `Blog::Post`).
    pub fn class_name(&self) -> String {
        class_name_for(&self.type_name)
    }
}

/// Returns the class-style name for a resource type name.
pub fn class_name_for(type_name: &str) -> String {
    inflector::classify(&type_name.replace("__", "/"))
}

/// Returns the resource type name for a class-style name
/// (`Blog::Post` -> `blog__post`).
pub fn type_name_for(class_name: &str) -> String {
    inflector::underscore(class_name).replace('/', "__")
}
