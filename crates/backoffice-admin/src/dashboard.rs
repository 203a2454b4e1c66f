//! Dashboards: per-resource display and permission configuration.
//!
//! A [`Dashboard`] declares the attributes of one resource type in display
//! order, each with a [`FieldType`], and which of them appear on the
//! collection, show and form pages. The form attributes define what a write
//! may touch; the collection attributes define which associations are
//! eager-loaded on the index.
//!
//! Dashboards are built once at startup and shared behind an `Arc`.
//!
//! # Examples
//!
//! ```
//! use backoffice_admin::dashboard::Dashboard;
//! use backoffice_admin::field::FieldType;
//!
//! let dashboard = Dashboard::new("customer")
//!     .attribute("id", FieldType::number())
//!     .attribute("name", FieldType::string())
//!     .attribute("email", FieldType::email())
//!     .attribute("orders", FieldType::has_many("order"))
//!     .collection_attributes(&["id", "name", "orders"])
//!     .form_attributes(&["name", "email"]);
//!
//! assert!(dashboard.validate().is_ok());
//! assert_eq!(dashboard.collection_includes(), vec!["orders"]);
//! assert!(dashboard.has_searchable_attributes());
//! ```

use backoffice_core::{AdminError, AdminResult};

use crate::field::{FieldType, PermittedAttribute};
use crate::resource::Resource;

/// The display configuration of one resource type.
#[derive(Debug, Clone)]
pub struct Dashboard {
    resource_type: String,
    attribute_types: Vec<(String, FieldType)>,
    collection_attributes: Option<Vec<String>>,
    show_page_attributes: Option<Vec<String>>,
    form_attributes: Option<Vec<String>>,
    title_attribute: Option<String>,
}

impl Dashboard {
    /// Creates an empty dashboard for `resource_type`.
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            attribute_types: Vec::new(),
            collection_attributes: None,
            show_page_attributes: None,
            form_attributes: None,
            title_attribute: None,
        }
    }

    /// Declares an attribute. Redeclaring replaces the type in place.
    #[must_use]
    pub fn attribute(mut self, name: &str, field_type: FieldType) -> Self {
        if let Some(slot) = self.attribute_types.iter_mut().find(|(n, _)| n == name) {
            slot.1 = field_type;
        } else {
            self.attribute_types.push((name.to_string(), field_type));
        }
        self
    }

    /// Sets the index table columns (default: every attribute).
    #[must_use]
    pub fn collection_attributes(mut self, names: &[&str]) -> Self {
        self.collection_attributes = Some(to_owned(names));
        self
    }

    /// Sets the show page attributes (default: every attribute).
    #[must_use]
    pub fn show_page_attributes(mut self, names: &[&str]) -> Self {
        self.show_page_attributes = Some(to_owned(names));
        self
    }

    /// Sets the form attributes (default: every attribute except `id`).
    #[must_use]
    pub fn form_attributes(mut self, names: &[&str]) -> Self {
        self.form_attributes = Some(to_owned(names));
        self
    }

    /// Uses an attribute's value as the resource title.
    #[must_use]
    pub fn title_attribute(mut self, name: &str) -> Self {
        self.title_attribute = Some(name.to_string());
        self
    }

    /// The resource type this dashboard describes.
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// Every declared attribute with its type, in declaration order.
    pub fn attribute_types(&self) -> &[(String, FieldType)] {
        &self.attribute_types
    }

    /// The type of one attribute.
    pub fn attribute_type(&self, name: &str) -> Option<&FieldType> {
        self.attribute_types
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, t)| t)
    }

    /// Every declared attribute name.
    pub fn all_attributes(&self) -> Vec<&str> {
        self.attribute_types.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// The index table columns.
    pub fn collection_attribute_names(&self) -> Vec<&str> {
        self.configured_or_all(self.collection_attributes.as_ref())
    }

    /// The show page attributes.
    pub fn show_page_attribute_names(&self) -> Vec<&str> {
        self.configured_or_all(self.show_page_attributes.as_ref())
    }

    /// The form attributes.
    pub fn form_attribute_names(&self) -> Vec<&str> {
        self.form_attributes.as_ref().map_or_else(
            || {
                self.all_attributes()
                    .into_iter()
                    .filter(|n| *n != "id")
                    .collect()
            },
            |names| names.iter().map(String::as_str).collect(),
        )
    }

    /// The attributes a write may set, with their permitted shapes.
    pub fn permitted_attributes(&self) -> Vec<PermittedAttribute> {
        self.form_attribute_names()
            .into_iter()
            .filter_map(|name| {
                self.attribute_type(name)
                    .map(|t| t.permitted_attribute(name))
            })
            .collect()
    }

    /// The collection associations to eager-load on the index.
    pub fn collection_includes(&self) -> Vec<&str> {
        self.collection_attribute_names()
            .into_iter()
            .filter(|name| self.attribute_type(name).is_some_and(FieldType::eager_load))
            .collect()
    }

    /// Searchable attributes with their types.
    pub fn searchable_attributes(&self) -> Vec<(&str, &FieldType)> {
        self.attribute_types
            .iter()
            .filter(|(_, t)| t.is_searchable())
            .map(|(n, t)| (n.as_str(), t))
            .collect()
    }

    /// Returns `true` if any attribute is searchable.
    pub fn has_searchable_attributes(&self) -> bool {
        self.attribute_types.iter().any(|(_, t)| t.is_searchable())
    }

    /// The display title of a resource: its title attribute if set and
    /// present, else `"<Class> #<id>"`.
    pub fn display_resource(&self, resource: &Resource) -> String {
        let titled = self
            .title_attribute
            .as_deref()
            .and_then(|attr| resource.get(attr))
            .and_then(serde_json::Value::as_str)
            .filter(|s| !s.trim().is_empty());
        if let Some(title) = titled {
            return title.to_string();
        }
        match resource.id {
            Some(id) => format!("{} #{id}", resource.class_name()),
            None => resource.class_name(),
        }
    }

    /// Checks that every page list and the title attribute name declared
    /// attributes.
    pub fn validate(&self) -> AdminResult<()> {
        let lists = [
            ("collection", self.collection_attributes.as_ref()),
            ("show page", self.show_page_attributes.as_ref()),
            ("form", self.form_attributes.as_ref()),
        ];
        for (label, names) in lists {
            for name in names.into_iter().flatten() {
                if self.attribute_type(name).is_none() {
                    return Err(AdminError::ConfigurationError(format!(
                        "Dashboard for '{}' lists undeclared {label} attribute '{name}'",
                        self.resource_type
                    )));
                }
            }
        }
        if let Some(title) = &self.title_attribute {
            if self.attribute_type(title).is_none() {
                return Err(AdminError::ConfigurationError(format!(
                    "Dashboard for '{}' uses undeclared title attribute '{title}'",
                    self.resource_type
                )));
            }
        }
        Ok(())
    }

    fn configured_or_all<'a>(&'a self, configured: Option<&'a Vec<String>>) -> Vec<&'a str> {
        configured.map_or_else(
            || self.all_attributes(),
            |names| names.iter().map(String::as_str).collect(),
        )
    }
}

fn to_owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| (*n).to_string()).collect()
}
