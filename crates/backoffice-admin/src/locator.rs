//! Global identifiers and cross-resource lookup.
//!
//! A [`GlobalId`] names one record of any registered type as
//! `gid://<app>/<Class>/<id>`. Polymorphic form fields submit these tokens;
//! the parameter pipeline hands them to a [`Locator`] to find the record.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use backoffice_core::{AdminError, AdminResult};
use serde::{Deserialize, Serialize};

use crate::resource::{class_name_for, type_name_for, Resource};

const SCHEME: &str = "gid://";

/// A `gid://app/Class/id` token.
///
/// # Examples
///
/// ```
/// use backoffice_admin::locator::GlobalId;
///
/// let gid: GlobalId = "gid://shop/Customer/7".parse().unwrap();
/// assert_eq!(gid.app, "shop");
/// assert_eq!(gid.class_name, "Customer");
/// assert_eq!(gid.id, "7");
/// assert_eq!(gid.type_name(), "customer");
/// assert_eq!(gid.to_string(), "gid://shop/Customer/7");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GlobalId {
    /// The application name.
    pub app: String,
    /// The class-style model name (e.g. "Customer", "Blog::Post").
    pub class_name: String,
    /// The record id.
    pub id: String,
}

impl GlobalId {
    /// Builds the global id of a persisted resource.
    pub fn for_resource(app: &str, resource: &Resource) -> AdminResult<Self> {
        let id = resource.id.ok_or_else(|| {
            AdminError::BadRequest(format!(
                "Cannot build a global id for an unsaved {}",
                resource.type_name
            ))
        })?;
        Ok(Self {
            app: app.to_string(),
            class_name: resource.class_name(),
            id: id.to_string(),
        })
    }

    /// The resource type name the id refers to.
    pub fn type_name(&self) -> String {
        type_name_for(&self.class_name)
    }
}

impl FromStr for GlobalId {
    type Err = AdminError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AdminError::BadRequest(format!("Invalid global id: {s}"));
        let rest = s.trim().strip_prefix(SCHEME).ok_or_else(invalid)?;
        let mut parts = rest.splitn(3, '/');
        let (Some(app), Some(class_name), Some(id)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };
        if app.is_empty() || class_name.is_empty() || id.is_empty() || id.contains('/') {
            return Err(invalid());
        }
        Ok(Self {
            app: app.to_string(),
            class_name: class_name.to_string(),
            id: id.to_string(),
        })
    }
}

impl fmt::Display for GlobalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SCHEME}{}/{}/{}", self.app, self.class_name, self.id)
    }
}

/// Finds the record a global id refers to.
#[async_trait]
pub trait Locator: Send + Sync {
    /// Loads the referenced resource, failing with `NotFound` if it does not
    /// exist.
    async fn locate(&self, gid: &GlobalId) -> AdminResult<Resource>;
}

/// The attribute value stored for a resolved polymorphic reference.
pub fn reference_value(resource: &Resource) -> serde_json::Value {
    serde_json::json!({
        "type": class_name_for(&resource.type_name),
        "id": resource.id,
    })
}
