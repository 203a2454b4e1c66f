//! The authorization hook.
//!
//! Every access point of the controller calls [`Authorizer::authorize`]
//! before touching a resource: the index authorizes the resource type, and
//! every other action authorizes the loaded or built resource. The default
//! implementation allows everything.

use std::fmt;
use std::str::FromStr;

use backoffice_core::{AdminError, AdminResult};
use serde::{Deserialize, Serialize};

use crate::resource::Resource;

/// A controller action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// List a collection.
    Index,
    /// Show one resource.
    Show,
    /// Render the blank form.
    New,
    /// Render the edit form.
    Edit,
    /// Persist a new resource.
    Create,
    /// Persist changes to a resource.
    Update,
    /// Delete a resource.
    Destroy,
}

impl Action {
    /// Every action, in route order.
    pub const ALL: [Self; 7] = [
        Self::Index,
        Self::Show,
        Self::New,
        Self::Edit,
        Self::Create,
        Self::Update,
        Self::Destroy,
    ];

    /// The action name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::Show => "show",
            Self::New => "new",
            Self::Edit => "edit",
            Self::Create => "create",
            Self::Update => "update",
            Self::Destroy => "destroy",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = AdminError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| AdminError::BadRequest(format!("Unknown action '{s}'")))
    }
}

/// What is being authorized.
#[derive(Debug, Clone, Copy)]
pub enum AuthTarget<'a> {
    /// A whole resource type (the index scope).
    Type(&'a str),
    /// One resource.
    Resource(&'a Resource),
}

impl AuthTarget<'_> {
    /// The resource type of the target.
    pub fn resource_type(&self) -> &str {
        match self {
            Self::Type(t) => t,
            Self::Resource(r) => &r.type_name,
        }
    }
}

/// Decides whether an action may run.
///
/// # Examples
///
/// ```
/// use backoffice_admin::authorization::{Action, AuthTarget, Authorizer};
/// use backoffice_core::{AdminError, AdminResult};
///
/// struct ReadOnly;
///
/// impl Authorizer for ReadOnly {
///     fn authorize(&self, action: Action, target: AuthTarget<'_>) -> AdminResult<()> {
///         match action {
///             Action::Index | Action::Show => Ok(()),
///             _ => Err(AdminError::AuthorizationDenied(format!(
///                 "{action} on {}",
///                 target.resource_type()
///             ))),
///         }
///     }
///
///     fn show_action(&self, action: Action, _resource: Option<&backoffice_admin::resource::Resource>) -> bool {
///         self.authorize(action, AuthTarget::Type("")).is_ok()
///     }
/// }
///
/// assert!(ReadOnly.authorize(Action::Show, AuthTarget::Type("customer")).is_ok());
/// assert!(!ReadOnly.show_action(Action::Destroy, None));
/// ```
pub trait Authorizer: Send + Sync {
    /// Returns an error (normally [`AdminError::AuthorizationDenied`]) to
    /// reject the access.
    fn authorize(&self, action: Action, target: AuthTarget<'_>) -> AdminResult<()> {
        let _ = (action, target);
        Ok(())
    }

    /// Whether a page should expose a link to `action`.
    fn show_action(&self, action: Action, resource: Option<&Resource>) -> bool {
        let _ = (action, resource);
        true
    }
}

/// Allows every action.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughAuthorizer;

impl Authorizer for PassthroughAuthorizer {}
