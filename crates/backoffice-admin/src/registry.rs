//! Resource registration and resolution.
//!
//! The [`ResourceRegistry`] maps the route key in a request path
//! (`customers`, `series_index`, `blog_posts`) to the [`ResourceEntry`]
//! describing that resource: its type name, dashboard, display title and the
//! actions it exposes.

use std::collections::HashMap;
use std::sync::Arc;

use backoffice_core::utils::inflector;
use backoffice_core::{AdminError, AdminResult};

use crate::authorization::Action;
use crate::dashboard::Dashboard;

/// One registered resource.
#[derive(Debug, Clone)]
pub struct ResourceEntry {
    /// The resource type name (`customer`, `blog__post`).
    pub name: String,
    /// The index route key (`customers`, `blog_posts`).
    pub route_key: String,
    /// The dashboard, shared read-only.
    pub dashboard: Arc<Dashboard>,
    /// An explicit display title, overriding the computed one.
    pub title: Option<String>,
    /// The actions routed for this resource.
    pub actions: Vec<Action>,
}

impl ResourceEntry {
    /// Creates an entry exposing every action.
    pub fn new(dashboard: Dashboard) -> Self {
        let name = dashboard.resource_type().to_string();
        Self {
            route_key: route_key_for(&name),
            name,
            dashboard: Arc::new(dashboard),
            title: None,
            actions: Action::ALL.to_vec(),
        }
    }

    /// Sets the display title.
    #[must_use]
    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    /// Restricts the routed actions.
    #[must_use]
    pub fn actions(mut self, actions: &[Action]) -> Self {
        self.actions = actions.to_vec();
        self
    }

    /// Returns `true` if `action` is routed for this resource.
    pub fn exposes(&self, action: Action) -> bool {
        self.actions.contains(&action)
    }
}

/// The index route key for a resource type name (`blog__post` ->
/// `blog_posts`, `series` -> `series_index`).
pub fn route_key_for(name: &str) -> String {
    inflector::route_key(&name.replace("__", "/"))
}

/// All registered resources, keyed by route key.
///
/// # Examples
///
/// ```
/// use backoffice_admin::authorization::Action;
/// use backoffice_admin::dashboard::Dashboard;
/// use backoffice_admin::field::FieldType;
/// use backoffice_admin::registry::{ResourceEntry, ResourceRegistry};
///
/// let mut registry = ResourceRegistry::new();
/// registry
///     .register(
///         ResourceEntry::new(Dashboard::new("series").attribute("name", FieldType::string()))
///             .actions(&[Action::Index, Action::Show]),
///     )
///     .unwrap();
///
/// let entry = registry.resolve("series_index").unwrap();
/// assert_eq!(entry.name, "series");
/// assert!(registry.valid_action(Action::Show, "series"));
/// assert!(!registry.valid_action(Action::Destroy, "series"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ResourceRegistry {
    entries: HashMap<String, Arc<ResourceEntry>>,
    order: Vec<String>,
}

impl ResourceRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a resource after validating its dashboard. Registering the
    /// same route key again replaces the entry.
    pub fn register(&mut self, entry: ResourceEntry) -> AdminResult<()> {
        entry.dashboard.validate()?;
        let key = entry.route_key.clone();
        if !self.entries.contains_key(&key) {
            self.order.push(key.clone());
        }
        tracing::debug!(resource = %entry.name, route_key = %key, "registered resource");
        self.entries.insert(key, Arc::new(entry));
        Ok(())
    }

    /// Resolves a route key.
    pub fn resolve(&self, route_key: &str) -> AdminResult<Arc<ResourceEntry>> {
        self.entries
            .get(route_key)
            .cloned()
            .ok_or_else(|| AdminError::NotFound(format!("No resource registered at '{route_key}'")))
    }

    /// Looks up an entry by resource type name.
    pub fn by_name(&self, name: &str) -> Option<Arc<ResourceEntry>> {
        self.entries.get(&route_key_for(name)).cloned()
    }

    /// Returns `true` iff `resource` is registered and exposes `action`.
    pub fn valid_action(&self, action: Action, resource: &str) -> bool {
        self.by_name(resource).is_some_and(|e| e.exposes(action))
    }

    /// Entries in registration order.
    pub fn entries(&self) -> Vec<Arc<ResourceEntry>> {
        self.order
            .iter()
            .filter_map(|key| self.entries.get(key).cloned())
            .collect()
    }

    /// Number of registered resources.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
