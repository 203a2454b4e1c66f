//! Resource persistence.
//!
//! The [`ResourceStore`] trait is the seam between the admin and whatever
//! holds the data. Controllers only ever talk to a store through it:
//! evaluate a [`Scope`], find one record, save, destroy.
//!
//! [`InMemoryStore`] implements it (and [`Locator`]) over `RwLock`-guarded
//! tables. It runs each type's [`Model`] validations on save and refuses to
//! destroy records that restricted dependents still point at, which makes
//! it a faithful stand-in for a database in tests and demos.
//!
//! # Example
//!
//! ```
//! use backoffice_admin::model::Model;
//! use backoffice_admin::store::{InMemoryStore, ResourceStore};
//! use serde_json::json;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let store = InMemoryStore::new("shop");
//! store.register_model(Model::new("customer").validates_presence_of("name"));
//!
//! let ada = store.create("customer", json!({"name": "Ada"})).await.unwrap();
//! assert_eq!(ada.id, Some(1));
//! assert!(store.create("customer", json!({})).await.is_err());
//! assert_eq!(store.count("customer"), 1);
//! # });
//! ```

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use backoffice_core::{AdminError, AdminResult, ValidationErrors};

use crate::locator::{GlobalId, Locator};
use crate::model::{Dependent, Model};
use crate::pagination::Paginated;
use crate::resource::{class_name_for, Resource};
use crate::scope::Scope;

/// Persistence operations used by the admin controllers.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Evaluates a collection scope.
    async fn fetch(&self, scope: &Scope) -> AdminResult<Paginated<Resource>>;

    /// Loads one record by primary key; `NotFound` if absent.
    async fn find(&self, resource_type: &str, id: &str) -> AdminResult<Resource>;

    /// Builds a blank, unsaved record.
    fn build(&self, resource_type: &str) -> Resource {
        Resource::new(resource_type)
    }

    /// Inserts or updates a record.
    ///
    /// On validation failure the errors are stored on `resource` and
    /// returned as `ValidationFailed`; nothing is persisted.
    async fn save(&self, resource: &mut Resource) -> AdminResult<()>;

    /// Deletes a record.
    ///
    /// When deletion is refused the reasons are stored on `resource` and
    /// returned as `ValidationFailed`.
    async fn destroy(&self, resource: &mut Resource) -> AdminResult<()>;
}

#[derive(Debug, Clone)]
struct Table {
    rows: Vec<Resource>,
    next_id: u64,
}

impl Table {
    const fn new() -> Self {
        Self {
            rows: Vec::new(),
            next_id: 1,
        }
    }
}

/// An in-memory [`ResourceStore`] and [`Locator`].
///
/// Cloning shares the underlying tables.
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    app: String,
    models: Arc<RwLock<HashMap<String, Model>>>,
    tables: Arc<RwLock<HashMap<String, Table>>>,
}

impl InMemoryStore {
    /// Creates an empty store. `app` is the application name used in
    /// global ids.
    pub fn new(app: impl Into<String>) -> Self {
        Self {
            app: app.into(),
            models: Arc::new(RwLock::new(HashMap::new())),
            tables: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// The application name used in global ids.
    pub fn app(&self) -> &str {
        &self.app
    }

    /// Registers (or replaces) the schema for a resource type. Types without
    /// a schema are stored without validation.
    pub fn register_model(&self, model: Model) {
        self.models
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(model.type_name.clone(), model);
    }

    /// Creates and saves a record from a JSON object of attributes.
    pub async fn create(
        &self,
        resource_type: &str,
        attributes: serde_json::Value,
    ) -> AdminResult<Resource> {
        let serde_json::Value::Object(attributes) = attributes else {
            return Err(AdminError::BadRequest(format!(
                "Attributes for '{resource_type}' must be a JSON object"
            )));
        };
        let mut resource = Resource::new(resource_type).with_attributes(attributes);
        self.save(&mut resource).await?;
        Ok(resource)
    }

    /// The number of stored records of a type.
    pub fn count(&self, resource_type: &str) -> usize {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(resource_type)
            .map_or(0, |t| t.rows.len())
    }

    /// Every stored record of a type, in insertion order.
    pub fn all(&self, resource_type: &str) -> Vec<Resource> {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(resource_type)
            .map_or_else(Vec::new, |t| t.rows.clone())
    }

    fn model(&self, resource_type: &str) -> Option<Model> {
        self.models
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(resource_type)
            .cloned()
    }

    fn blocking_dependents(&self, resource: &Resource, dependents: &[Dependent]) -> Vec<String> {
        let Some(id) = resource.id else {
            return Vec::new();
        };
        let class_name = class_name_for(&resource.type_name);
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        dependents
            .iter()
            .filter(|dep| {
                tables.get(&dep.type_name).is_some_and(|table| {
                    table
                        .rows
                        .iter()
                        .any(|row| references(row.get(&dep.foreign_key), id, &class_name))
                })
            })
            .map(|dep| dep.label.clone())
            .collect()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new("backoffice")
    }
}

/// Returns `true` if `value` points at record `id` of `class_name`: either a
/// plain foreign key or a polymorphic `{type, id}` reference.
fn references(value: Option<&serde_json::Value>, id: u64, class_name: &str) -> bool {
    match value {
        Some(serde_json::Value::Number(n)) => n.as_u64() == Some(id),
        Some(serde_json::Value::String(s)) => s.trim().parse::<u64>().ok() == Some(id),
        Some(serde_json::Value::Object(map)) => {
            map.get("type").and_then(serde_json::Value::as_str) == Some(class_name)
                && references(map.get("id"), id, class_name)
        }
        _ => false,
    }
}

fn parse_id(resource_type: &str, id: &str) -> AdminResult<u64> {
    id.trim()
        .parse::<u64>()
        .map_err(|_| not_found(resource_type, id))
}

fn not_found(resource_type: &str, id: impl std::fmt::Display) -> AdminError {
    AdminError::NotFound(format!("Couldn't find {resource_type} with id={id}"))
}

#[async_trait]
impl ResourceStore for InMemoryStore {
    async fn fetch(&self, scope: &Scope) -> AdminResult<Paginated<Resource>> {
        if !scope.included_associations().is_empty() {
            tracing::debug!(
                resource = scope.resource_type(),
                includes = ?scope.included_associations(),
                "eager-loading associations"
            );
        }
        Ok(scope.apply(self.all(scope.resource_type())))
    }

    async fn find(&self, resource_type: &str, id: &str) -> AdminResult<Resource> {
        let id = parse_id(resource_type, id)?;
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        tables
            .get(resource_type)
            .and_then(|t| t.rows.iter().find(|r| r.id == Some(id)))
            .cloned()
            .ok_or_else(|| not_found(resource_type, id))
    }

    async fn save(&self, resource: &mut Resource) -> AdminResult<()> {
        let errors = self
            .model(&resource.type_name)
            .map_or_else(ValidationErrors::new, |model| model.validate(resource));
        if !errors.is_empty() {
            tracing::debug!(resource = %resource.type_name, %errors, "validation failed");
            resource.errors = errors.clone();
            return Err(AdminError::ValidationFailed(errors));
        }
        resource.errors.clear();

        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let table = tables
            .entry(resource.type_name.clone())
            .or_insert_with(Table::new);
        match resource.id {
            None => {
                resource.id = Some(table.next_id);
                table.next_id += 1;
                table.rows.push(resource.clone());
            }
            Some(id) => {
                let row = table
                    .rows
                    .iter_mut()
                    .find(|r| r.id == Some(id))
                    .ok_or_else(|| not_found(&resource.type_name, id))?;
                *row = resource.clone();
            }
        }
        drop(tables);
        tracing::info!(resource = %resource.type_name, id = ?resource.id, "saved");
        Ok(())
    }

    async fn destroy(&self, resource: &mut Resource) -> AdminResult<()> {
        let id = resource
            .id
            .ok_or_else(|| not_found(&resource.type_name, "nil"))?;
        if let Some(model) = self.model(&resource.type_name) {
            let blocking = self.blocking_dependents(resource, &model.restrict_dependents);
            if !blocking.is_empty() {
                let mut errors = ValidationErrors::new();
                for label in blocking {
                    errors.add_base(format!(
                        "Cannot delete record because dependent {label} exist"
                    ));
                }
                resource.errors = errors.clone();
                return Err(AdminError::ValidationFailed(errors));
            }
        }

        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let table = tables
            .get_mut(&resource.type_name)
            .ok_or_else(|| not_found(&resource.type_name, id))?;
        let before = table.rows.len();
        table.rows.retain(|r| r.id != Some(id));
        let removed = table.rows.len() < before;
        drop(tables);
        if !removed {
            return Err(not_found(&resource.type_name, id));
        }
        tracing::info!(resource = %resource.type_name, id, "destroyed");
        Ok(())
    }
}

#[async_trait]
impl Locator for InMemoryStore {
    async fn locate(&self, gid: &GlobalId) -> AdminResult<Resource> {
        if gid.app != self.app {
            return Err(AdminError::NotFound(format!(
                "Global id {gid} does not belong to app '{}'",
                self.app
            )));
        }
        self.find(&gid.type_name(), &gid.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::Order;
    use crate::pagination::Pagination;
    use serde_json::json;

    fn store() -> InMemoryStore {
        let store = InMemoryStore::new("shop");
        store.register_model(
            Model::new("customer")
                .validates_presence_of("name")
                .restrict_dependent("order", "customer_id"),
        );
        store
    }

    #[tokio::test]
    async fn test_create_assigns_ids() {
        let s = store();
        let a = s.create("customer", json!({"name": "A"})).await.unwrap();
        let b = s.create("customer", json!({"name": "B"})).await.unwrap();
        assert_eq!(a.id, Some(1));
        assert_eq!(b.id, Some(2));
    }

    #[tokio::test]
    async fn test_save_invalid_sets_errors() {
        let s = store();
        let mut r = Resource::new("customer");
        let err = s.save(&mut r).await.unwrap_err();
        assert!(matches!(err, AdminError::ValidationFailed(_)));
        assert_eq!(r.errors.full_messages(), vec!["Name can't be blank"]);
        assert!(r.id.is_none());
        assert_eq!(s.count("customer"), 0);
    }

    #[tokio::test]
    async fn test_update_replaces_row() {
        let s = store();
        let mut r = s.create("customer", json!({"name": "A"})).await.unwrap();
        r.set("name", json!("Z"));
        s.save(&mut r).await.unwrap();
        let found = s.find("customer", "1").await.unwrap();
        assert_eq!(found.get("name"), Some(&json!("Z")));
        assert_eq!(s.count("customer"), 1);
    }

    #[tokio::test]
    async fn test_find_missing_and_malformed() {
        let s = store();
        assert!(matches!(
            s.find("customer", "1").await,
            Err(AdminError::NotFound(_))
        ));
        assert!(matches!(
            s.find("customer", "abc").await,
            Err(AdminError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_destroy_restricted() {
        let s = store();
        let mut c = s.create("customer", json!({"name": "A"})).await.unwrap();
        s.create("order", json!({"customer_id": 1})).await.unwrap();

        let err = s.destroy(&mut c).await.unwrap_err();
        assert!(matches!(err, AdminError::ValidationFailed(_)));
        assert_eq!(
            c.errors.full_messages(),
            vec!["Cannot delete record because dependent orders exist"]
        );
        assert_eq!(s.count("customer"), 1);
    }

    #[tokio::test]
    async fn test_destroy_unrestricted() {
        let s = store();
        let mut c = s.create("customer", json!({"name": "A"})).await.unwrap();
        s.create("order", json!({"customer_id": 99})).await.unwrap();
        s.destroy(&mut c).await.unwrap();
        assert_eq!(s.count("customer"), 0);
        assert!(matches!(
            s.destroy(&mut c).await,
            Err(AdminError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_applies_scope() {
        let s = store();
        for name in ["C", "A", "B"] {
            s.create("customer", json!({ "name": name })).await.unwrap();
        }
        let scope = Scope::new("customer")
            .order(Order::new(Some("name"), Some("desc")))
            .paginate(Pagination::new(1, 2));
        let page = s.fetch(&scope).await.unwrap();
        let names: Vec<_> = page.items.iter().map(|r| r.value_of("name")).collect();
        assert_eq!(names, vec![json!("C"), json!("B")]);
        assert_eq!(page.total_count, 3);
    }

    #[tokio::test]
    async fn test_fetch_unknown_type_is_empty() {
        let page = store().fetch(&Scope::new("ghost")).await.unwrap();
        assert!(page.items.is_empty());
    }

    #[tokio::test]
    async fn test_locate() {
        let s = store();
        s.create("customer", json!({"name": "A"})).await.unwrap();
        let gid: GlobalId = "gid://shop/Customer/1".parse().unwrap();
        assert_eq!(s.locate(&gid).await.unwrap().id, Some(1));

        let missing: GlobalId = "gid://shop/Customer/2".parse().unwrap();
        assert!(matches!(
            s.locate(&missing).await,
            Err(AdminError::NotFound(_))
        ));

        let other_app: GlobalId = "gid://blog/Customer/1".parse().unwrap();
        assert!(matches!(
            s.locate(&other_app).await,
            Err(AdminError::NotFound(_))
        ));
    }

    #[test]
    fn test_references_polymorphic() {
        let value = json!({"type": "Customer", "id": 4});
        assert!(references(Some(&value), 4, "Customer"));
        assert!(!references(Some(&value), 4, "Vendor"));
        assert!(references(Some(&json!("4")), 4, "Customer"));
        assert!(!references(None, 4, "Customer"));
    }
}
