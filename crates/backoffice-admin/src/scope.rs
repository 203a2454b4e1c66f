//! Composable collection queries.
//!
//! A [`Scope`] describes what the index wants from a store: which resource
//! type, an optional search, which associations to eager-load, the order and
//! the page. Stores may translate it into their own query language;
//! [`Scope::apply`] evaluates it over an in-memory collection.

use crate::order::Order;
use crate::pagination::{Paginated, Pagination};
use crate::resource::Resource;
use crate::search::Search;

/// A lazily evaluated collection query.
///
/// # Examples
///
/// ```
/// use backoffice_admin::order::Order;
/// use backoffice_admin::pagination::Pagination;
/// use backoffice_admin::resource::Resource;
/// use backoffice_admin::scope::Scope;
///
/// let scope = Scope::new("customer")
///     .order(Order::new(Some("id"), Some("desc")))
///     .paginate(Pagination::new(1, 2));
///
/// let all = (1..=3).map(|id| Resource::new("customer").with_id(id)).collect();
/// let page = scope.apply(all);
/// let ids: Vec<_> = page.items.iter().filter_map(|r| r.id).collect();
/// assert_eq!(ids, vec![3, 2]);
/// assert_eq!(page.total_count, 3);
/// ```
#[derive(Debug, Clone)]
pub struct Scope {
    resource_type: String,
    search: Option<Search>,
    includes: Vec<String>,
    order: Order,
    pagination: Option<Pagination>,
}

impl Scope {
    /// Every record of `resource_type`, in natural order, unpaginated.
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            search: None,
            includes: Vec::new(),
            order: Order::default(),
            pagination: None,
        }
    }

    /// Filters by a search.
    #[must_use]
    pub fn search(mut self, search: Search) -> Self {
        self.search = Some(search);
        self
    }

    /// Eager-loads associations.
    #[must_use]
    pub fn includes<I, S>(mut self, associations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.includes.extend(associations.into_iter().map(Into::into));
        self
    }

    /// Sorts the collection.
    #[must_use]
    pub fn order(mut self, order: Order) -> Self {
        self.order = order;
        self
    }

    /// Restricts the result to one page.
    #[must_use]
    pub const fn paginate(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }

    /// The resource type queried.
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// The search, if any.
    pub const fn search_filter(&self) -> Option<&Search> {
        self.search.as_ref()
    }

    /// The associations to eager-load.
    pub fn included_associations(&self) -> &[String] {
        &self.includes
    }

    /// The sort state.
    pub const fn ordering(&self) -> &Order {
        &self.order
    }

    /// The requested page, if any.
    pub const fn pagination(&self) -> Option<Pagination> {
        self.pagination
    }

    /// Evaluates the scope over the full collection: search, then order,
    /// then paginate.
    pub fn apply(&self, all: Vec<Resource>) -> Paginated<Resource> {
        let mut matched = match &self.search {
            Some(search) => search.run(all),
            None => all,
        };
        self.order.apply(&mut matched);
        match self.pagination {
            Some(pagination) => Paginated::paginate(matched, pagination),
            None => Paginated::single_page(matched),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::Dashboard;
    use crate::field::FieldType;
    use serde_json::json;

    fn people() -> Vec<Resource> {
        ["Cleo", "ada", "Bea", "Adam"]
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let mut r = Resource::new("customer").with_id(i as u64 + 1);
                r.set("name", json!(name));
                r
            })
            .collect()
    }

    #[test]
    fn test_search_order_paginate() {
        let dashboard = Dashboard::new("customer").attribute("name", FieldType::string());
        let scope = Scope::new("customer")
            .search(Search::new(&dashboard, "ad"))
            .order(Order::new(Some("name"), Some("asc")))
            .paginate(Pagination::new(1, 1));
        let page = scope.apply(people());
        assert_eq!(page.total_count, 2);
        assert_eq!(page.items[0].get("name"), Some(&json!("ada")));
        assert!(page.has_next);
    }

    #[test]
    fn test_includes_recorded() {
        let scope = Scope::new("order").includes(["customer", "line_items"]);
        assert_eq!(scope.included_associations(), ["customer", "line_items"]);
        assert_eq!(scope.resource_type(), "order");
        assert!(scope.pagination().is_none());
    }
}
