//! Collection search.
//!
//! A [`Search`] matches a term against every searchable attribute of a
//! dashboard. Matching is a case-insensitive substring test over each
//! attribute's raw value and, for associations, its formatted reference.

use crate::dashboard::Dashboard;
use crate::field::FieldType;
use crate::resource::Resource;

/// A search term bound to the searchable attributes of a dashboard.
///
/// # Examples
///
/// ```
/// use backoffice_admin::dashboard::Dashboard;
/// use backoffice_admin::field::FieldType;
/// use backoffice_admin::resource::Resource;
/// use backoffice_admin::search::Search;
/// use serde_json::json;
///
/// let dashboard = Dashboard::new("customer").attribute("name", FieldType::string());
/// let search = Search::new(&dashboard, "  ADA ");
///
/// let mut ada = Resource::new("customer");
/// ada.set("name", json!("Ada Lovelace"));
/// assert!(search.matches(&ada));
/// ```
#[derive(Debug, Clone)]
pub struct Search {
    term: String,
    attributes: Vec<(String, FieldType)>,
}

impl Search {
    /// Creates a search; the term is trimmed.
    pub fn new(dashboard: &Dashboard, term: &str) -> Self {
        Self {
            term: term.trim().to_string(),
            attributes: dashboard
                .searchable_attributes()
                .into_iter()
                .map(|(name, ty)| (name.to_string(), ty.clone()))
                .collect(),
        }
    }

    /// The trimmed term.
    pub fn term(&self) -> &str {
        &self.term
    }

    /// Returns `true` for a blank term.
    pub fn is_blank(&self) -> bool {
        self.term.is_empty()
    }

    /// Returns `true` if `resource` matches. Every resource matches a blank
    /// term.
    pub fn matches(&self, resource: &Resource) -> bool {
        if self.is_blank() {
            return true;
        }
        let needle = self.term.to_lowercase();
        self.attributes.iter().any(|(name, ty)| {
            ty.search_candidates(&resource.value_of(name))
                .iter()
                .any(|candidate| candidate.to_lowercase().contains(&needle))
        })
    }

    /// Keeps the matching resources.
    pub fn run(&self, resources: Vec<Resource>) -> Vec<Resource> {
        if self.is_blank() {
            return resources;
        }
        resources.into_iter().filter(|r| self.matches(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dashboard() -> Dashboard {
        Dashboard::new("order")
            .attribute("reference", FieldType::string())
            .attribute("notes", FieldType::text().searchable(false))
            .attribute("customer_id", FieldType::belongs_to("customer").searchable(true))
            .attribute("total", FieldType::number())
    }

    fn order(reference: &str, notes: &str, customer: u64, total: u64) -> Resource {
        let mut r = Resource::new("order");
        r.set("reference", json!(reference));
        r.set("notes", json!(notes));
        r.set("customer_id", json!(customer));
        r.set("total", json!(total));
        r
    }

    #[test]
    fn test_blank_term_keeps_everything() {
        let search = Search::new(&dashboard(), "   ");
        assert!(search.is_blank());
        let all = vec![order("A", "", 1, 1), order("B", "", 2, 2)];
        assert_eq!(search.run(all).len(), 2);
    }

    #[test]
    fn test_case_insensitive_substring() {
        let search = Search::new(&dashboard(), "po-");
        assert!(search.matches(&order("PO-17", "", 1, 1)));
        assert!(!search.matches(&order("INV-2", "", 1, 1)));
    }

    #[test]
    fn test_unsearchable_attributes_ignored() {
        let search = Search::new(&dashboard(), "fragile");
        assert!(!search.matches(&order("A", "fragile", 1, 1)));
        let search = Search::new(&dashboard(), "250");
        assert!(!search.matches(&order("A", "", 1, 250)));
    }

    #[test]
    fn test_formatted_association_matches() {
        let search = Search::new(&dashboard(), "customer #3");
        assert!(search.matches(&order("A", "", 3, 1)));
        assert!(!search.matches(&order("A", "", 4, 1)));
    }
}
