//! Collection ordering.
//!
//! Raw sort directions from the query string are normalized into a
//! [`SortOrder`]; an [`Order`] pairs that with an optional attribute and
//! knows how to sort resources and build the parameters for a column
//! header's toggle link.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::resource::Resource;

/// A normalized sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Smallest first.
    Ascending,
    /// Largest first.
    Descending,
    /// No explicit direction.
    #[default]
    None,
}

impl SortOrder {
    /// Normalizes a raw direction: `"asc"` and `"desc"` are recognized,
    /// anything else (including nothing) is [`SortOrder::None`].
    ///
    /// ```
    /// use backoffice_admin::order::SortOrder;
    ///
    /// assert_eq!(SortOrder::from_raw(Some("asc")), SortOrder::Ascending);
    /// assert_eq!(SortOrder::from_raw(Some("desc")), SortOrder::Descending);
    /// assert_eq!(SortOrder::from_raw(Some("DESC")), SortOrder::None);
    /// assert_eq!(SortOrder::from_raw(None), SortOrder::None);
    /// ```
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw {
            Some("asc") => Self::Ascending,
            Some("desc") => Self::Descending,
            _ => Self::None,
        }
    }

    /// `"ascending"`, `"descending"` or `"none"`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "ascending",
            Self::Descending => "descending",
            Self::None => "none",
        }
    }

    /// The query-string form (`"asc"`/`"desc"`), if any.
    pub const fn as_param(self) -> Option<&'static str> {
        match self {
            Self::Ascending => Some("asc"),
            Self::Descending => Some("desc"),
            Self::None => None,
        }
    }
}

/// The query parameters of a sort link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderParams {
    /// The attribute to sort by.
    pub order: String,
    /// `"asc"` or `"desc"`.
    pub direction: String,
}

/// The current sort state of a collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// The attribute sorted by; `None` keeps the natural order.
    pub attribute: Option<String>,
    /// The normalized direction.
    pub direction: SortOrder,
}

impl Order {
    /// Builds an order from raw query parameters. A blank attribute means
    /// natural order.
    pub fn new(attribute: Option<&str>, direction: Option<&str>) -> Self {
        Self {
            attribute: attribute
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(str::to_string),
            direction: SortOrder::from_raw(direction),
        }
    }

    /// Returns `true` if the collection is sorted by `attribute`.
    pub fn ordered_by(&self, attribute: &str) -> bool {
        self.attribute.as_deref() == Some(attribute)
    }

    /// The sort state shown on `attribute`'s column header.
    pub fn sort_order_for(&self, attribute: &str) -> SortOrder {
        if self.ordered_by(attribute) {
            self.effective_direction()
        } else {
            SortOrder::None
        }
    }

    /// The parameters for `attribute`'s header link: descending if the
    /// collection is currently ascending on it, ascending otherwise.
    pub fn order_params_for(&self, attribute: &str) -> OrderParams {
        let direction = if self.ordered_by(attribute)
            && self.effective_direction() == SortOrder::Ascending
        {
            "desc"
        } else {
            "asc"
        };
        OrderParams {
            order: attribute.to_string(),
            direction: direction.to_string(),
        }
    }

    /// Sorts resources in place. Without an attribute the order is left
    /// untouched; without a direction it is ascending.
    pub fn apply(&self, resources: &mut [Resource]) {
        let Some(attribute) = self.attribute.as_deref() else {
            return;
        };
        let descending = self.direction == SortOrder::Descending;
        resources.sort_by(|a, b| {
            let cmp = compare_json_values(&a.value_of(attribute), &b.value_of(attribute));
            if descending {
                cmp.reverse()
            } else {
                cmp
            }
        });
    }

    fn effective_direction(&self) -> SortOrder {
        match self.direction {
            SortOrder::None => SortOrder::Ascending,
            other => other,
        }
    }
}

/// Compares two attribute values. Nulls sort first; strings compare
/// case-insensitively.
pub fn compare_json_values(a: &serde_json::Value, b: &serde_json::Value) -> Ordering {
    match (a, b) {
        (serde_json::Value::Null, serde_json::Value::Null) => Ordering::Equal,
        (serde_json::Value::Null, _) => Ordering::Less,
        (_, serde_json::Value::Null) => Ordering::Greater,
        (serde_json::Value::String(a), serde_json::Value::String(b)) => a
            .to_lowercase()
            .cmp(&b.to_lowercase())
            .then_with(|| a.cmp(b)),
        (serde_json::Value::Bool(a), serde_json::Value::Bool(b)) => a.cmp(b),
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => a.to_string().cmp(&b.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn named(id: u64, name: serde_json::Value) -> Resource {
        let mut r = Resource::new("customer").with_id(id);
        r.set("name", name);
        r
    }

    fn ids(resources: &[Resource]) -> Vec<u64> {
        resources.iter().filter_map(|r| r.id).collect()
    }

    #[test]
    fn test_sort_order_is_total() {
        for raw in ["", "ascending", "ASC", "for anything else", "desc "] {
            assert_eq!(SortOrder::from_raw(Some(raw)), SortOrder::None);
        }
        assert_eq!(SortOrder::Ascending.as_str(), "ascending");
        assert_eq!(SortOrder::None.as_param(), None);
    }

    #[test]
    fn test_apply_without_attribute_keeps_order() {
        let mut rs = vec![named(2, json!("b")), named(1, json!("a"))];
        Order::new(None, Some("desc")).apply(&mut rs);
        assert_eq!(ids(&rs), vec![2, 1]);
        Order::new(Some("  "), Some("asc")).apply(&mut rs);
        assert_eq!(ids(&rs), vec![2, 1]);
    }

    #[test]
    fn test_apply_directions() {
        let mut rs = vec![
            named(1, json!("bob")),
            named(2, json!("Alice")),
            named(3, json!(null)),
        ];
        Order::new(Some("name"), None).apply(&mut rs);
        assert_eq!(ids(&rs), vec![3, 2, 1]);
        Order::new(Some("name"), Some("desc")).apply(&mut rs);
        assert_eq!(ids(&rs), vec![1, 2, 3]);
        Order::new(Some("id"), Some("asc")).apply(&mut rs);
        assert_eq!(ids(&rs), vec![1, 2, 3]);
    }

    #[test]
    fn test_order_params_toggle() {
        let order = Order::new(Some("name"), Some("asc"));
        assert_eq!(order.order_params_for("name").direction, "desc");
        assert_eq!(order.order_params_for("email").direction, "asc");

        let order = Order::new(Some("name"), Some("desc"));
        assert_eq!(order.order_params_for("name").direction, "asc");

        let order = Order::new(Some("name"), None);
        assert_eq!(order.order_params_for("name").direction, "desc");
        assert_eq!(order.sort_order_for("name"), SortOrder::Ascending);
        assert_eq!(order.sort_order_for("email"), SortOrder::None);
    }

    #[test]
    fn test_compare_numbers_and_mixed() {
        assert_eq!(compare_json_values(&json!(2), &json!(10)), Ordering::Less);
        assert_eq!(compare_json_values(&json!(1.5), &json!(1)), Ordering::Greater);
        assert_eq!(compare_json_values(&json!(true), &json!(false)), Ordering::Greater);
    }
}
