//! Presentation helpers used while building pages and links.

use backoffice_core::i18n::Localizer;
use backoffice_core::utils::{inflector, text};
use serde::Serialize;

use crate::authorization::Action;
use crate::order::SortOrder;
use crate::page::CollectionPage;
use crate::registry::{self, ResourceRegistry};

/// The count used when a name is displayed in its plural form.
pub const PLURAL_COUNT: usize = 2;

/// The translation key of a resource name (`blog__posts` -> `blog/post`).
pub fn i18n_key(name: &str) -> String {
    name.split("__")
        .map(inflector::singularize)
        .collect::<Vec<_>>()
        .join("/")
}

/// The display name of a resource type.
///
/// A `models.<i18n_key>` translation wins, then `default`, then a name
/// computed from `name` (pluralized unless `count` is 1).
///
/// ```
/// use std::sync::Arc;
/// use backoffice_admin::helpers::display_resource_name;
/// use backoffice_core::i18n::{Localizer, Translations};
///
/// let mut translations = Translations::with_defaults();
/// translations.insert_plural("en", "models.person", "Member", "Members");
/// let localizer = Localizer::new(Arc::new(translations), "en", chrono_tz::UTC);
///
/// assert_eq!(display_resource_name(&localizer, "people", 2, None), "Members");
/// assert_eq!(display_resource_name(&localizer, "line_items", 1, None), "Line Item");
/// assert_eq!(display_resource_name(&localizer, "blog__post", 2, None), "Blog Posts");
/// assert_eq!(display_resource_name(&localizer, "order", 2, Some("Purchases")), "Purchases");
/// ```
pub fn display_resource_name(
    localizer: &Localizer,
    name: &str,
    count: usize,
    default: Option<&str>,
) -> String {
    let key = format!("models.{}", i18n_key(name));
    if let Some(translated) = localizer
        .translations()
        .translate_count(localizer.locale(), &key, count, &[])
    {
        return translated;
    }
    if let Some(default) = default {
        return default.to_string();
    }
    let singular = inflector::singularize(name);
    let counted = if count == 1 {
        singular
    } else {
        inflector::pluralize(&singular)
    };
    text::squish(&inflector::titleize(&counted))
}

/// Normalizes a raw sort direction.
pub fn sort_order(raw: Option<&str>) -> SortOrder {
    SortOrder::from_raw(raw)
}

/// The index route key of a resource (`series` -> `series_index`).
pub fn resource_index_route_key(name: &str) -> String {
    registry::route_key_for(name)
}

const ORDER_KEYS: [&str; 4] = ["order", "direction", "page", "per_page"];

fn pick(source: &serde_json::Value, keys: &[&str]) -> serde_json::Map<String, serde_json::Value> {
    keys.iter()
        .filter_map(|key| source.get(*key).map(|v| ((*key).to_string(), v.clone())))
        .filter(|(_, v)| !v.is_object() && !v.is_array())
        .collect()
}

/// The query parameters kept by sort links: `search`, `id`, `page`,
/// `per_page`, and the ordering/paging of each included association and of
/// `current_field_name`.
pub fn sanitized_order_params(
    page: &CollectionPage,
    current_field_name: &str,
    params: &serde_json::Value,
) -> serde_json::Value {
    let mut out = pick(params, &["search", "id", "page", "per_page"]);
    let associations = page
        .association_includes
        .iter()
        .map(String::as_str)
        .chain(std::iter::once(current_field_name));
    for association in associations {
        if let Some(nested) = params.get(association).filter(|v| v.is_object()) {
            out.insert(
                association.to_string(),
                serde_json::Value::Object(pick(nested, &ORDER_KEYS)),
            );
        }
    }
    serde_json::Value::Object(out)
}

/// The query parameters of the "clear search" link: drops `search` and
/// `page`, keeps `per_page` and the resource's ordering.
pub fn clear_search_params(params: &serde_json::Value, resource_name: &str) -> serde_json::Value {
    let mut out = pick(params, &["per_page"]);
    if let Some(nested) = params.get(resource_name).filter(|v| v.is_object()) {
        out.insert(
            resource_name.to_string(),
            serde_json::Value::Object(pick(nested, &["order", "direction"])),
        );
    }
    serde_json::Value::Object(out)
}

/// Whether a navigation entry is the current resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NavLinkState {
    /// The entry for the resource being viewed.
    Active,
    /// Any other entry.
    Inactive,
}

/// The state of the navigation entry `resource` (e.g. `blog/posts`) while
/// `current_resource_name` (e.g. `blog__post`) is displayed.
pub fn nav_link_state(current_resource_name: &str, resource: &str) -> NavLinkState {
    let entry = resource.split('/').collect::<Vec<_>>().join("__");
    if entry == inflector::pluralize(current_resource_name) {
        NavLinkState::Active
    } else {
        NavLinkState::Inactive
    }
}

/// Returns `true` iff the registry routes `action` for `resource`.
pub fn valid_action(registry: &ResourceRegistry, action: Action, resource: &str) -> bool {
    registry.valid_action(action, resource)
}
