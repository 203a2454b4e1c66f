//! Request parameters.
//!
//! Query strings and form bodies use bracket nesting
//! (`customer[name]=Ada&customer[order_ids][]=1`); [`parse_nested`] turns
//! them into a JSON tree so that form and JSON bodies share one pipeline.
//!
//! Write parameters then go through [`resource_params`]:
//!
//! 1. **Require**: the body must contain an object under the resource's
//!    param key.
//! 2. **Permit**: only attributes the dashboard permits survive, and only in
//!    their permitted shape. Everything else is dropped and logged.
//! 3. **Read**: `{"type": "polymorphic", "value": <gid>}` becomes a
//!    [`ParamValue::Reference`] (a blank or unparseable gid reads as null);
//!    any other object carrying `type` is an
//!    [`AdminError::UnrecognizedParameterShape`]; other objects are read
//!    recursively.
//! 4. **Resolve**: references are located and stored as `{type, id}`.
//! 5. **Coerce**: form strings become numbers, booleans and ids according
//!    to each attribute's field type.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;

use backoffice_core::{AdminError, AdminResult};

use crate::dashboard::Dashboard;
use crate::field::PermittedAttribute;
use crate::locator::{reference_value, GlobalId, Locator};
use crate::resource::Attributes;

/// The `type` marker of a polymorphic reference parameter.
pub const POLYMORPHIC_TYPE: &str = "polymorphic";

/// A read parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// A value used as submitted.
    Direct(serde_json::Value),
    /// A reference to another record, by global id.
    Reference(GlobalId),
    /// A nested map of values.
    Nested(BTreeMap<String, ParamValue>),
}

/// Parses a bracket-nested query string or form body into a JSON object.
///
/// Values are always strings; `key[]` appends to an array; repeated scalar
/// keys keep the last value.
///
/// ```
/// use backoffice_admin::params::parse_nested;
/// use serde_json::json;
///
/// let parsed = parse_nested("customer[name]=Ada+L&customer[tag_ids][]=1&customer[tag_ids][]=2&search=x");
/// assert_eq!(
///     parsed,
///     json!({
///         "customer": {"name": "Ada L", "tag_ids": ["1", "2"]},
///         "search": "x"
///     })
/// );
/// ```
pub fn parse_nested(raw: &str) -> serde_json::Value {
    let mut root = serde_json::Map::new();
    for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
        let segments = key_segments(&key);
        if segments.first().is_some_and(|s| s.is_empty()) {
            tracing::debug!(key = %key, "ignoring parameter without a name");
            continue;
        }
        insert_nested(&mut root, &segments, value.into_owned());
    }
    serde_json::Value::Object(root)
}

fn key_segments(key: &str) -> Vec<&str> {
    let Some(open) = key.find('[') else {
        return vec![key];
    };
    let mut segments = vec![&key[..open]];
    let mut rest = &key[open..];
    while let Some(inner) = rest.strip_prefix('[') {
        let Some(close) = inner.find(']') else {
            break;
        };
        segments.push(&inner[..close]);
        rest = &inner[close + 1..];
    }
    segments
}

fn insert_nested(target: &mut serde_json::Map<String, serde_json::Value>, segments: &[&str], value: String) {
    let Some((head, rest)) = segments.split_first() else {
        return;
    };
    match rest.first() {
        None => {
            target.insert((*head).to_string(), serde_json::Value::String(value));
        }
        Some(&"") => {
            let slot = target
                .entry((*head).to_string())
                .or_insert_with(|| serde_json::Value::Array(Vec::new()));
            if !slot.is_array() {
                *slot = serde_json::Value::Array(Vec::new());
            }
            if let serde_json::Value::Array(items) = slot {
                items.push(serde_json::Value::String(value));
            }
        }
        Some(_) => {
            let slot = target
                .entry((*head).to_string())
                .or_insert_with(|| serde_json::Value::Object(serde_json::Map::new()));
            if !slot.is_object() {
                *slot = serde_json::Value::Object(serde_json::Map::new());
            }
            if let serde_json::Value::Object(child) = slot {
                insert_nested(child, rest, value);
            }
        }
    }
}

/// The body key holding a resource's attributes (`blog__post` ->
/// `blog_post`).
pub fn param_key(resource_type: &str) -> String {
    resource_type.replace("__", "_")
}

fn is_scalar(value: &serde_json::Value) -> bool {
    !matches!(
        value,
        serde_json::Value::Array(_) | serde_json::Value::Object(_)
    )
}

/// Keeps only the permitted attributes, each in its permitted shape.
pub fn permit(raw: &Attributes, permitted: &[PermittedAttribute]) -> Attributes {
    let mut out = Attributes::new();
    for (key, value) in raw {
        let Some(rule) = permitted.iter().find(|p| p.name() == key) else {
            tracing::debug!(attribute = %key, "dropping unpermitted parameter");
            continue;
        };
        let kept = match (rule, value) {
            (PermittedAttribute::Scalar(_), v) if is_scalar(v) => Some(v.clone()),
            (PermittedAttribute::Array(_), serde_json::Value::Array(items))
                if items.iter().all(is_scalar) =>
            {
                Some(value.clone())
            }
            (PermittedAttribute::Nested(_, keys), serde_json::Value::Object(map)) => {
                let filtered: Attributes = map
                    .iter()
                    .filter(|(k, v)| keys.iter().any(|allowed| allowed == *k) && is_scalar(v))
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                Some(serde_json::Value::Object(filtered))
            }
            _ => None,
        };
        match kept {
            Some(v) => {
                out.insert(key.clone(), v);
            }
            None => tracing::debug!(attribute = %key, "dropping parameter with unpermitted shape"),
        }
    }
    out
}

/// Reads one permitted value, recognizing polymorphic references.
///
/// ```
/// use backoffice_admin::params::{read_param_value, ParamValue};
/// use serde_json::json;
///
/// let reference = read_param_value(json!({"type": "polymorphic", "value": "gid://shop/Customer/1"}));
/// assert!(matches!(reference, Ok(ParamValue::Reference(_))));
///
/// let rejected = read_param_value(json!({"type": "Customer", "value": "1"}));
/// assert!(rejected.is_err());
/// ```
pub fn read_param_value(value: serde_json::Value) -> AdminResult<ParamValue> {
    let serde_json::Value::Object(map) = value else {
        return Ok(ParamValue::Direct(value));
    };
    match map.get("type") {
        None | Some(serde_json::Value::Null) => {
            let mut nested = BTreeMap::new();
            for (key, child) in map {
                nested.insert(key, read_param_value(child)?);
            }
            Ok(ParamValue::Nested(nested))
        }
        Some(serde_json::Value::String(t)) if t == POLYMORPHIC_TYPE => {
            match map.get("value") {
                None | Some(serde_json::Value::Null) => Ok(ParamValue::Direct(serde_json::Value::Null)),
                Some(serde_json::Value::String(s)) if s.trim().is_empty() => {
                    Ok(ParamValue::Direct(serde_json::Value::Null))
                }
                Some(serde_json::Value::String(s)) => match s.parse() {
                    Ok(gid) => Ok(ParamValue::Reference(gid)),
                    Err(err) => {
                        tracing::debug!(value = %s, error = %err, "unlocatable global id, storing null");
                        Ok(ParamValue::Direct(serde_json::Value::Null))
                    }
                },
                Some(_) => Err(AdminError::UnrecognizedParameterShape(
                    serde_json::Value::Object(map).to_string(),
                )),
            }
        }
        Some(_) => Err(AdminError::UnrecognizedParameterShape(
            serde_json::Value::Object(map).to_string(),
        )),
    }
}

/// Resolves references through `locator`, producing the stored value.
pub fn resolve(
    value: ParamValue,
    locator: &dyn Locator,
) -> Pin<Box<dyn Future<Output = AdminResult<serde_json::Value>> + Send + '_>> {
    Box::pin(async move {
        match value {
            ParamValue::Direct(v) => Ok(v),
            ParamValue::Reference(gid) => {
                let target = locator.locate(&gid).await?;
                Ok(reference_value(&target))
            }
            ParamValue::Nested(map) => {
                let mut out = serde_json::Map::new();
                for (key, child) in map {
                    out.insert(key, resolve(child, locator).await?);
                }
                Ok(serde_json::Value::Object(out))
            }
        }
    })
}

/// Runs the full write-parameter pipeline for one resource.
pub async fn resource_params(
    body: &serde_json::Value,
    resource_type: &str,
    dashboard: &Dashboard,
    locator: &dyn Locator,
) -> AdminResult<Attributes> {
    let key = param_key(resource_type);
    let raw = body
        .get(&key)
        .and_then(serde_json::Value::as_object)
        .filter(|m| !m.is_empty())
        .ok_or_else(|| {
            AdminError::BadRequest(format!("param is missing or the value is empty: {key}"))
        })?;

    let permitted = permit(raw, &dashboard.permitted_attributes());
    let mut attributes = Attributes::new();
    for (name, value) in permitted {
        let resolved = resolve(read_param_value(value)?, locator).await?;
        let coerced = match dashboard.attribute_type(&name) {
            Some(field_type) => field_type.coerce(resolved),
            None => resolved,
        };
        attributes.insert(name, coerced);
    }
    Ok(attributes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldType;
    use crate::store::InMemoryStore;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn as_map(value: serde_json::Value) -> Attributes {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_key_segments() {
        assert_eq!(key_segments("name"), vec!["name"]);
        assert_eq!(key_segments("a[b][c]"), vec!["a", "b", "c"]);
        assert_eq!(key_segments("a[]"), vec!["a", ""]);
        assert_eq!(key_segments("a[b"), vec!["a"]);
    }

    #[test]
    fn test_parse_nested_polymorphic_and_sorting() {
        let parsed = parse_nested(
            "order[owner][type]=polymorphic&order[owner][value]=gid%3A%2F%2Fshop%2FCustomer%2F1&customer[order]=name&customer[direction]=desc",
        );
        assert_eq!(
            parsed,
            json!({
                "order": {"owner": {"type": "polymorphic", "value": "gid://shop/Customer/1"}},
                "customer": {"order": "name", "direction": "desc"}
            })
        );
    }

    #[test]
    fn test_parse_nested_last_scalar_wins_and_empty() {
        assert_eq!(parse_nested("a=1&a=2"), json!({"a": "2"}));
        assert_eq!(parse_nested(""), json!({}));
        assert_eq!(parse_nested("[x]=1"), json!({}));
    }

    #[test]
    fn test_permit_drops_unknown_and_mismatched() {
        let permitted = vec![
            PermittedAttribute::Scalar("name".into()),
            PermittedAttribute::Array("tag_ids".into()),
            PermittedAttribute::Nested("owner".into(), vec!["type".into(), "value".into()]),
        ];
        let raw = as_map(json!({
            "name": "Ada",
            "admin": true,
            "tag_ids": "1",
            "owner": {"type": "polymorphic", "value": "gid://a/B/1", "extra": "x"}
        }));
        assert_eq!(
            serde_json::Value::Object(permit(&raw, &permitted)),
            json!({
                "name": "Ada",
                "owner": {"type": "polymorphic", "value": "gid://a/B/1"}
            })
        );
    }

    #[test]
    fn test_permit_rejects_object_for_scalar() {
        let permitted = vec![PermittedAttribute::Scalar("name".into())];
        let raw = as_map(json!({"name": {"nested": "x"}}));
        assert!(permit(&raw, &permitted).is_empty());
    }

    #[test]
    fn test_read_param_value_shapes() {
        assert_eq!(
            read_param_value(json!("plain")).unwrap(),
            ParamValue::Direct(json!("plain"))
        );
        assert_eq!(
            read_param_value(json!({"type": "polymorphic", "value": ""})).unwrap(),
            ParamValue::Direct(json!(null))
        );
        let nested = read_param_value(json!({"a": {"b": 1}})).unwrap();
        let ParamValue::Nested(outer) = nested else {
            panic!("expected nested");
        };
        assert!(matches!(outer.get("a"), Some(ParamValue::Nested(_))));

        let err = read_param_value(json!({"type": "other", "value": "x"})).unwrap_err();
        assert!(matches!(err, AdminError::UnrecognizedParameterShape(_)));
        assert!(err.to_string().contains("Unrecognised param data"));
    }

    #[test]
    fn test_read_param_value_unparseable_gid_is_null() {
        let value = read_param_value(json!({"type": "polymorphic", "value": "nope"})).unwrap();
        assert!(matches!(value, ParamValue::Direct(serde_json::Value::Null)));
    }

    fn dashboard() -> Dashboard {
        Dashboard::new("order")
            .attribute("id", FieldType::number())
            .attribute("reference", FieldType::string())
            .attribute("total", FieldType::number())
            .attribute("paid", FieldType::boolean())
            .attribute("owner", FieldType::polymorphic(&["Customer"]))
            .attribute("internal_note", FieldType::text())
            .form_attributes(&["reference", "total", "paid", "owner"])
    }

    #[tokio::test]
    async fn test_resource_params_pipeline() {
        let store = InMemoryStore::new("shop");
        store.create("customer", json!({"name": "Ada"})).await.unwrap();

        let body = json!({
            "order": {
                "reference": "PO-1",
                "total": "12.5",
                "paid": "1",
                "internal_note": "sneaky",
                "id": "99",
                "owner": {"type": "polymorphic", "value": "gid://shop/Customer/1"}
            }
        });
        let attrs = resource_params(&body, "order", &dashboard(), &store)
            .await
            .unwrap();
        assert_eq!(
            serde_json::Value::Object(attrs),
            json!({
                "reference": "PO-1",
                "total": 12.5,
                "paid": true,
                "owner": {"type": "Customer", "id": 1}
            })
        );
    }

    #[tokio::test]
    async fn test_resource_params_missing_reference() {
        let store = InMemoryStore::new("shop");
        let body = json!({
            "order": {"owner": {"type": "polymorphic", "value": "gid://shop/Customer/5"}}
        });
        let err = resource_params(&body, "order", &dashboard(), &store)
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_resource_params_requires_key() {
        let store = InMemoryStore::new("shop");
        let err = resource_params(&json!({"customer": {"a": 1}}), "order", &dashboard(), &store)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("param is missing"));
    }

    #[test]
    fn test_param_key() {
        assert_eq!(param_key("blog__post"), "blog_post");
        assert_eq!(param_key("customer"), "customer");
    }
}
