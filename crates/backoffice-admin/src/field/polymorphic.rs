//! Polymorphic association fields.
//!
//! A polymorphic value is stored as `{"type": "<Class>", "id": <id>}`. Forms
//! submit it back as `{"type": "polymorphic", "value": "<global id>"}`,
//! which the parameter pipeline resolves through a
//! [`Locator`](crate::locator::Locator).

use crate::locator::GlobalId;

/// A polymorphic value bound to the classes it may refer to.
///
/// ```
/// use backoffice_admin::field::PolymorphicField;
/// use serde_json::json;
///
/// let data = json!({"type": "Customer", "id": 3});
/// let classes = vec!["Customer".to_string(), "Vendor".to_string()];
/// let field = PolymorphicField::new(&data, &classes);
///
/// assert_eq!(field.display().as_deref(), Some("Customer #3"));
/// assert_eq!(
///     field.selected_global_id("shop").as_deref(),
///     Some("gid://shop/Customer/3")
/// );
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PolymorphicField<'a> {
    data: &'a serde_json::Value,
    classes: &'a [String],
}

impl<'a> PolymorphicField<'a> {
    /// Binds a value to its candidate classes.
    pub const fn new(data: &'a serde_json::Value, classes: &'a [String]) -> Self {
        Self { data, classes }
    }

    /// The classes a form may choose from.
    pub const fn classes(&self) -> &'a [String] {
        self.classes
    }

    /// The class of the referenced record.
    pub fn associated_class(&self) -> Option<&'a str> {
        self.data.get("type").and_then(serde_json::Value::as_str)
    }

    /// The id of the referenced record, as text.
    pub fn associated_id(&self) -> Option<String> {
        match self.data.get("id")? {
            serde_json::Value::Number(n) => Some(n.to_string()),
            serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
            _ => None,
        }
    }

    /// `"<Class> #<id>"`, or `None` when nothing is referenced.
    pub fn display(&self) -> Option<String> {
        Some(format!(
            "{} #{}",
            self.associated_class()?,
            self.associated_id()?
        ))
    }

    /// The global id a form should pre-select.
    pub fn selected_global_id(&self, app: &str) -> Option<String> {
        let gid = GlobalId {
            app: app.to_string(),
            class_name: self.associated_class()?.to_string(),
            id: self.associated_id()?,
        };
        Some(gid.to_string())
    }

    /// Returns `true` if the referenced class is one of the allowed classes.
    pub fn is_allowed_class(&self) -> bool {
        self.associated_class()
            .is_some_and(|class| self.classes.iter().any(|c| c == class))
    }
}
