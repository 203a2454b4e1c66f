//! Field types: typed formatting adapters around attribute values.
//!
//! A dashboard maps each attribute to a [`FieldType`]. The field type decides
//! whether the attribute is searchable, how it is permitted in form
//! submissions, whether it is an association to eager-load, how submitted
//! form strings are coerced, and how the value is formatted on each page.
//!
//! A [`Field`] pairs a field type with one resource's value for one page and
//! renders it into a serializable [`FieldView`].

pub mod date;
pub mod polymorphic;

use backoffice_core::i18n::Localizer;
use backoffice_core::utils::{inflector, text};
use serde::{Deserialize, Serialize};

use crate::resource::class_name_for;

pub use date::{DateField, DateOptions};
pub use polymorphic::PolymorphicField;

/// Default number of characters shown for text on collection pages.
pub const DEFAULT_TRUNCATE: usize = 50;

/// The page a field is rendered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    /// A row of the index table.
    Collection,
    /// The show page.
    Show,
    /// The new/edit form.
    Form,
}

impl PageKind {
    /// The partial name used in render paths.
    pub const fn partial_name(self) -> &'static str {
        match self {
            Self::Collection => "index",
            Self::Show => "show",
            Self::Form => "form",
        }
    }
}

/// How an attribute may appear in a form submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermittedAttribute {
    /// A single scalar value.
    Scalar(String),
    /// An array of scalar values.
    Array(String),
    /// A map with the listed scalar keys.
    Nested(String, Vec<String>),
}

impl PermittedAttribute {
    /// The attribute name.
    pub fn name(&self) -> &str {
        match self {
            Self::Scalar(name) | Self::Array(name) | Self::Nested(name, _) => name,
        }
    }
}

/// Options for string-like fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextOptions {
    /// Characters shown on collection pages.
    pub truncate: usize,
    /// Whether search matches this attribute.
    pub searchable: bool,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            truncate: DEFAULT_TRUNCATE,
            searchable: true,
        }
    }
}

/// Options for number fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberOptions {
    /// Text shown before the number (e.g. "$").
    pub prefix: String,
    /// Text shown after the number (e.g. "%").
    pub suffix: String,
    /// Fixed number of decimals, if any.
    pub decimals: Option<usize>,
}

impl NumberOptions {
    /// Sets the prefix.
    #[must_use]
    pub fn prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    /// Sets the suffix.
    #[must_use]
    pub fn suffix(mut self, suffix: &str) -> Self {
        self.suffix = suffix.to_string();
        self
    }

    /// Sets the number of decimals.
    #[must_use]
    pub const fn decimals(mut self, decimals: usize) -> Self {
        self.decimals = Some(decimals);
        self
    }
}

/// The type of one dashboard attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldType {
    /// Short text.
    String(TextOptions),
    /// Long text.
    Text(TextOptions),
    /// An email address.
    Email,
    /// A number with optional prefix, suffix and precision.
    Number(NumberOptions),
    /// A boolean flag.
    Boolean,
    /// One value from a fixed collection.
    Select {
        /// The selectable values.
        collection: Vec<String>,
    },
    /// A calendar date.
    Date(DateOptions),
    /// A point in time.
    DateTime(DateOptions),
    /// The id of one associated record.
    BelongsTo {
        /// The associated resource type.
        class_name: String,
        /// Whether search matches the formatted reference.
        searchable: bool,
    },
    /// The ids of many associated records.
    HasMany {
        /// The associated resource type.
        class_name: String,
    },
    /// A `{type, id}` reference to a record of one of several types.
    Polymorphic {
        /// The class names a value may refer to.
        classes: Vec<String>,
    },
}

impl FieldType {
    /// A searchable short-text field.
    pub fn string() -> Self {
        Self::String(TextOptions::default())
    }

    /// A searchable long-text field.
    pub fn text() -> Self {
        Self::Text(TextOptions::default())
    }

    /// An email field.
    pub const fn email() -> Self {
        Self::Email
    }

    /// A plain number field.
    pub fn number() -> Self {
        Self::Number(NumberOptions::default())
    }

    /// A boolean field.
    pub const fn boolean() -> Self {
        Self::Boolean
    }

    /// A select field over `collection`.
    pub fn select(collection: &[&str]) -> Self {
        Self::Select {
            collection: collection.iter().map(|c| (*c).to_string()).collect(),
        }
    }

    /// A date field with default options.
    pub fn date() -> Self {
        Self::Date(DateOptions::default())
    }

    /// A date-time field with default options.
    pub fn date_time() -> Self {
        Self::DateTime(DateOptions::default())
    }

    /// A belongs-to association to `class_name`.
    pub fn belongs_to(class_name: &str) -> Self {
        Self::BelongsTo {
            class_name: class_name.to_string(),
            searchable: false,
        }
    }

    /// A has-many association to `class_name`.
    pub fn has_many(class_name: &str) -> Self {
        Self::HasMany {
            class_name: class_name.to_string(),
        }
    }

    /// A polymorphic association over `classes`.
    pub fn polymorphic(classes: &[&str]) -> Self {
        Self::Polymorphic {
            classes: classes.iter().map(|c| (*c).to_string()).collect(),
        }
    }

    /// Makes a text or belongs-to field searchable (or not).
    #[must_use]
    pub fn searchable(mut self, on: bool) -> Self {
        match &mut self {
            Self::String(opts) | Self::Text(opts) => opts.searchable = on,
            Self::BelongsTo { searchable, .. } => *searchable = on,
            _ => {}
        }
        self
    }

    /// Sets the collection-page truncation length of a text field.
    #[must_use]
    pub fn truncate(mut self, chars: usize) -> Self {
        if let Self::String(opts) | Self::Text(opts) = &mut self {
            opts.truncate = chars;
        }
        self
    }

    /// The kind name used in partial paths (e.g. "date_time").
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Text(_) => "text",
            Self::Email => "email",
            Self::Number(_) => "number",
            Self::Boolean => "boolean",
            Self::Select { .. } => "select",
            Self::Date(_) => "date",
            Self::DateTime(_) => "date_time",
            Self::BelongsTo { .. } => "belongs_to",
            Self::HasMany { .. } => "has_many",
            Self::Polymorphic { .. } => "polymorphic",
        }
    }

    /// Whether search considers this attribute.
    pub const fn is_searchable(&self) -> bool {
        match self {
            Self::String(opts) | Self::Text(opts) => opts.searchable,
            Self::Email | Self::Select { .. } => true,
            Self::BelongsTo { searchable, .. } => *searchable,
            _ => false,
        }
    }

    /// Whether the attribute is an association that should be eager-loaded.
    pub const fn eager_load(&self) -> bool {
        matches!(
            self,
            Self::BelongsTo { .. } | Self::HasMany { .. } | Self::Polymorphic { .. }
        )
    }

    /// The permitted shape of this attribute in a form submission.
    pub fn permitted_attribute(&self, attribute: &str) -> PermittedAttribute {
        match self {
            Self::HasMany { .. } => PermittedAttribute::Array(attribute.to_string()),
            Self::Polymorphic { .. } => PermittedAttribute::Nested(
                attribute.to_string(),
                vec!["type".to_string(), "value".to_string()],
            ),
            _ => PermittedAttribute::Scalar(attribute.to_string()),
        }
    }

    /// Coerces a submitted value into the stored representation.
    ///
    /// Values that cannot be coerced are returned unchanged so that store
    /// validations can report them.
    pub fn coerce(&self, value: serde_json::Value) -> serde_json::Value {
        match self {
            Self::Number(_) => coerce_number(value),
            Self::Boolean => coerce_boolean(value),
            Self::BelongsTo { .. } => coerce_id(value),
            Self::HasMany { .. } => match value {
                serde_json::Value::Array(items) => serde_json::Value::Array(
                    items
                        .into_iter()
                        .map(coerce_id)
                        .filter(|v| !v.is_null())
                        .collect(),
                ),
                other => other,
            },
            Self::Date(_) | Self::DateTime(_) => blank_to_null(value),
            _ => value,
        }
    }

    /// The strings search compares against: the raw value and, for
    /// associations, the formatted reference.
    pub fn search_candidates(&self, value: &serde_json::Value) -> Vec<String> {
        let mut candidates = Vec::new();
        if let Some(raw) = raw_text(value) {
            candidates.push(raw);
        }
        if let Self::BelongsTo { class_name, .. } = self {
            if let Some(id) = raw_text(value) {
                candidates.push(format!("{} #{id}", class_name_for(class_name)));
            }
        }
        candidates
    }
}

/// One attribute of one resource, prepared for one page.
#[derive(Debug, Clone, Copy)]
pub struct Field<'a> {
    /// The attribute name.
    pub attribute: &'a str,
    /// The attribute's type.
    pub field_type: &'a FieldType,
    /// The raw value.
    pub data: &'a serde_json::Value,
    /// The page being rendered.
    pub page: PageKind,
}

impl<'a> Field<'a> {
    /// Creates a field.
    pub const fn new(
        attribute: &'a str,
        field_type: &'a FieldType,
        data: &'a serde_json::Value,
        page: PageKind,
    ) -> Self {
        Self {
            attribute,
            field_type,
            data,
            page,
        }
    }

    /// The render path for this field (`fields/<kind>/<page>`).
    pub fn to_partial_path(&self) -> String {
        format!(
            "fields/{}/{}",
            self.field_type.kind(),
            self.page.partial_name()
        )
    }

    /// Returns `true` when the value is null or blank text.
    pub fn is_blank(&self) -> bool {
        match self.data {
            serde_json::Value::Null => true,
            serde_json::Value::String(s) => text::is_blank(s),
            _ => false,
        }
    }

    /// The date view of a date or date-time field.
    pub fn as_date(&self, localizer: &'a Localizer) -> Option<DateField<'a>> {
        match self.field_type {
            FieldType::Date(opts) | FieldType::DateTime(opts) => {
                Some(DateField::new(self.data, opts, localizer))
            }
            _ => None,
        }
    }

    /// The polymorphic view of a polymorphic field.
    pub fn as_polymorphic(&self) -> Option<PolymorphicField<'a>> {
        match self.field_type {
            FieldType::Polymorphic { classes } => Some(PolymorphicField::new(self.data, classes)),
            _ => None,
        }
    }

    /// Formats the value for display, or `None` when there is nothing to
    /// show.
    pub fn formatted(&self, localizer: &Localizer) -> Option<String> {
        if self.is_blank() {
            return None;
        }
        match self.field_type {
            FieldType::String(opts) | FieldType::Text(opts) => {
                let raw = raw_text(self.data)?;
                Some(if self.page == PageKind::Collection {
                    text::truncate_chars(&raw, opts.truncate)
                } else {
                    raw
                })
            }
            FieldType::Email | FieldType::Select { .. } => raw_text(self.data),
            FieldType::Number(opts) => Some(format_number(self.data, opts)),
            FieldType::Boolean => Some(match self.data {
                serde_json::Value::Bool(b) => b.to_string(),
                other => raw_text(other).unwrap_or_default(),
            }),
            FieldType::Date(opts) => {
                let date = DateField::new(self.data, opts, localizer);
                match date.date() {
                    Ok(formatted) => formatted,
                    Err(err) => {
                        tracing::warn!(attribute = self.attribute, error = %err, "date format failed");
                        raw_text(self.data)
                    }
                }
            }
            FieldType::DateTime(opts) => DateField::new(self.data, opts, localizer).datetime(),
            FieldType::BelongsTo { class_name, .. } => raw_text(self.data)
                .map(|id| format!("{} #{id}", class_name_for(class_name))),
            FieldType::HasMany { class_name } => {
                let count = self.data.as_array().map_or(0, Vec::len);
                let noun = inflector::humanize(class_name).to_lowercase();
                Some(if count == 1 {
                    format!("1 {noun}")
                } else {
                    format!("{count} {}", inflector::pluralize(&noun))
                })
            }
            FieldType::Polymorphic { classes } => {
                PolymorphicField::new(self.data, classes).display()
            }
        }
    }

    /// Renders the field into a serializable view.
    pub fn render(&self, localizer: &Localizer) -> FieldView {
        FieldView {
            attribute: self.attribute.to_string(),
            kind: self.field_type.kind(),
            partial: self.to_partial_path(),
            data: self.data.clone(),
            formatted: self.formatted(localizer),
        }
    }
}

/// A rendered field, as handed to the view layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldView {
    /// The attribute name.
    pub attribute: String,
    /// The field kind.
    pub kind: &'static str,
    /// The render path.
    pub partial: String,
    /// The raw value.
    pub data: serde_json::Value,
    /// The display string, if any.
    pub formatted: Option<String>,
}

// ── Helpers ─────────────────────────────────────────────────────────

fn raw_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn blank_to_null(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::String(s) if text::is_blank(&s) => serde_json::Value::Null,
        other => other,
    }
}

fn coerce_number(value: serde_json::Value) -> serde_json::Value {
    let serde_json::Value::String(s) = value else {
        return value;
    };
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return serde_json::Value::Null;
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return serde_json::Value::from(i);
    }
    trimmed
        .parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map_or(serde_json::Value::String(s), serde_json::Value::Number)
}

fn coerce_boolean(value: serde_json::Value) -> serde_json::Value {
    let serde_json::Value::String(s) = value else {
        return value;
    };
    match s.trim().to_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => serde_json::Value::Bool(true),
        "" | "0" | "false" | "off" | "no" => serde_json::Value::Bool(false),
        _ => serde_json::Value::String(s),
    }
}

fn coerce_id(value: serde_json::Value) -> serde_json::Value {
    let serde_json::Value::String(s) = value else {
        return value;
    };
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return serde_json::Value::Null;
    }
    trimmed
        .parse::<u64>()
        .map_or(serde_json::Value::String(s), serde_json::Value::from)
}

fn format_number(value: &serde_json::Value, opts: &NumberOptions) -> String {
    let number = match value {
        serde_json::Value::Number(n) => Some(n.clone()),
        serde_json::Value::String(s) => s.trim().parse::<serde_json::Number>().ok(),
        _ => None,
    };
    let body = match (number, opts.decimals) {
        (Some(n), Some(decimals)) => n
            .as_f64()
            .map_or_else(|| n.to_string(), |f| format!("{f:.decimals$}")),
        (Some(n), None) => n.to_string(),
        (None, _) => raw_text(value).unwrap_or_default(),
    };
    format!("{}{body}{}", opts.prefix, opts.suffix)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use backoffice_core::i18n::Translations;
    use chrono_tz::Tz;
    use serde_json::json;

    use super::*;

    fn localizer() -> Localizer {
        Localizer::new(Arc::new(Translations::with_defaults()), "en", Tz::UTC)
    }

    #[test]
    fn test_partial_path() {
        let ty = FieldType::date_time();
        let data = json!(null);
        let field = Field::new("created_at", &ty, &data, PageKind::Collection);
        assert_eq!(field.to_partial_path(), "fields/date_time/index");
        let field = Field::new("created_at", &ty, &data, PageKind::Form);
        assert_eq!(field.to_partial_path(), "fields/date_time/form");
    }

    #[test]
    fn test_searchable_defaults() {
        assert!(FieldType::string().is_searchable());
        assert!(FieldType::email().is_searchable());
        assert!(!FieldType::string().searchable(false).is_searchable());
        assert!(!FieldType::number().is_searchable());
        assert!(!FieldType::date().is_searchable());
        assert!(!FieldType::polymorphic(&["Customer"]).is_searchable());
        assert!(FieldType::belongs_to("customer").searchable(true).is_searchable());
    }

    #[test]
    fn test_permitted_shapes() {
        assert_eq!(
            FieldType::has_many("order").permitted_attribute("order_ids"),
            PermittedAttribute::Array("order_ids".into())
        );
        assert_eq!(
            FieldType::polymorphic(&["Customer"]).permitted_attribute("owner"),
            PermittedAttribute::Nested("owner".into(), vec!["type".into(), "value".into()])
        );
        assert_eq!(
            FieldType::string().permitted_attribute("name"),
            PermittedAttribute::Scalar("name".into())
        );
    }

    #[test]
    fn test_coerce_number() {
        let ty = FieldType::number();
        assert_eq!(ty.coerce(json!("42")), json!(42));
        assert_eq!(ty.coerce(json!(" 1.5 ")), json!(1.5));
        assert_eq!(ty.coerce(json!("")), json!(null));
        assert_eq!(ty.coerce(json!("abc")), json!("abc"));
        assert_eq!(ty.coerce(json!(7)), json!(7));
    }

    #[test]
    fn test_coerce_boolean() {
        let ty = FieldType::boolean();
        for truthy in ["1", "true", "on", "TRUE"] {
            assert_eq!(ty.coerce(json!(truthy)), json!(true));
        }
        for falsy in ["0", "false", "off", ""] {
            assert_eq!(ty.coerce(json!(falsy)), json!(false));
        }
    }

    #[test]
    fn test_coerce_associations() {
        assert_eq!(FieldType::belongs_to("customer").coerce(json!("3")), json!(3));
        assert_eq!(FieldType::belongs_to("customer").coerce(json!("")), json!(null));
        assert_eq!(
            FieldType::has_many("order").coerce(json!(["1", "", "2"])),
            json!([1, 2])
        );
    }

    #[test]
    fn test_formatted_text_truncates_on_collection_only() {
        let ty = FieldType::string().truncate(5);
        let data = json!("Hello world");
        let l = localizer();
        assert_eq!(
            Field::new("name", &ty, &data, PageKind::Collection).formatted(&l),
            Some("Hello".to_string())
        );
        assert_eq!(
            Field::new("name", &ty, &data, PageKind::Show).formatted(&l),
            Some("Hello world".to_string())
        );
    }

    #[test]
    fn test_formatted_number() {
        let ty = FieldType::Number(NumberOptions::default().prefix("$").decimals(2));
        let data = json!(3.5);
        assert_eq!(
            Field::new("price", &ty, &data, PageKind::Show).formatted(&localizer()),
            Some("$3.50".to_string())
        );
    }

    #[test]
    fn test_formatted_associations() {
        let l = localizer();
        let belongs = FieldType::belongs_to("customer");
        let id = json!(3);
        assert_eq!(
            Field::new("customer_id", &belongs, &id, PageKind::Show).formatted(&l),
            Some("Customer #3".to_string())
        );

        let many = FieldType::has_many("line_item");
        let ids = json!([1, 2]);
        assert_eq!(
            Field::new("line_item_ids", &many, &ids, PageKind::Collection).formatted(&l),
            Some("2 line items".to_string())
        );
        let one = json!([5]);
        assert_eq!(
            Field::new("line_item_ids", &many, &one, PageKind::Collection).formatted(&l),
            Some("1 line item".to_string())
        );
    }

    #[test]
    fn test_blank_formats_to_none() {
        let ty = FieldType::string();
        let data = json!("   ");
        assert_eq!(
            Field::new("name", &ty, &data, PageKind::Show).formatted(&localizer()),
            None
        );
    }

    #[test]
    fn test_search_candidates() {
        let belongs = FieldType::belongs_to("customer").searchable(true);
        assert_eq!(
            belongs.search_candidates(&json!(3)),
            vec!["3".to_string(), "Customer #3".to_string()]
        );
        assert!(FieldType::string().search_candidates(&json!(null)).is_empty());
    }

    #[test]
    fn test_render_view() {
        let ty = FieldType::email();
        let data = json!("ada@example.com");
        let view = Field::new("email", &ty, &data, PageKind::Show).render(&localizer());
        assert_eq!(view.kind, "email");
        assert_eq!(view.partial, "fields/email/show");
        assert_eq!(view.formatted.as_deref(), Some("ada@example.com"));
    }
}
