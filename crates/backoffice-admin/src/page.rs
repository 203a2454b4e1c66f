//! Page view-models.
//!
//! A page gathers everything a template needs to render one screen: the
//! dashboard's attributes for that page, the resource(s) rendered as
//! [`FieldView`]s, and the surrounding paging, ordering and link state. All
//! pages serialize to JSON.

use backoffice_core::i18n::Localizer;
use backoffice_core::utils::inflector;
use serde::Serialize;

use crate::authorization::{Action, Authorizer};
use crate::field::{Field, FieldView, PageKind};
use crate::helpers::{self, PLURAL_COUNT};
use crate::order::{Order, OrderParams, SortOrder};
use crate::pagination::Paginated;
use crate::registry::ResourceEntry;
use crate::resource::Resource;
use crate::search::Search;

/// The collaborators every page is built with.
#[derive(Clone, Copy)]
pub struct PageContext<'a> {
    /// The resource being rendered.
    pub entry: &'a ResourceEntry,
    /// Translations, locale and time zone.
    pub localizer: &'a Localizer,
    /// Decides which action links appear.
    pub authorizer: &'a dyn Authorizer,
    /// The mount prefix (`/admin`, or empty).
    pub prefix: &'a str,
}

impl<'a> PageContext<'a> {
    /// Creates a context.
    pub fn new(
        entry: &'a ResourceEntry,
        localizer: &'a Localizer,
        authorizer: &'a dyn Authorizer,
        prefix: &'a str,
    ) -> Self {
        Self {
            entry,
            localizer,
            authorizer,
            prefix,
        }
    }

    /// `<prefix>/<route_key>`.
    pub fn index_path(&self) -> String {
        format!("{}/{}", self.prefix, self.entry.route_key)
    }

    /// `<prefix>/<route_key>/new`.
    pub fn new_path(&self) -> String {
        format!("{}/new", self.index_path())
    }

    /// `<prefix>/<route_key>/<id>`.
    pub fn show_path(&self, id: u64) -> String {
        format!("{}/{id}", self.index_path())
    }

    /// `<prefix>/<route_key>/<id>/edit`.
    pub fn edit_path(&self, id: u64) -> String {
        format!("{}/edit", self.show_path(id))
    }

    /// The entry title names one resource, so it only defaults the singular.
    fn display_name(&self, count: usize) -> String {
        let default = if count == 1 { self.entry.title.as_deref() } else { None };
        helpers::display_resource_name(self.localizer, &self.entry.name, count, default)
    }

    fn link(&self, action: Action, resource: Option<&Resource>) -> Option<ActionLink> {
        if !self.entry.exposes(action) || !self.authorizer.show_action(action, resource) {
            return None;
        }
        let id = resource.and_then(|r| r.id);
        let (path, method) = match (action, id) {
            (Action::Index, _) => (self.index_path(), "get"),
            (Action::New, _) => (self.new_path(), "get"),
            (Action::Show, Some(id)) => (self.show_path(id), "get"),
            (Action::Edit, Some(id)) => (self.edit_path(id), "get"),
            (Action::Destroy, Some(id)) => (self.show_path(id), "delete"),
            _ => return None,
        };
        Some(ActionLink {
            action,
            path,
            method,
        })
    }

    fn links(&self, actions: &[Action], resource: Option<&Resource>) -> Vec<ActionLink> {
        actions
            .iter()
            .filter_map(|a| self.link(*a, resource))
            .collect()
    }

    fn render_fields(&self, names: &[&str], resource: &Resource, page: PageKind) -> Vec<FieldView> {
        let dashboard = &self.entry.dashboard;
        names
            .iter()
            .filter_map(|name| {
                let field_type = dashboard.attribute_type(name)?;
                let value = resource.value_of(name);
                Some(Field::new(name, field_type, &value, page).render(self.localizer))
            })
            .collect()
    }
}

/// A link to a controller action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionLink {
    /// The action.
    pub action: Action,
    /// The target path.
    pub path: String,
    /// The HTTP method.
    pub method: &'static str,
}

/// A sortable column of the collection table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnHeader {
    /// The attribute.
    pub attribute: String,
    /// The column label.
    pub label: String,
    /// The column's current sort state.
    pub sort_order: SortOrder,
    /// The parameters of the header's toggle link.
    pub order_params: OrderParams,
}

/// One row of the collection table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionRow {
    /// The primary key.
    pub id: Option<u64>,
    /// The display title.
    pub title: String,
    /// The collection attributes.
    pub fields: Vec<FieldView>,
    /// Row actions (show, edit, destroy) the user may take.
    pub actions: Vec<ActionLink>,
}

/// Paging metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    /// The 1-indexed page.
    pub page: usize,
    /// Items per page.
    pub per_page: usize,
    /// Matching items across all pages.
    pub total_count: usize,
    /// Number of pages.
    pub total_pages: usize,
    /// Whether a later page exists.
    pub has_next: bool,
    /// Whether an earlier page exists.
    pub has_previous: bool,
}

impl<T> From<&Paginated<T>> for PageInfo {
    fn from(p: &Paginated<T>) -> Self {
        Self {
            page: p.page,
            per_page: p.per_page,
            total_count: p.total_count,
            total_pages: p.total_pages,
            has_next: p.has_next,
            has_previous: p.has_previous,
        }
    }
}

/// The index page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionPage {
    /// The resource type name.
    pub resource_name: String,
    /// The pluralized display name.
    pub display_name: String,
    /// The trimmed search term.
    pub search_term: String,
    /// Whether any attribute is searchable.
    pub show_search_bar: bool,
    /// The current sort state.
    pub order: Order,
    /// Column headers.
    pub headers: Vec<ColumnHeader>,
    /// The resources on this page.
    pub rows: Vec<CollectionRow>,
    /// Paging metadata.
    pub pagination: PageInfo,
    /// Associations eager-loaded for the collection.
    pub association_includes: Vec<String>,
    /// The "new" link, when allowed.
    pub new_link: Option<ActionLink>,
}

impl CollectionPage {
    /// Builds the index page from one page of resources.
    pub fn build(
        ctx: &PageContext<'_>,
        resources: &Paginated<Resource>,
        search: &Search,
        order: &Order,
    ) -> Self {
        let dashboard = &ctx.entry.dashboard;
        let columns = dashboard.collection_attribute_names();
        let headers = columns
            .iter()
            .map(|name| ColumnHeader {
                attribute: (*name).to_string(),
                label: inflector::humanize(name),
                sort_order: order.sort_order_for(name),
                order_params: order.order_params_for(name),
            })
            .collect();
        let rows = resources
            .items
            .iter()
            .map(|resource| CollectionRow {
                id: resource.id,
                title: dashboard.display_resource(resource),
                fields: ctx.render_fields(&columns, resource, PageKind::Collection),
                actions: ctx.links(
                    &[Action::Show, Action::Edit, Action::Destroy],
                    Some(resource),
                ),
            })
            .collect();

        Self {
            resource_name: ctx.entry.name.clone(),
            display_name: ctx.display_name(PLURAL_COUNT),
            search_term: search.term().to_string(),
            show_search_bar: dashboard.has_searchable_attributes(),
            order: order.clone(),
            headers,
            rows,
            pagination: PageInfo::from(resources),
            association_includes: dashboard
                .collection_includes()
                .into_iter()
                .map(str::to_string)
                .collect(),
            new_link: ctx.link(Action::New, None),
        }
    }
}

/// The show page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShowPage {
    /// The resource type name.
    pub resource_name: String,
    /// The singular display name.
    pub display_name: String,
    /// The resource's display title.
    pub title: String,
    /// The primary key.
    pub id: Option<u64>,
    /// The show page attributes.
    pub fields: Vec<FieldView>,
    /// Available actions (index, edit, destroy).
    pub actions: Vec<ActionLink>,
}

impl ShowPage {
    /// Builds the show page.
    pub fn build(ctx: &PageContext<'_>, resource: &Resource) -> Self {
        let dashboard = &ctx.entry.dashboard;
        Self {
            resource_name: ctx.entry.name.clone(),
            display_name: ctx.display_name(1),
            title: dashboard.display_resource(resource),
            id: resource.id,
            fields: ctx.render_fields(
                &dashboard.show_page_attribute_names(),
                resource,
                PageKind::Show,
            ),
            actions: ctx.links(
                &[Action::Index, Action::Edit, Action::Destroy],
                Some(resource),
            ),
        }
    }
}

/// One input of a form, with its errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormField {
    /// The rendered field.
    #[serde(flatten)]
    pub field: FieldView,
    /// The label.
    pub label: String,
    /// Messages recorded for this attribute.
    pub errors: Vec<String>,
}

/// The new and edit pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormPage {
    /// The resource type name.
    pub resource_name: String,
    /// The singular display name.
    pub display_name: String,
    /// The page title ("New Customer", or the resource's title).
    pub title: String,
    /// The primary key, when editing.
    pub id: Option<u64>,
    /// The action the form submits to.
    pub action: Action,
    /// The submit path.
    pub submit_path: String,
    /// The submit method.
    pub method: &'static str,
    /// The inputs.
    pub fields: Vec<FormField>,
    /// Every error as a full message.
    pub errors: Vec<String>,
}

impl FormPage {
    /// Builds a form for `resource`: a create form while it is unsaved, an
    /// update form otherwise.
    pub fn build(ctx: &PageContext<'_>, resource: &Resource) -> Self {
        let dashboard = &ctx.entry.dashboard;
        let display_name = ctx.display_name(1);
        let (action, submit_path, method, title) = match resource.id {
            Some(id) => (
                Action::Update,
                ctx.show_path(id),
                "patch",
                dashboard.display_resource(resource),
            ),
            None => (
                Action::Create,
                ctx.index_path(),
                "post",
                format!("New {display_name}"),
            ),
        };
        let names = dashboard.form_attribute_names();
        let fields = ctx
            .render_fields(&names, resource, PageKind::Form)
            .into_iter()
            .map(|field| FormField {
                label: inflector::humanize(&field.attribute),
                errors: resource
                    .errors
                    .on(&field.attribute)
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
                field,
            })
            .collect();

        Self {
            resource_name: ctx.entry.name.clone(),
            display_name,
            title,
            id: resource.id,
            action,
            submit_path,
            method,
            fields,
            errors: resource.errors.full_messages(),
        }
    }
}

/// Any rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageView {
    /// The index.
    Collection(CollectionPage),
    /// A single resource.
    Show(ShowPage),
    /// The new or edit form.
    Form(FormPage),
}
