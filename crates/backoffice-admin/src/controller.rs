//! The resource controller.
//!
//! [`ResourceController`] implements the seven actions for every registered
//! resource. It is transport-agnostic: each action returns a [`Response`]
//! (a page to render or a redirect), and [`site`](crate::site) maps those to
//! HTTP.
//!
//! Create and update recover from validation failures by re-rendering the
//! form with status 422. Destroy recovers from a refused deletion with an
//! error flash. Every other error propagates to the caller.

use std::sync::Arc;

use backoffice_core::i18n::{Localizer, Translations};
use backoffice_core::{AdminError, AdminResult, Settings};
use http::StatusCode;
use serde::Serialize;

use crate::authorization::{Action, AuthTarget, Authorizer};
use crate::flash::Flash;
use crate::helpers;
use crate::locator::Locator;
use crate::order::Order;
use crate::page::{CollectionPage, FormPage, PageContext, PageView, ShowPage};
use crate::pagination::Pagination;
use crate::params::{param_key, resource_params};
use crate::registry::{ResourceEntry, ResourceRegistry};
use crate::resource::Resource;
use crate::scope::Scope;
use crate::search::Search;
use crate::store::ResourceStore;

/// The outcome of a controller action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Render a page.
    Render {
        /// The template name (`index`, `show`, `new`, `edit`).
        template: &'static str,
        /// The HTTP status.
        #[serde(serialize_with = "serialize_status")]
        status: StatusCode,
        /// The page view-model.
        page: PageView,
    },
    /// Redirect, optionally carrying a flash message.
    Redirect {
        /// The target path.
        location: String,
        /// The flash message.
        flash: Option<Flash>,
    },
}

fn serialize_status<S: serde::Serializer>(status: &StatusCode, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u16(status.as_u16())
}

impl Response {
    fn render(template: &'static str, status: StatusCode, page: PageView) -> Self {
        Self::Render {
            template,
            status,
            page,
        }
    }

    fn redirect(location: String, flash: Flash) -> Self {
        Self::Redirect {
            location,
            flash: Some(flash),
        }
    }

    /// The HTTP status of this response.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Render { status, .. } => *status,
            Self::Redirect { .. } => StatusCode::SEE_OTHER,
        }
    }
}

/// Index request parameters, read from the parsed query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexParams {
    /// The raw search term.
    pub search: String,
    /// The requested page.
    pub pagination: Pagination,
    /// `<resource>[order]`.
    pub order: Option<String>,
    /// `<resource>[direction]`.
    pub direction: Option<String>,
}

impl IndexParams {
    /// Reads `search`, `_page`, `per_page`, `<resource>[order]` and
    /// `<resource>[direction]`. Missing or malformed values take their
    /// defaults.
    pub fn from_query(query: &serde_json::Value, resource_name: &str, default_per_page: usize) -> Self {
        let text = |v: Option<&serde_json::Value>| v.and_then(serde_json::Value::as_str).map(str::to_string);
        let sorting = query.get(param_key(resource_name));
        Self {
            search: text(query.get("search")).unwrap_or_default(),
            pagination: Pagination::from_params(
                query.get("_page").and_then(serde_json::Value::as_str),
                query.get("per_page").and_then(serde_json::Value::as_str),
                default_per_page,
            ),
            order: text(sorting.and_then(|s| s.get("order"))),
            direction: text(sorting.and_then(|s| s.get("direction"))),
        }
    }
}

/// Handles the CRUD actions of every registered resource.
#[derive(Clone)]
pub struct ResourceController {
    registry: Arc<ResourceRegistry>,
    store: Arc<dyn ResourceStore>,
    locator: Arc<dyn Locator>,
    authorizer: Arc<dyn Authorizer>,
    translations: Arc<Translations>,
    settings: Arc<Settings>,
}

impl ResourceController {
    /// Creates a controller.
    pub fn new(
        registry: Arc<ResourceRegistry>,
        store: Arc<dyn ResourceStore>,
        locator: Arc<dyn Locator>,
        authorizer: Arc<dyn Authorizer>,
        translations: Arc<Translations>,
        settings: Arc<Settings>,
    ) -> Self {
        Self {
            registry,
            store,
            locator,
            authorizer,
            translations,
            settings,
        }
    }

    /// The registered resources.
    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    /// The settings in effect.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn localizer(&self) -> Localizer {
        Localizer::from_settings(Arc::clone(&self.translations), &self.settings)
    }

    /// Resolves the entry for a route key. An action the entry does not
    /// expose is not routed, so it is NotFound like an unknown resource.
    fn entry(&self, route_key: &str, action: Action) -> AdminResult<Arc<ResourceEntry>> {
        let entry = self.registry.resolve(route_key)?;
        if !entry.exposes(action) {
            tracing::debug!(resource = %entry.name, action = %action, "action not exposed");
            return Err(AdminError::NotFound(format!(
                "No route for {action} on '{route_key}'"
            )));
        }
        Ok(entry)
    }

    fn authorize(&self, action: Action, target: AuthTarget<'_>) -> AdminResult<()> {
        self.authorizer.authorize(action, target).map_err(|err| {
            tracing::warn!(action = %action, resource = target.resource_type(), error = %err, "access denied");
            err
        })
    }

    async fn find(&self, entry: &ResourceEntry, id: &str, action: Action) -> AdminResult<Resource> {
        let resource = self.store.find(&entry.name, id).await?;
        self.authorize(action, AuthTarget::Resource(&resource))?;
        Ok(resource)
    }

    fn notice(&self, localizer: &Localizer, entry: &ResourceEntry, action: Action) -> Flash {
        let resource = helpers::display_resource_name(localizer, &entry.name, 1, entry.title.as_deref());
        let key = format!("backoffice.controller.{action}.success");
        let message = localizer
            .translate(&key, &[("resource", &resource)])
            .unwrap_or_else(|| {
                let verb = match action {
                    Action::Create => "created",
                    Action::Update => "updated",
                    _ => "destroyed",
                };
                format!("{resource} was successfully {verb}.")
            });
        Flash::notice(message)
    }

    /// Lists a page of resources, filtered, ordered and paginated by the
    /// query. Bad query values fall back to defaults.
    pub async fn index(&self, route_key: &str, query: &serde_json::Value) -> AdminResult<Response> {
        let entry = self.entry(route_key, Action::Index)?;
        self.authorize(Action::Index, AuthTarget::Type(&entry.name))?;

        let params = IndexParams::from_query(query, &entry.name, self.settings.records_per_page);
        let dashboard = &entry.dashboard;
        let search = Search::new(dashboard, &params.search);
        let order = Order::new(params.order.as_deref(), params.direction.as_deref());
        let scope = Scope::new(entry.name.clone())
            .search(search.clone())
            .includes(dashboard.collection_includes())
            .order(order.clone())
            .paginate(params.pagination);
        let resources = self.store.fetch(&scope).await?;
        tracing::debug!(
            resource = %entry.name,
            total = resources.total_count,
            page = resources.page,
            "listing"
        );

        let localizer = self.localizer();
        let prefix = self.settings.url_prefix();
        let ctx = PageContext::new(&entry, &localizer, self.authorizer.as_ref(), &prefix);
        let page = CollectionPage::build(&ctx, &resources, &search, &order);
        Ok(Response::render("index", StatusCode::OK, PageView::Collection(page)))
    }

    /// Shows one resource.
    pub async fn show(&self, route_key: &str, id: &str) -> AdminResult<Response> {
        let entry = self.entry(route_key, Action::Show)?;
        let resource = self.find(&entry, id, Action::Show).await?;
        let localizer = self.localizer();
        let prefix = self.settings.url_prefix();
        let ctx = PageContext::new(&entry, &localizer, self.authorizer.as_ref(), &prefix);
        Ok(Response::render(
            "show",
            StatusCode::OK,
            PageView::Show(ShowPage::build(&ctx, &resource)),
        ))
    }

    /// Renders the blank form.
    pub fn new_form(&self, route_key: &str) -> AdminResult<Response> {
        let entry = self.entry(route_key, Action::New)?;
        let resource = self.store.build(&entry.name);
        self.authorize(Action::New, AuthTarget::Resource(&resource))?;
        Ok(self.render_form(&entry, &resource, "new", StatusCode::OK))
    }

    /// Renders the edit form.
    pub async fn edit(&self, route_key: &str, id: &str) -> AdminResult<Response> {
        let entry = self.entry(route_key, Action::Edit)?;
        let resource = self.find(&entry, id, Action::Edit).await?;
        Ok(self.render_form(&entry, &resource, "edit", StatusCode::OK))
    }

    /// Creates a resource from the permitted body parameters.
    pub async fn create(&self, route_key: &str, body: &serde_json::Value) -> AdminResult<Response> {
        let entry = self.entry(route_key, Action::Create)?;
        let attributes =
            resource_params(body, &entry.name, &entry.dashboard, self.locator.as_ref()).await?;
        let mut resource = self.store.build(&entry.name);
        resource.assign(attributes);
        self.authorize(Action::Create, AuthTarget::Resource(&resource))?;

        match self.store.save(&mut resource).await {
            Ok(()) => self.after_save(&entry, &resource, Action::Create),
            Err(AdminError::ValidationFailed(errors)) => {
                resource.errors = errors;
                Ok(self.render_form(&entry, &resource, "new", StatusCode::UNPROCESSABLE_ENTITY))
            }
            Err(err) => Err(err),
        }
    }

    /// Updates a resource from the permitted body parameters.
    pub async fn update(
        &self,
        route_key: &str,
        id: &str,
        body: &serde_json::Value,
    ) -> AdminResult<Response> {
        let entry = self.entry(route_key, Action::Update)?;
        let mut resource = self.find(&entry, id, Action::Update).await?;
        let attributes =
            resource_params(body, &entry.name, &entry.dashboard, self.locator.as_ref()).await?;
        resource.assign(attributes);

        match self.store.save(&mut resource).await {
            Ok(()) => self.after_save(&entry, &resource, Action::Update),
            Err(AdminError::ValidationFailed(errors)) => {
                resource.errors = errors;
                Ok(self.render_form(&entry, &resource, "edit", StatusCode::UNPROCESSABLE_ENTITY))
            }
            Err(err) => Err(err),
        }
    }

    /// Destroys a resource and redirects to the index. A refused deletion
    /// becomes an error flash.
    pub async fn destroy(&self, route_key: &str, id: &str) -> AdminResult<Response> {
        let entry = self.entry(route_key, Action::Destroy)?;
        let mut resource = self.find(&entry, id, Action::Destroy).await?;
        let localizer = self.localizer();
        let flash = match self.store.destroy(&mut resource).await {
            Ok(()) => self.notice(&localizer, &entry, Action::Destroy),
            Err(AdminError::ValidationFailed(errors)) => {
                tracing::warn!(resource = %entry.name, id, %errors, "destroy refused");
                Flash::error(errors.full_messages().join("<br/>"))
            }
            Err(err) => return Err(err),
        };
        let location = format!("{}/{}", self.settings.url_prefix(), entry.route_key);
        Ok(Response::redirect(location, flash))
    }

    fn after_save(&self, entry: &ResourceEntry, resource: &Resource, action: Action) -> AdminResult<Response> {
        let id = resource.id.ok_or_else(|| {
            AdminError::StoreError(format!("{} was saved without an id", entry.name))
        })?;
        let localizer = self.localizer();
        let location = format!("{}/{}/{id}", self.settings.url_prefix(), entry.route_key);
        Ok(Response::redirect(location, self.notice(&localizer, entry, action)))
    }

    fn render_form(
        &self,
        entry: &ResourceEntry,
        resource: &Resource,
        template: &'static str,
        status: StatusCode,
    ) -> Response {
        let localizer = self.localizer();
        let prefix = self.settings.url_prefix();
        let ctx = PageContext::new(entry, &localizer, self.authorizer.as_ref(), &prefix);
        Response::render(template, status, PageView::Form(FormPage::build(&ctx, resource)))
    }
}

impl std::fmt::Debug for ResourceController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceController")
            .field("resources", &self.registry.len())
            .field("namespace", &self.settings.namespace)
            .finish_non_exhaustive()
    }
}
