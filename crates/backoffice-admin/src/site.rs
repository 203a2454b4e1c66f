//! Admin site assembly and router generation.
//!
//! The [`AdminSite`] collects the settings, the registered resources and the
//! collaborators (store, locator, authorizer, translations) and produces
//! either a bare [`ResourceController`] or an Axum router that serves it
//! under the configured namespace.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, RawQuery, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect};
use axum::routing::get;
use axum::{Json, Router};
use backoffice_core::i18n::{self, Translations};
use backoffice_core::logging::request_span;
use backoffice_core::{AdminError, AdminResult, Settings};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::Instrument;

use crate::authorization::{Action, Authorizer, PassthroughAuthorizer};
use crate::controller::{ResourceController, Response};
use crate::flash::Flash;
use crate::locator::Locator;
use crate::page::PageView;
use crate::params::parse_nested;
use crate::registry::{ResourceEntry, ResourceRegistry};
use crate::store::{InMemoryStore, ResourceStore};

/// The admin site: registered resources plus the services behind them.
///
/// # Examples
///
/// ```
/// use backoffice_admin::dashboard::Dashboard;
/// use backoffice_admin::field::FieldType;
/// use backoffice_admin::registry::ResourceEntry;
/// use backoffice_admin::site::AdminSite;
///
/// let mut site = AdminSite::new();
/// site.register(ResourceEntry::new(
///     Dashboard::new("customer").attribute("name", FieldType::string()),
/// ))
/// .unwrap();
/// let router = site.into_axum_router().unwrap();
/// ```
pub struct AdminSite {
    settings: Settings,
    registry: ResourceRegistry,
    store: Option<Arc<dyn ResourceStore>>,
    locator: Option<Arc<dyn Locator>>,
    authorizer: Arc<dyn Authorizer>,
    translations: Option<Translations>,
}

impl AdminSite {
    /// Creates a site with default settings, an in-memory store and a
    /// pass-through authorizer.
    pub fn new() -> Self {
        Self {
            settings: Settings::default(),
            registry: ResourceRegistry::new(),
            store: None,
            locator: None,
            authorizer: Arc::new(PassthroughAuthorizer),
            translations: None,
        }
    }

    /// Replaces the settings.
    #[must_use]
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Uses `backend` as both the store and the locator.
    #[must_use]
    pub fn backend<S>(mut self, backend: Arc<S>) -> Self
    where
        S: ResourceStore + Locator + 'static,
    {
        let store: Arc<dyn ResourceStore> = backend.clone();
        let locator: Arc<dyn Locator> = backend;
        self.store = Some(store);
        self.locator = Some(locator);
        self
    }

    /// Sets the store.
    #[must_use]
    pub fn store(mut self, store: Arc<dyn ResourceStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets the locator used to resolve polymorphic references.
    #[must_use]
    pub fn locator(mut self, locator: Arc<dyn Locator>) -> Self {
        self.locator = Some(locator);
        self
    }

    /// Sets the authorization hook.
    #[must_use]
    pub fn authorizer(mut self, authorizer: Arc<dyn Authorizer>) -> Self {
        self.authorizer = authorizer;
        self
    }

    /// Sets the translations. Without this, the built-in defaults plus the
    /// files in `settings.locale_paths` are loaded.
    #[must_use]
    pub fn translations(mut self, translations: Translations) -> Self {
        self.translations = Some(translations);
        self
    }

    /// Registers a resource.
    pub fn register(&mut self, entry: ResourceEntry) -> AdminResult<()> {
        self.registry.register(entry)
    }

    /// The registered resources.
    pub const fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    /// Builds the controller.
    pub fn into_controller(self) -> AdminResult<ResourceController> {
        let translations = match self.translations {
            Some(t) => t,
            None => i18n::load_translations(&self.settings)?,
        };
        let (store, locator): (Arc<dyn ResourceStore>, Arc<dyn Locator>) =
            match (self.store, self.locator) {
                (Some(store), Some(locator)) => (store, locator),
                (Some(_), None) => {
                    return Err(AdminError::ConfigurationError(
                        "A custom store needs a locator; use AdminSite::backend".to_string(),
                    ))
                }
                (None, locator) => {
                    let memory = Arc::new(InMemoryStore::default());
                    let locator: Arc<dyn Locator> = match locator {
                        Some(locator) => locator,
                        None => memory.clone(),
                    };
                    let store: Arc<dyn ResourceStore> = memory;
                    (store, locator)
                }
            };
        Ok(ResourceController::new(
            Arc::new(self.registry),
            store,
            locator,
            self.authorizer,
            Arc::new(translations),
            Arc::new(self.settings),
        ))
    }

    /// Generates the Axum router.
    ///
    /// The routes, relative to the namespace prefix, are:
    ///
    /// - `GET /` - Redirect to the first resource with an index
    /// - `GET /{resource}` - Index
    /// - `POST /{resource}` - Create
    /// - `GET /{resource}/new` - Blank form
    /// - `GET /{resource}/{id}` - Show
    /// - `GET /{resource}/{id}/edit` - Edit form
    /// - `PUT|PATCH|POST /{resource}/{id}` - Update
    /// - `DELETE /{resource}/{id}` - Destroy
    pub fn into_axum_router(self) -> AdminResult<Router> {
        let prefix = self.settings.url_prefix();
        let controller = self.into_controller()?;
        let state = Arc::new(SiteState { controller });

        let routes = Router::new()
            .route("/", get(handle_root))
            .route("/{resource}", get(handle_index).post(handle_create))
            .route("/{resource}/new", get(handle_new))
            .route(
                "/{resource}/{id}",
                get(handle_show)
                    .put(handle_update)
                    .patch(handle_update)
                    .post(handle_update)
                    .delete(handle_destroy),
            )
            .route("/{resource}/{id}/edit", get(handle_edit))
            .with_state(state)
            .layer(TraceLayer::new_for_http());

        Ok(if prefix.is_empty() {
            routes
        } else {
            Router::new().nest(&prefix, routes)
        })
    }
}

impl Default for AdminSite {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AdminSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<_> = self.registry.entries().iter().map(|e| e.name.clone()).collect();
        f.debug_struct("AdminSite")
            .field("namespace", &self.settings.namespace)
            .field("resources", &names.join(", "))
            .finish_non_exhaustive()
    }
}

/// Shared state for Axum handlers.
struct SiteState {
    controller: ResourceController,
}

/// An [`AdminError`] rendered as a JSON error response.
struct ErrorResponse(AdminError);

impl From<AdminError> for ErrorResponse {
    fn from(err: AdminError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self.0, "request rejected");
        }
        (
            status,
            Json(serde_json::json!({ "error": self.0.to_string() })),
        )
            .into_response()
    }
}

#[derive(Serialize)]
struct RenderBody<'a> {
    template: &'a str,
    status: u16,
    page: &'a PageView,
}

#[derive(Serialize)]
struct RedirectBody<'a> {
    location: &'a str,
    flash: Option<&'a Flash>,
}

fn into_http(response: &Response) -> axum::response::Response {
    match response {
        Response::Render {
            template,
            status,
            page,
        } => (
            *status,
            Json(RenderBody {
                template,
                status: status.as_u16(),
                page,
            }),
        )
            .into_response(),
        Response::Redirect { location, flash } => (
            StatusCode::SEE_OTHER,
            [(header::LOCATION, location.clone())],
            Json(RedirectBody {
                location,
                flash: flash.as_ref(),
            }),
        )
            .into_response(),
    }
}

fn span(resource: &str, action: Action) -> tracing::Span {
    request_span(&uuid::Uuid::new_v4().to_string(), resource, action.as_str())
}

fn parse_body(headers: &HeaderMap, body: &[u8]) -> AdminResult<serde_json::Value> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if content_type.starts_with("application/json") {
        if body.is_empty() {
            return Ok(serde_json::Value::Object(serde_json::Map::new()));
        }
        return serde_json::from_slice(body)
            .map_err(|e| AdminError::BadRequest(format!("Invalid JSON body: {e}")));
    }
    let raw = std::str::from_utf8(body)
        .map_err(|_| AdminError::BadRequest("Form body is not valid UTF-8".to_string()))?;
    Ok(parse_nested(raw))
}

type HandlerResult = Result<axum::response::Response, ErrorResponse>;

// ── Handlers ───────────────────────────────────────────────────────

/// Handler for `GET /` - redirect to the first resource's index.
async fn handle_root(State(state): State<Arc<SiteState>>) -> HandlerResult {
    let entries = state.controller.registry().entries();
    let first = entries
        .iter()
        .find(|entry| entry.exposes(Action::Index))
        .ok_or_else(|| AdminError::NotFound("No resources are registered".to_string()))?;
    let target = format!("{}/{}", state.controller.settings().url_prefix(), first.route_key);
    Ok(Redirect::to(&target).into_response())
}

/// Handler for `GET /{resource}`.
async fn handle_index(
    State(state): State<Arc<SiteState>>,
    Path(resource): Path<String>,
    RawQuery(query): RawQuery,
) -> HandlerResult {
    let query = parse_nested(query.as_deref().unwrap_or_default());
    let response = state
        .controller
        .index(&resource, &query)
        .instrument(span(&resource, Action::Index))
        .await?;
    Ok(into_http(&response))
}

/// Handler for `GET /{resource}/new`.
async fn handle_new(
    State(state): State<Arc<SiteState>>,
    Path(resource): Path<String>,
) -> HandlerResult {
    let _guard = span(&resource, Action::New).entered();
    let response = state.controller.new_form(&resource)?;
    Ok(into_http(&response))
}

/// Handler for `POST /{resource}`.
async fn handle_create(
    State(state): State<Arc<SiteState>>,
    Path(resource): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> HandlerResult {
    let body = parse_body(&headers, &body)?;
    let response = state
        .controller
        .create(&resource, &body)
        .instrument(span(&resource, Action::Create))
        .await?;
    Ok(into_http(&response))
}

/// Handler for `GET /{resource}/{id}`.
async fn handle_show(
    State(state): State<Arc<SiteState>>,
    Path((resource, id)): Path<(String, String)>,
) -> HandlerResult {
    let response = state
        .controller
        .show(&resource, &id)
        .instrument(span(&resource, Action::Show))
        .await?;
    Ok(into_http(&response))
}

/// Handler for `GET /{resource}/{id}/edit`.
async fn handle_edit(
    State(state): State<Arc<SiteState>>,
    Path((resource, id)): Path<(String, String)>,
) -> HandlerResult {
    let response = state
        .controller
        .edit(&resource, &id)
        .instrument(span(&resource, Action::Edit))
        .await?;
    Ok(into_http(&response))
}

/// Handler for `PUT|PATCH|POST /{resource}/{id}`.
async fn handle_update(
    State(state): State<Arc<SiteState>>,
    Path((resource, id)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> HandlerResult {
    let body = parse_body(&headers, &body)?;
    let response = state
        .controller
        .update(&resource, &id, &body)
        .instrument(span(&resource, Action::Update))
        .await?;
    Ok(into_http(&response))
}

/// Handler for `DELETE /{resource}/{id}`.
async fn handle_destroy(
    State(state): State<Arc<SiteState>>,
    Path((resource, id)): Path<(String, String)>,
) -> HandlerResult {
    let response = state
        .controller
        .destroy(&resource, &id)
        .instrument(span(&resource, Action::Destroy))
        .await?;
    Ok(into_http(&response))
}
