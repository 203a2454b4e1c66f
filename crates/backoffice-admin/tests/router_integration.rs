//! HTTP-level tests: the admin router served through `tower::ServiceExt`.

use std::sync::Arc;

use axum::body::Body;
use axum::Router;
use backoffice_admin::authorization::Action;
use backoffice_admin::dashboard::Dashboard;
use backoffice_admin::field::FieldType;
use backoffice_admin::model::Model;
use backoffice_admin::registry::ResourceEntry;
use backoffice_admin::site::AdminSite;
use backoffice_admin::store::InMemoryStore;
use backoffice_core::Settings;
use http::{header, Method, Request, StatusCode};
use http_body_util::BodyExt;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;

// ── Helpers ─────────────────────────────────────────────────────────

fn store() -> Arc<InMemoryStore> {
    let store = InMemoryStore::new("shop");
    store.register_model(
        Model::new("customer")
            .validates_presence_of("name")
            .restrict_dependent("order", "customer_id"),
    );
    Arc::new(store)
}

fn router_with(store: &Arc<InMemoryStore>, settings: Settings) -> Router {
    let mut site = AdminSite::new().settings(settings).backend(Arc::clone(store));
    site.register(ResourceEntry::new(
        Dashboard::new("customer")
            .attribute("id", FieldType::number())
            .attribute("name", FieldType::string())
            .attribute("created_on", FieldType::date())
            .title_attribute("name"),
    ))
    .unwrap();
    site.into_axum_router().unwrap()
}

fn router(store: &Arc<InMemoryStore>) -> Router {
    router_with(store, Settings::default())
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, http::HeaderMap, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_request(method: Method, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn form_request(method: Method, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// ═════════════════════════════════════════════════════════════════════
// Reads
// ═════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_index_renders_collection() {
    let store = store();
    store.create("customer", json!({"name": "Ada"})).await.unwrap();
    let app = router(&store);

    let (status, _, body) = send(&app, get("/admin/customers?search=ad&per_page=5")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["template"], "index");
    assert_eq!(body["status"], 200);
    assert_eq!(body["page"]["kind"], "collection");
    assert_eq!(body["page"]["search_term"], "ad");
    assert_eq!(body["page"]["pagination"]["per_page"], 5);
    assert_eq!(body["page"]["rows"][0]["title"], "Ada");
}

#[tokio::test]
async fn test_show_and_date_formatting() {
    let store = store();
    store
        .create("customer", json!({"name": "Ada", "created_on": "2024-03-05"}))
        .await
        .unwrap();
    let app = router(&store);

    let (status, _, body) = send(&app, get("/admin/customers/1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["template"], "show");
    let created = body["page"]["fields"]
        .as_array()
        .unwrap()
        .iter()
        .find(|f| f["attribute"] == "created_on")
        .unwrap()
        .clone();
    assert_eq!(created["formatted"], "2024-03-05");
    assert_eq!(created["partial"], "fields/date/show");
}

#[tokio::test]
async fn test_not_found_routes() {
    let store = store();
    let app = router(&store);

    let (status, _, body) = send(&app, get("/admin/customers/42")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("Couldn't find customer"));

    let (status, _, _) = send(&app, get("/admin/widgets")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_new_and_edit_forms() {
    let store = store();
    store.create("customer", json!({"name": "Ada"})).await.unwrap();
    let app = router(&store);

    let (status, _, body) = send(&app, get("/admin/customers/new")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["template"], "new");
    assert_eq!(body["page"]["action"], "create");

    let (status, _, body) = send(&app, get("/admin/customers/1/edit")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["template"], "edit");
    assert_eq!(body["page"]["submit_path"], "/admin/customers/1");
}

#[tokio::test]
async fn test_root_redirects_to_first_resource() {
    let store = store();
    let app = router(&store);
    let (status, headers, _) = send(&app, get("/admin")).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(headers[header::LOCATION], "/admin/customers");
}

// ═════════════════════════════════════════════════════════════════════
// Writes
// ═════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_create_json_redirects_with_flash() {
    let store = store();
    let app = router(&store);

    let req = json_request(
        Method::POST,
        "/admin/customers",
        &json!({"customer": {"name": "Ada"}}),
    );
    let (status, headers, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(headers[header::LOCATION], "/admin/customers/1");
    assert_eq!(body["location"], "/admin/customers/1");
    assert_eq!(body["flash"]["level"], "notice");
    assert_eq!(body["flash"]["message"], "Customer was successfully created.");
    assert_eq!(store.count("customer"), 1);
}

#[tokio::test]
async fn test_create_form_invalid_is_422() {
    let store = store();
    let app = router(&store);

    let req = form_request(Method::POST, "/admin/customers", "customer%5Bname%5D=");
    let (status, _, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["status"], 422);
    assert_eq!(body["page"]["errors"][0], "Name can't be blank");
    assert_eq!(store.count("customer"), 0);
}

#[tokio::test]
async fn test_malformed_json_is_400() {
    let store = store();
    let app = router(&store);
    let req = Request::builder()
        .method(Method::POST)
        .uri("/admin/customers")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_via_patch_put_and_post() {
    let store = store();
    store.create("customer", json!({"name": "Ada"})).await.unwrap();
    let app = router(&store);

    for (method, name) in [
        (Method::PATCH, "Ada L"),
        (Method::PUT, "Ada Lo"),
        (Method::POST, "Ada Lovelace"),
    ] {
        let req = json_request(
            method,
            "/admin/customers/1",
            &json!({"customer": {"name": name}}),
        );
        let (status, _, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(body["flash"]["message"], "Customer was successfully updated.");
    }
    assert_eq!(store.all("customer")[0].get("name"), Some(&json!("Ada Lovelace")));
}

#[tokio::test]
async fn test_destroy_success_and_restricted() {
    let store = store();
    store.create("customer", json!({"name": "Ada"})).await.unwrap();
    store.create("customer", json!({"name": "Grace"})).await.unwrap();
    store.create("order", json!({"customer_id": 2})).await.unwrap();
    let app = router(&store);

    let req = Request::builder()
        .method(Method::DELETE)
        .uri("/admin/customers/1")
        .body(Body::empty())
        .unwrap();
    let (status, headers, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(headers[header::LOCATION], "/admin/customers");
    assert_eq!(body["flash"]["message"], "Customer was successfully destroyed.");

    let req = Request::builder()
        .method(Method::DELETE)
        .uri("/admin/customers/2")
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(body["flash"]["level"], "error");
    assert_eq!(
        body["flash"]["message"],
        "Cannot delete record because dependent orders exist"
    );
    assert_eq!(store.count("customer"), 1);
}

#[tokio::test]
async fn test_empty_namespace_mounts_at_root() {
    let store = store();
    store.create("customer", json!({"name": "Ada"})).await.unwrap();
    let settings = Settings {
        namespace: String::new(),
        ..Settings::default()
    };
    let app = router_with(&store, settings);

    let (status, _, body) = send(&app, get("/customers")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page"]["rows"][0]["actions"][0]["path"], "/customers/1");
}

#[tokio::test]
async fn test_unexposed_actions_return_404() {
    let store = store();
    store.create("customer", json!({"name": "Ada"})).await.unwrap();
    let mut site = AdminSite::new().backend(Arc::clone(&store));
    site.register(
        ResourceEntry::new(Dashboard::new("customer").attribute("name", FieldType::string()))
            .actions(&[Action::Index, Action::Show]),
    )
    .unwrap();
    let app = site.into_axum_router().unwrap();

    let (status, _, _) = send(&app, get("/admin/customers/1")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = send(&app, get("/admin/customers/new")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let req = json_request(Method::POST, "/admin/customers", &json!({"customer": {"name": "Grace"}}));
    let (status, _, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let req = Request::builder()
        .method(Method::DELETE)
        .uri("/admin/customers/1")
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().is_some());
    assert_eq!(store.count("customer"), 1);
}
