//! Integration tests for nexus-crm API endpoints
//!
//! Drives the full router against an in-memory SQLite store and a canned
//! insight provider, covering the CRUD envelope shapes, search filtering,
//! derived statistics, the insight session cycle, and error responses.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use nexus_common::db::init::init_memory_database;
use nexus_common::db::models::Client;
use nexus_common::events::EventBus;
use nexus_crm::insight::{InsightCoordinator, InsightProvider, ProviderError};
use nexus_crm::store::SqliteRecordStore;
use nexus_crm::{build_router, AppState, SyncEngine};
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot` method

/// Provider with a fixed narrative, so tests never touch the network
struct StaticProvider;

#[async_trait]
impl InsightProvider for StaticProvider {
    async fn summarize(&self, client: &Client) -> Result<String, ProviderError> {
        Ok(format!("Summary for {}", client.name))
    }
}

/// Test helper: build the full app over an in-memory database
async fn setup_app() -> axum::Router {
    let pool = init_memory_database().await.expect("in-memory db");
    let events = Arc::new(EventBus::new(100));
    let store = Arc::new(SqliteRecordStore::new(pool));
    let insight = Arc::new(InsightCoordinator::new(
        Arc::new(StaticProvider),
        events.clone(),
    ));
    let engine = Arc::new(SyncEngine::new(store, insight.clone(), events.clone()));

    // Initial synchronization puts the engine online
    engine.load().await;

    build_router(AppState::new(engine, insight, events))
}

/// Test helper: request without a body
fn test_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Test helper: request with a JSON body
fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

/// Test helper: extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

fn client_fields(name: &str, email: &str, company: &str, status: &str) -> Value {
    json!({
        "name": name,
        "email": email,
        "phone": "+55 11 99999-0000",
        "company": company,
        "status": status,
        "notes": ""
    })
}

/// Create a client through the API, returning its id
async fn create_client(app: &axum::Router, fields: &Value) -> String {
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/clients", fields))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = extract_json(response.into_body()).await;
    body["id"].as_str().expect("create returns id").to_string()
}

// =============================================================================
// Health Endpoint
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_app().await;

    let response = app.oneshot(test_request("GET", "/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "nexus-crm");
    assert!(body["version"].is_string());
}

// =============================================================================
// Client Listing and Search
// =============================================================================

#[tokio::test]
async fn test_empty_list_envelope() {
    let app = setup_app().await;

    let response = app.oneshot(test_request("GET", "/api/clients")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["clients"].as_array().unwrap().len(), 0);
    assert_eq!(body["connectivity"], "online");
    assert_eq!(body["loading"], false);
}

#[tokio::test]
async fn test_create_then_list() {
    let app = setup_app().await;

    let id = create_client(
        &app,
        &client_fields("Ana Silva", "ana@acme.com", "Acme Corp", "Active"),
    )
    .await;

    let response = app.oneshot(test_request("GET", "/api/clients")).await.unwrap();
    let body = extract_json(response.into_body()).await;

    let clients = body["clients"].as_array().unwrap();
    assert_eq!(clients.len(), 1);
    assert_eq!(clients[0]["id"], id.as_str());
    assert_eq!(clients[0]["name"], "Ana Silva");
    assert_eq!(clients[0]["status"], "Active");
    assert!(clients[0]["createdAt"].is_string());
}

#[tokio::test]
async fn test_list_orders_newest_first() {
    let app = setup_app().await;

    create_client(&app, &client_fields("First", "a@x.com", "One", "Active")).await;
    tokio::time::sleep(Duration::from_millis(5)).await;
    create_client(&app, &client_fields("Second", "b@x.com", "Two", "Active")).await;
    tokio::time::sleep(Duration::from_millis(5)).await;
    create_client(&app, &client_fields("Third", "c@x.com", "Three", "Active")).await;

    let response = app.oneshot(test_request("GET", "/api/clients")).await.unwrap();
    let body = extract_json(response.into_body()).await;

    let names: Vec<&str> = body["clients"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Third", "Second", "First"]);
}

#[tokio::test]
async fn test_search_matches_company_case_insensitively() {
    let app = setup_app().await;

    create_client(&app, &client_fields("Ana", "ana@acme.com", "Acme Corp", "Active")).await;
    create_client(&app, &client_fields("Bruno", "bruno@other.io", "Other", "Prospect")).await;

    let response = app
        .clone()
        .oneshot(test_request("GET", "/api/clients?search=acme"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    let clients = body["clients"].as_array().unwrap();
    assert_eq!(clients.len(), 1);
    assert_eq!(clients[0]["name"], "Ana");

    // No match
    let response = app
        .oneshot(test_request("GET", "/api/clients?search=globex"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["clients"].as_array().unwrap().len(), 0);
}

// =============================================================================
// Statistics
// =============================================================================

#[tokio::test]
async fn test_stats_scenario() {
    let app = setup_app().await;

    create_client(&app, &client_fields("A", "a@x.com", "X", "Active")).await;
    create_client(&app, &client_fields("B", "b@x.com", "Y", "Prospect")).await;
    create_client(&app, &client_fields("C", "c@x.com", "Z", "Active")).await;

    let response = app.oneshot(test_request("GET", "/api/stats")).await.unwrap();
    let body = extract_json(response.into_body()).await;

    assert_eq!(body["totalClients"], 3);
    assert_eq!(body["activeClients"], 2);
    assert_eq!(body["prospects"], 1);
    assert_eq!(body["recentActivity"], 3);
}

#[tokio::test]
async fn test_stats_recent_activity_below_cap() {
    let app = setup_app().await;

    create_client(&app, &client_fields("A", "a@x.com", "X", "Inactive")).await;

    let response = app.oneshot(test_request("GET", "/api/stats")).await.unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["totalClients"], 1);
    assert_eq!(body["recentActivity"], 1);
}

// =============================================================================
// Validation and Error Responses
// =============================================================================

#[tokio::test]
async fn test_create_rejects_empty_name() {
    let app = setup_app().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/clients",
            &client_fields("   ", "a@x.com", "X", "Active"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().contains("name"));
}

#[tokio::test]
async fn test_create_rejects_invalid_email() {
    let app = setup_app().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/clients",
            &client_fields("Ana", "not-an-email", "X", "Active"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().contains("email"));
}

#[tokio::test]
async fn test_update_unknown_id_is_404() {
    let app = setup_app().await;

    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/clients/00000000-0000-0000-0000-000000000001",
            &client_fields("Ghost", "g@x.com", "X", "Active"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = extract_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn test_delete_unknown_id_is_404() {
    let app = setup_app().await;

    let response = app
        .oneshot(test_request(
            "DELETE",
            "/api/clients/00000000-0000-0000-0000-000000000001",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Update and Delete
// =============================================================================

#[tokio::test]
async fn test_update_replaces_fields() {
    let app = setup_app().await;
    let id = create_client(&app, &client_fields("Ana", "ana@acme.com", "Acme Corp", "Prospect")).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/clients/{}", id),
            &client_fields("Ana", "ana@acme.com", "Acme Corp", "Active"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(test_request("GET", "/api/clients")).await.unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["clients"][0]["status"], "Active");
}

#[tokio::test]
async fn test_delete_removes_client() {
    let app = setup_app().await;
    let id = create_client(&app, &client_fields("Ana", "ana@acme.com", "Acme", "Active")).await;

    let response = app
        .clone()
        .oneshot(test_request("DELETE", &format!("/api/clients/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(test_request("GET", "/api/clients")).await.unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["clients"].as_array().unwrap().len(), 0);
}

// =============================================================================
// Reload
// =============================================================================

#[tokio::test]
async fn test_manual_reload() {
    let app = setup_app().await;

    let response = app
        .oneshot(test_request("POST", "/api/reload"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "reloaded");
    assert_eq!(body["connectivity"], "online");
}

// =============================================================================
// Insight Session
// =============================================================================

/// Poll the session endpoint until the narrative arrives
async fn wait_for_narrative(app: &axum::Router) -> Value {
    for _ in 0..100 {
        let response = app
            .clone()
            .oneshot(test_request("GET", "/api/insight"))
            .await
            .unwrap();
        let body = extract_json(response.into_body()).await;
        if body["loading"] == false && !body["narrative"].is_null() {
            return body;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("insight session never resolved");
}

#[tokio::test]
async fn test_insight_select_unknown_id_is_404() {
    let app = setup_app().await;

    let response = app
        .oneshot(test_request(
            "POST",
            "/api/clients/00000000-0000-0000-0000-000000000001/insight",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_insight_cycle() {
    let app = setup_app().await;
    let id = create_client(&app, &client_fields("Ana", "ana@acme.com", "Acme", "Active")).await;

    // Select: accepted, session targets the record
    let response = app
        .clone()
        .oneshot(test_request("POST", &format!("/api/clients/{}/insight", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["target"]["id"], id.as_str());

    // Narrative arrives asynchronously
    let session = wait_for_narrative(&app).await;
    assert_eq!(session["narrative"], "Summary for Ana");

    // Clear: back to idle
    let response = app
        .clone()
        .oneshot(test_request("DELETE", "/api/insight"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert!(body["target"].is_null());
    assert!(body["narrative"].is_null());
    assert_eq!(body["loading"], false);
}

#[tokio::test]
async fn test_delete_of_insight_target_resets_session() {
    let app = setup_app().await;
    let id = create_client(&app, &client_fields("Ana", "ana@acme.com", "Acme", "Active")).await;

    app.clone()
        .oneshot(test_request("POST", &format!("/api/clients/{}/insight", id)))
        .await
        .unwrap();
    wait_for_narrative(&app).await;

    app.clone()
        .oneshot(test_request("DELETE", &format!("/api/clients/{}", id)))
        .await
        .unwrap();

    let response = app
        .oneshot(test_request("GET", "/api/insight"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert!(body["target"].is_null());
    assert_eq!(body["loading"], false);
}

// =============================================================================
// UI Serving
// =============================================================================

#[tokio::test]
async fn test_index_page_served() {
    let app = setup_app().await;

    let response = app.oneshot(test_request("GET", "/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("Nexus CRM"));
}

#[tokio::test]
async fn test_app_js_served() {
    let app = setup_app().await;

    let response = app
        .oneshot(test_request("GET", "/static/app.js"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "application/javascript"
    );
}
