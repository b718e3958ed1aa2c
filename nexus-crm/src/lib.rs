//! nexus-crm library - client-record management service
//!
//! Serves the browser UI and the REST API over the clients table, with the
//! synchronization engine and insight coordinator behind the handlers.

use std::sync::Arc;

use axum::Router;
use nexus_common::events::EventBus;

pub mod api;
pub mod engine;
pub mod insight;
pub mod store;
pub mod views;

pub use engine::SyncEngine;
pub use insight::InsightCoordinator;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Synchronization engine owning the authoritative client collection
    pub engine: Arc<SyncEngine>,
    /// Insight session coordinator
    pub insight: Arc<InsightCoordinator>,
    /// Event bus feeding the SSE stream
    pub events: Arc<EventBus>,
}

impl AppState {
    pub fn new(
        engine: Arc<SyncEngine>,
        insight: Arc<InsightCoordinator>,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            engine,
            insight,
            events,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post, put};
    use tower_http::trace::TraceLayer;

    Router::new()
        .route(
            "/api/clients",
            get(api::list_clients).post(api::create_client),
        )
        .route(
            "/api/clients/:id",
            put(api::update_client).delete(api::delete_client),
        )
        .route("/api/clients/:id/insight", post(api::select_insight))
        .route(
            "/api/insight",
            get(api::get_insight).delete(api::clear_insight),
        )
        .route("/api/stats", get(api::get_stats))
        .route("/api/reload", post(api::reload))
        .route("/api/events", get(api::event_stream))
        .route("/", get(api::serve_index))
        .route("/static/app.js", get(api::serve_app_js))
        .merge(api::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
