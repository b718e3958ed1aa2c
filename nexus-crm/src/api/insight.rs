//! Insight session endpoints
//!
//! Selection is fire-and-forget: POST answers 202 immediately and the
//! narrative arrives later via the SSE stream / a session poll.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::insight::InsightSession;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct InsightErrorResponse {
    error: String,
}

/// POST /api/clients/:id/insight
///
/// Select a record for enrichment. The record must be present in the
/// authoritative collection.
pub async fn select_insight(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<InsightSession>), (StatusCode, Json<InsightErrorResponse>)> {
    let Some(client) = state.engine.find(id).await else {
        return Err((
            StatusCode::NOT_FOUND,
            Json(InsightErrorResponse {
                error: format!("Client not found: {}", id),
            }),
        ));
    };

    state.insight.select(client).await;

    Ok((StatusCode::ACCEPTED, Json(state.insight.snapshot().await)))
}

/// GET /api/insight
pub async fn get_insight(State(state): State<AppState>) -> Json<InsightSession> {
    Json(state.insight.snapshot().await)
}

/// DELETE /api/insight
pub async fn clear_insight(State(state): State<AppState>) -> Json<InsightSession> {
    state.insight.clear().await;
    Json(state.insight.snapshot().await)
}
