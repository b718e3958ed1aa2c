//! Client CRUD and view endpoints
//!
//! Handlers stay thin: validation at the boundary, then the engine. Every
//! mutation failure comes back as a discrete JSON error for the UI to show
//! as a dismissable notification; the authoritative collection is never
//! partially mutated.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use nexus_common::db::models::{Client, ClientFields, Connectivity, CrmStats};
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use crate::store::TransportError;
use crate::{views, AppState};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// Case-insensitive substring filter on name, company, or email
    #[serde(default)]
    search: String,
}

#[derive(Debug, Serialize)]
pub struct ClientListResponse {
    clients: Vec<Client>,
    connectivity: Connectivity,
    loading: bool,
}

#[derive(Debug, Serialize)]
pub struct CreateResponse {
    id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    status: String,
}

#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    status: String,
    connectivity: Connectivity,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error_response(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// Map a store failure onto an HTTP response
fn transport_response(e: TransportError) -> ApiError {
    error!("Record store operation failed: {}", e);
    let status = match &e {
        TransportError::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::BAD_GATEWAY,
    };
    error_response(status, e.to_string())
}

/// Minimal form validation; everything else is free text by design
fn validate(fields: &ClientFields) -> Result<(), ApiError> {
    if fields.name.trim().is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "Client name must not be empty",
        ));
    }
    if !fields.email.contains('@') {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "Client email must contain '@'",
        ));
    }
    Ok(())
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/clients?search=
///
/// Filtered view of the authoritative collection, plus the connectivity
/// and loading flags the UI needs to render its chrome.
pub async fn list_clients(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Json<ClientListResponse> {
    let snapshot = state.engine.snapshot().await;
    let clients = views::filtered(&snapshot, &params.search);

    Json(ClientListResponse {
        clients,
        connectivity: state.engine.connectivity().await,
        loading: state.engine.is_loading(),
    })
}

/// GET /api/stats
pub async fn get_stats(State(state): State<AppState>) -> Json<CrmStats> {
    let snapshot = state.engine.snapshot().await;
    Json(views::stats(&snapshot))
}

/// POST /api/clients
pub async fn create_client(
    State(state): State<AppState>,
    Json(fields): Json<ClientFields>,
) -> Result<(StatusCode, Json<CreateResponse>), ApiError> {
    validate(&fields)?;

    let id = state
        .engine
        .create(fields)
        .await
        .map_err(transport_response)?;

    Ok((StatusCode::CREATED, Json(CreateResponse { id })))
}

/// PUT /api/clients/:id
pub async fn update_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(fields): Json<ClientFields>,
) -> Result<Json<StatusResponse>, ApiError> {
    validate(&fields)?;

    state
        .engine
        .update(id, fields)
        .await
        .map_err(transport_response)?;

    Ok(Json(StatusResponse {
        status: "updated".to_string(),
    }))
}

/// DELETE /api/clients/:id
pub async fn delete_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StatusResponse>, ApiError> {
    state.engine.delete(id).await.map_err(transport_response)?;

    Ok(Json(StatusResponse {
        status: "deleted".to_string(),
    }))
}

/// POST /api/reload
///
/// Manual refresh, equivalent to the engine's own post-mutation reload.
/// Never fails: a failed reload is reflected in the connectivity field.
pub async fn reload(State(state): State<AppState>) -> Json<ReloadResponse> {
    state.engine.load().await;

    Json(ReloadResponse {
        status: "reloaded".to_string(),
        connectivity: state.engine.connectivity().await,
    })
}
