//! Directory Routes
//!
//! Control endpoint for the singleton session directory.
//!
//! - GET    /directory - List every known session record
//! - POST   /directory - Apply one presence mutation
//! - DELETE /directory - Wipe the whole table
//!
//! Bodies that do not match the expected mutation shape are rejected
//! by the JSON extractor before they reach the directory.

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::SessionListResponse;
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::directory::DirectoryUpdate;

/// GET /directory
///
/// Every record currently in the store, stale rooms included.
pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<SessionListResponse>> {
    let sessions = state.directory.list().await?;
    Ok(Json(SessionListResponse { sessions }))
}

/// POST /directory
///
/// Apply one join/leave/changeTool/delete mutation, broadcast the
/// refreshed snapshot to subscribers, and return the updated list.
pub async fn update_session(
    State(state): State<Arc<AppState>>,
    Json(update): Json<DirectoryUpdate>,
) -> ApiResult<Json<SessionListResponse>> {
    tracing::debug!(room = %update.room_id(), "Directory mutation received");
    let sessions = state.directory.apply(update).await?;
    Ok(Json(SessionListResponse { sessions }))
}

/// DELETE /directory
///
/// Clear all records, broadcast an empty snapshot, return the empty
/// list.
pub async fn clear_sessions(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<SessionListResponse>> {
    let sessions = state.directory.clear().await?;
    tracing::info!("Directory cleared");
    Ok(Json(SessionListResponse { sessions }))
}
