//! Room Routes
//!
//! Read-only control endpoint for individual collaboration rooms.
//!
//! - GET /rooms/:room_id - Last-known session record for the room

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::directory::SessionRecord;

/// GET /rooms/:room_id
///
/// The room's last-known durable record, or 404 if nothing has been
/// recorded for it yet.
pub async fn get_room(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> ApiResult<Json<SessionRecord>> {
    let hub = state.rooms.room(&room_id).await;
    let record = hub.record().await?;

    record.map(Json).ok_or_else(|| {
        ApiError::NotFound(format!("No session recorded for room '{}'", room_id))
    })
}
