//! Message history handlers
//!
//! Pages are returned oldest-first with each sender resolved.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chat_core::UserId;
use chat_service::dto::{HistoryParams, MessageResponse};
use chat_service::HistoryService;

use crate::extractors::AuthUser;
use crate::response::{ApiError, ApiResult};
use crate::state::AppState;

/// Room history
///
/// GET /api/messages/room/:room
pub async fn room_history(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(room): Path<String>,
    Query(params): Query<HistoryParams>,
) -> ApiResult<Json<Vec<MessageResponse>>> {
    let service = HistoryService::new(state.service_context());
    let messages = service.room(&room, params).await?;
    Ok(Json(messages))
}

/// Private conversation between the caller and another user
///
/// GET /api/messages/private/:other_user_id
pub async fn private_history(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(other_user_id): Path<String>,
    Query(params): Query<HistoryParams>,
) -> ApiResult<Json<Vec<MessageResponse>>> {
    let other = UserId::parse(&other_user_id)
        .map_err(|_| ApiError::invalid_path(format!("Invalid user id: {other_user_id}")))?;

    let service = HistoryService::new(state.service_context());
    let messages = service.private(auth.user_id, other, params).await?;
    Ok(Json(messages))
}
