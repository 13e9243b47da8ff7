//! Presence lookups.

use axum::Json;
use axum::extract::{Path, State};

use socialhub_core::error::AppError;
use socialhub_core::types::UserId;

use crate::dto::response::{ApiResponse, OnlineUsersResponse, PresenceResponse};
use crate::error::ApiError;
use crate::extractors::auth::AuthUser;
use crate::state::AppState;

/// GET /api/presence/online
pub async fn online_users(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Json<ApiResponse<OnlineUsersResponse>> {
    let mut users = state.realtime.presence.online_users();
    users.sort();
    let count = users.len();
    Json(ApiResponse::ok(OnlineUsersResponse { users, count }))
}

/// GET /api/presence/{user_id}
///
/// The in-process tracker wins; users it has never seen are read from the
/// store.
pub async fn user_presence(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<PresenceResponse>>, ApiError> {
    let user_id = UserId::parse(user_id)?;

    if let Some(current) = state.realtime.presence.get(&user_id) {
        return Ok(Json(ApiResponse::ok(current.into())));
    }

    let stored = state
        .presence_store
        .load_presence(&user_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User '{user_id}' not found")))?;

    Ok(Json(ApiResponse::ok(stored.into())))
}
