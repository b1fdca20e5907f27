//! Handlers for the caller's in-app notifications.

use axum::extract::{Path, State};
use axum::Json;
use haven_core::error::CoreError;
use haven_core::types::DbId;
use haven_db::repositories::NotificationRepo;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// GET /api/v1/users/notifications
///
/// Newest first, with the number still unseen.
pub async fn list_notifications(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<serde_json::Value>> {
    let notifications = NotificationRepo::list_for_receiver(&state.pool, auth.user_id).await?;
    let unseen = NotificationRepo::count_unseen(&state.pool, auth.user_id).await?;
    Ok(Json(json!({
        "notifications": notifications,
        "unseen_count": unseen,
    })))
}

/// PUT /api/v1/users/notifications/{id}
///
/// Mark one of the caller's notifications as seen. Notifications that
/// belong to someone else read as missing.
pub async fn mark_seen(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<serde_json::Value>> {
    let notification = NotificationRepo::mark_seen(&state.pool, id, auth.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::NotFound("Notification")))?;
    Ok(Json(json!({ "notification": notification })))
}
