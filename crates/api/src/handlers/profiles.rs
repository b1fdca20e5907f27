//! Handlers for public profiles and follow relationships.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use haven_core::error::CoreError;
use haven_core::notify::NotificationEvent;
use haven_db::models::user::UserProfile;
use haven_db::repositories::{FollowRepo, UserRepo};
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::{AuthUser, MaybeAuthUser};
use crate::state::AppState;

async fn load_profile(state: &AppState, username: &str) -> AppResult<UserProfile> {
    UserRepo::find_profile(&state.pool, username)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound("User")))
}

/// GET /api/v1/profiles/{username}
///
/// `following` reports whether the caller follows this user; anonymous
/// callers always see `false`.
pub async fn get_profile(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let profile = load_profile(&state, &username).await?;
    let following = match viewer.user_id() {
        Some(viewer_id) => FollowRepo::is_following(&state.pool, viewer_id, profile.id).await?,
        None => false,
    };
    Ok(Json(json!({ "profile": profile, "following": following })))
}

/// POST /api/v1/profiles/{username}/follow
///
/// Following is idempotent; only a newly created follow notifies the
/// followed user.
pub async fn follow(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let profile = load_profile(&state, &username).await?;
    if profile.id == auth.user_id {
        return Err(AppError::BadRequest("You cannot follow yourself".into()));
    }

    let created = FollowRepo::follow(&state.pool, auth.user_id, profile.id).await?;
    if created {
        state
            .event_bus
            .publish(NotificationEvent::follow(auth.user_id, profile.id));
    }

    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((
        status,
        Json(json!({
            "message": format!("You are now following {}", profile.username),
            "profile": profile,
        })),
    ))
}

/// DELETE /api/v1/profiles/{username}/follow
pub async fn unfollow(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let profile = load_profile(&state, &username).await?;
    if !FollowRepo::unfollow(&state.pool, auth.user_id, profile.id).await? {
        return Err(AppError::BadRequest(format!(
            "You are not following {}",
            profile.username
        )));
    }
    Ok(Json(json!({
        "message": format!("You have unfollowed {}", profile.username),
        "profile": profile,
    })))
}

/// GET /api/v1/profiles/{username}/followers
pub async fn followers(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let profile = load_profile(&state, &username).await?;
    let followers = FollowRepo::list_followers(&state.pool, profile.id).await?;
    Ok(Json(json!({
        "followers": followers,
        "followers_count": followers.len(),
    })))
}

/// GET /api/v1/profiles/{username}/following
pub async fn following(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let profile = load_profile(&state, &username).await?;
    let following = FollowRepo::list_following(&state.pool, profile.id).await?;
    Ok(Json(json!({
        "following": following,
        "following_count": following.len(),
    })))
}
