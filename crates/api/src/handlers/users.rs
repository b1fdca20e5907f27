//! Handlers for the `/users` resource: registration, activation, login,
//! sign-out, password reset, profile updates and notification opt-ins.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use haven_core::error::CoreError;
use haven_core::hashing::sha256_hex;
use haven_core::slug::generate_token;
use haven_db::models::user::{CreateUser, UpdateUser, User, UserResponse};
use haven_db::repositories::{RevokedTokenRepo, UserRepo};
use haven_events::{templates, OutgoingEmail};
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use super::rules;
use crate::auth::jwt::generate_access_token;
use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::state::AppState;

/// How long a password reset link stays valid.
const RESET_TOKEN_TTL_HOURS: i64 = 2;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /users/signup`.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(custom(function = "rules::letters_only", message = "First name must contain letters only"))]
    pub first_name: String,
    #[validate(custom(function = "rules::letters_only", message = "Last name must contain letters only"))]
    pub last_name: String,
    #[validate(custom(function = "rules::username"))]
    pub username: String,
    #[validate(email(message = "Email is invalid"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Request body for `POST /users/login`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Email is invalid"))]
    pub email: String,
    pub password: String,
}

/// Request body for `PUT /users`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(custom(function = "rules::username"))]
    pub username: Option<String>,
    #[validate(custom(function = "rules::letters_only", message = "First name must contain letters only"))]
    pub first_name: Option<String>,
    #[validate(custom(function = "rules::letters_only", message = "Last name must contain letters only"))]
    pub last_name: Option<String>,
    #[validate(length(max = 500, message = "Bio must be at most 500 characters"))]
    pub bio: Option<String>,
    #[validate(url(message = "Image must be a URL"))]
    pub image: Option<String>,
}

/// Request body for `POST /users/reset-password`.
#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(email(message = "Email is invalid"))]
    pub email: String,
}

/// Request body for `PUT /users/change-password`.
#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Query for `PUT /users/change-password`.
#[derive(Debug, Deserialize)]
pub struct ResetTokenQuery {
    pub reset_token: String,
}

/// User payload returned on login: the safe user fields plus the token.
#[derive(Debug, Serialize)]
pub struct LoggedInUser {
    #[serde(flatten)]
    pub user: UserResponse,
    pub token: String,
}

// ---------------------------------------------------------------------------
// Registration and activation
// ---------------------------------------------------------------------------

/// POST /api/v1/users/signup
///
/// Create a local account and mail its activation link. Duplicate email
/// or username is rejected by the unique constraints with 409.
pub async fn signup(
    State(state): State<AppState>,
    Json(input): Json<SignupRequest>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    input.validate()?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    let token = generate_token();

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            username: input.username,
            email: input.email.trim().to_lowercase(),
            password_hash: Some(password_hash),
            first_name: input.first_name,
            last_name: input.last_name,
            image: None,
            social: false,
            email_verification_token: Some(sha256_hex(token.as_bytes())),
        },
    )
    .await?;

    tracing::info!(user_id = user.id, username = %user.username, "User registered");

    let url = format!("{}/activate/{token}", state.config.app_url);
    send_account_email(
        &state,
        templates::activation(&user.email, &user.first_name, &url),
    )
    .await;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User Registration successful",
            "user": UserResponse::from(user),
        })),
    ))
}

/// GET /api/v1/users/activate/{token}
pub async fn activate(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let user = UserRepo::activate_by_token(&state.pool, &sha256_hex(token.as_bytes()))
        .await?
        .ok_or_else(|| AppError::BadRequest("Invalid activation Link".into()))?;

    tracing::info!(user_id = user.id, "Account activated");

    Ok(Json(json!({
        "message": "Activation successful, You can now login",
        "user": UserResponse::from(user),
    })))
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

/// POST /api/v1/users/login
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<serde_json::Value>> {
    input.validate()?;

    let invalid = || AppError::BadRequest("Invalid email or password".into());

    let user = UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or_else(invalid)?;

    // Social accounts have no local password.
    let hash = user.password_hash.as_deref().ok_or_else(invalid)?;
    let valid = verify_password(&input.password, hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !valid {
        return Err(invalid());
    }

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    let token = generate_access_token(user.id, &user.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(json!({
        "message": "User Login successful",
        "user": LoggedInUser {
            user: UserResponse::from(user),
            token,
        },
    })))
}

/// POST /api/v1/users/signout
///
/// Blacklist the presented token until it would have expired anyway.
pub async fn signout(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<serde_json::Value>> {
    RevokedTokenRepo::revoke(&state.pool, &auth.jti, auth.expires_at).await?;
    tracing::info!(user_id = auth.user_id, "User signed out");
    Ok(Json(json!({ "message": "Signed out successfully" })))
}

// ---------------------------------------------------------------------------
// Password reset
// ---------------------------------------------------------------------------

/// POST /api/v1/users/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    Json(input): Json<ResetPasswordRequest>,
) -> AppResult<Json<serde_json::Value>> {
    input.validate()?;

    let user = UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or_else(|| AppError::BadRequest("User does not exist".into()))?;

    let token = generate_token();
    let expires_at = Utc::now() + chrono::Duration::hours(RESET_TOKEN_TTL_HOURS);
    UserRepo::set_password_reset(&state.pool, user.id, &sha256_hex(token.as_bytes()), expires_at)
        .await?;

    let url = format!("{}/change-password?reset_token={token}", state.config.app_url);
    send_account_email(
        &state,
        templates::password_reset(&user.email, &user.first_name, &url),
    )
    .await;

    Ok(Json(json!({
        "message": "Password reset successful. Check your email for password reset link!",
    })))
}

/// PUT /api/v1/users/change-password?reset_token=...
pub async fn change_password(
    State(state): State<AppState>,
    Query(query): Query<ResetTokenQuery>,
    Json(input): Json<ChangePasswordRequest>,
) -> AppResult<Json<serde_json::Value>> {
    input.validate()?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::reset_password(
        &state.pool,
        &sha256_hex(query.reset_token.as_bytes()),
        &password_hash,
    )
    .await?
    .ok_or_else(|| AppError::Core(CoreError::Unauthorized("Invalid operation".into())))?;

    tracing::info!(user_id = user.id, "Password changed via reset link");

    Ok(Json(json!({ "message": "Password has successfully been changed." })))
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// GET /api/v1/users/me
pub async fn me(auth: AuthUser, State(state): State<AppState>) -> AppResult<Json<serde_json::Value>> {
    let user = load_user(&state, auth.user_id).await?;
    Ok(Json(json!({ "user": UserResponse::from(user) })))
}

/// PUT /api/v1/users
pub async fn update_profile(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<UpdateProfileRequest>,
) -> AppResult<Json<serde_json::Value>> {
    input.validate()?;

    let update = UpdateUser {
        username: input.username,
        first_name: input.first_name,
        last_name: input.last_name,
        bio: input.bio,
        image: input.image,
    };
    let user = UserRepo::update(&state.pool, auth.user_id, &update)
        .await?
        .ok_or(CoreError::NotFound("User"))?;

    Ok(Json(json!({
        "message": "User profile successfully updated",
        "user": UserResponse::from(user),
    })))
}

/// GET /api/v1/users?limit=&offset=
pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<serde_json::Value>> {
    let (limit, offset) = params.window();
    let users = UserRepo::list_profiles(&state.pool, limit, offset).await?;
    let users_count = UserRepo::count(&state.pool).await?;
    Ok(Json(json!({ "users": users, "users_count": users_count })))
}

// ---------------------------------------------------------------------------
// Notification opt-ins
// ---------------------------------------------------------------------------

/// PUT /api/v1/users/notifications/email
pub async fn toggle_email_notify(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<serde_json::Value>> {
    let user = UserRepo::toggle_email_notify(&state.pool, auth.user_id)
        .await?
        .ok_or(CoreError::NotFound("User"))?;
    tracing::debug!(user_id = user.id, email_notify = user.email_notify, "Email opt-in toggled");
    Ok(Json(json!({ "user": UserResponse::from(user) })))
}

/// PUT /api/v1/users/notifications/in-app
pub async fn toggle_in_app_notify(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<serde_json::Value>> {
    let user = UserRepo::toggle_in_app_notify(&state.pool, auth.user_id)
        .await?
        .ok_or(CoreError::NotFound("User"))?;
    tracing::debug!(user_id = user.id, in_app_notify = user.in_app_notify, "In-app opt-in toggled");
    Ok(Json(json!({ "user": UserResponse::from(user) })))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn load_user(state: &AppState, id: haven_core::types::DbId) -> AppResult<User> {
    UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound("User")))
}

/// Account emails are best effort: the account change has already been
/// committed, so a transport failure is logged rather than returned.
async fn send_account_email(state: &AppState, email: OutgoingEmail) {
    if let Err(e) = state.mailer.send(&email).await {
        tracing::error!(error = %e, subject = %email.subject, "Failed to send account email");
    }
}
