//! Role-based access control extractors.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use haven_core::error::CoreError;
use haven_core::roles::ROLE_ADMIN;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `admin` role. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(user): RequireAdmin) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_ADMIN {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin role required".into(),
            )));
        }
        Ok(RequireAdmin(user))
    }
}

/// Whether `user` may act on a resource owned by `owner_id`: the owner
/// or any admin.
pub fn is_owner_or_admin(user: &AuthUser, owner_id: haven_core::types::DbId) -> bool {
    user.user_id == owner_id || user.role == ROLE_ADMIN
}
