use axum::routing::{get, post};
use axum::Router;

use crate::handlers::profiles;
use crate::state::AppState;

/// Routes mounted at `/profiles`.
///
/// ```text
/// GET    /{username}             -> get_profile
/// POST   /{username}/follow      -> follow (auth)
/// DELETE /{username}/follow      -> unfollow (auth)
/// GET    /{username}/followers   -> followers
/// GET    /{username}/following   -> following
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{username}", get(profiles::get_profile))
        .route(
            "/{username}/follow",
            post(profiles::follow).delete(profiles::unfollow),
        )
        .route("/{username}/followers", get(profiles::followers))
        .route("/{username}/following", get(profiles::following))
}
