use axum::routing::{get, post};
use axum::Router;

use crate::handlers::comments;
use crate::state::AppState;

/// Routes mounted at `/comments`.
///
/// ```text
/// POST   /vote/{comment_id}      -> vote_comment (auth)
/// GET    /{slug}                 -> list_comments (token optional)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/vote/{comment_id}", post(comments::vote_comment))
        .route("/{slug}", get(comments::list_comments))
}
