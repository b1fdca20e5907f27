pub mod articles;
pub mod categories;
pub mod comments;
pub mod health;
pub mod profiles;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /users/...                                   accounts, opt-ins, notifications
/// /articles/...                                articles, votes, ratings, comments
/// /comments/vote/{comment_id}                  vote on a comment
/// /comments/{slug}                             list an article's comments
/// /profiles/{username}/...                     profiles and follows
/// /categories/...                              categories (mutations admin only)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/users", users::router())
        .nest("/articles", articles::router())
        .nest("/comments", comments::router())
        .nest("/profiles", profiles::router())
        .nest("/categories", categories::router())
}
