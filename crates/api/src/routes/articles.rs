//! Route definitions for the `/articles` resource and its comments.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{articles, comments};
use crate::state::AppState;

/// Routes mounted at `/articles`.
///
/// ```text
/// GET    /                                         -> list_articles
/// POST   /                                         -> create_article (auth)
/// GET    /{slug}                                   -> get_article
/// PUT    /{slug}                                   -> update_article (author)
/// DELETE /{slug}                                   -> delete_article (author or admin)
/// POST   /vote/{slug}                              -> vote_article (auth)
/// POST   /{slug}/rate                              -> rate_article (auth)
///
/// POST   /{slug}/comments                          -> create_comment (auth)
/// PUT    /{slug}/comments/{comment_id}             -> edit_comment (comment author)
/// GET    /{slug}/comments/{comment_id}/history     -> comment_history
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(articles::list_articles).post(articles::create_article))
        .route(
            "/{slug}",
            get(articles::get_article)
                .put(articles::update_article)
                .delete(articles::delete_article),
        )
        .route("/vote/{slug}", post(articles::vote_article))
        .route("/{slug}/rate", post(articles::rate_article))
        // Comments
        .route("/{slug}/comments", post(comments::create_comment))
        .route("/{slug}/comments/{comment_id}", put(comments::edit_comment))
        .route(
            "/{slug}/comments/{comment_id}/history",
            get(comments::comment_history),
        )
}
