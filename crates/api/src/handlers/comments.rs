//! Handlers for article comments: posting, editing with history, votes
//! and listings.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use haven_core::error::CoreError;
use haven_core::notify::{ArticleAction, NotificationEvent};
use haven_core::types::DbId;
use haven_core::voting::VoteTarget;
use haven_db::models::comment::CreateComment;
use haven_db::repositories::{ArticleRepo, CommentHistoryRepo, CommentRepo, CommentVoteRepo};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use super::articles::{is_visible_to, load_visible};
use super::votes::{vote_response, vote_status, VoteResponse};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::{AuthUser, MaybeAuthUser};
use crate::query::PaginationParams;
use crate::state::AppState;

/// Request body for `POST /articles/{slug}/comments`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
    /// The passage of the article the comment refers to.
    #[serde(default, alias = "highlightedText")]
    pub highlighted_text: Option<String>,
}

/// Request body for `PUT /articles/{slug}/comments/{comment_id}`.
#[derive(Debug, Deserialize, Validate)]
pub struct EditCommentRequest {
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
}

fn comment_not_found() -> AppError {
    AppError::Core(CoreError::NotFound("Comment"))
}

/// POST /api/v1/articles/{slug}/comments
pub async fn create_comment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(input): Json<CreateCommentRequest>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    input.validate()?;
    let article = load_visible(&state, &slug, Some(auth.user_id)).await?;

    let comment = CommentRepo::create(
        &state.pool,
        &CreateComment {
            article_id: article.id,
            user_id: auth.user_id,
            content: input.content,
            highlighted_text: input.highlighted_text,
        },
    )
    .await?;

    state.event_bus.publish(NotificationEvent::reaction(
        auth.user_id,
        article.id,
        ArticleAction::Comment,
    ));

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Comment added successfully",
            "comment": comment,
        })),
    ))
}

/// PUT /api/v1/articles/{slug}/comments/{comment_id}
///
/// Only the comment's author may edit it; to anyone else the comment
/// reads as missing. The previous content is kept in the history log.
pub async fn edit_comment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((slug, comment_id)): Path<(String, DbId)>,
    Json(input): Json<EditCommentRequest>,
) -> AppResult<Json<serde_json::Value>> {
    input.validate()?;
    let article = load_visible(&state, &slug, Some(auth.user_id)).await?;

    let existing = CommentRepo::find_in_article(&state.pool, article.id, comment_id)
        .await?
        .filter(|c| c.user_id == auth.user_id)
        .ok_or_else(comment_not_found)?;

    let comment = CommentRepo::edit_with_history(&state.pool, existing.id, &input.content)
        .await?
        .ok_or_else(comment_not_found)?;

    tracing::debug!(comment_id = comment.id, "Comment edited");

    Ok(Json(json!({ "comment": comment })))
}

/// GET /api/v1/articles/{slug}/comments/{comment_id}/history?limit=&offset=
pub async fn comment_history(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path((slug, comment_id)): Path<(String, DbId)>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<serde_json::Value>> {
    let article = load_visible(&state, &slug, viewer.user_id()).await?;
    let comment = CommentRepo::find_in_article(&state.pool, article.id, comment_id)
        .await?
        .ok_or_else(comment_not_found)?;

    let (limit, offset) = params.window();
    let history = CommentHistoryRepo::list_for_comment(&state.pool, comment.id, limit, offset).await?;
    let count = CommentHistoryRepo::count_for_comment(&state.pool, comment.id).await?;

    Ok(Json(json!({
        "comment": comment,
        "comment_history": history,
        "comment_history_count": count,
    })))
}

/// POST /api/v1/comments/vote/{comment_id}
pub async fn vote_comment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(comment_id): Path<DbId>,
    Json(body): Json<serde_json::Value>,
) -> AppResult<(StatusCode, Json<VoteResponse>)> {
    let incoming = vote_status(&body)?;
    let comment = CommentRepo::find_by_id(&state.pool, comment_id)
        .await?
        .ok_or_else(comment_not_found)?;
    ArticleRepo::find_by_id(&state.pool, comment.article_id)
        .await?
        .filter(|a| is_visible_to(a, Some(auth.user_id)))
        .ok_or_else(comment_not_found)?;

    let transition = CommentVoteRepo::toggle(&state.pool, comment.id, auth.user_id, incoming).await?;
    let tally = CommentVoteRepo::tally(&state.pool, comment.id).await?;

    tracing::debug!(
        comment_id = comment.id,
        user_id = auth.user_id,
        ?transition,
        "Comment vote applied"
    );

    Ok(vote_response(transition, tally, VoteTarget::Comment))
}

/// GET /api/v1/comments/{slug}
///
/// Newest first. With a bearer token each comment also carries the
/// caller's own vote.
pub async fn list_comments(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let article = load_visible(&state, &slug, viewer.user_id()).await?;
    let comments = CommentRepo::list_for_article(&state.pool, article.id, viewer.user_id()).await?;
    Ok(Json(json!({
        "message": "Comments retrieved successfully",
        "comments": comments,
    })))
}
