//! Comment, comment vote and comment history models.

use haven_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `comments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Comment {
    pub id: DbId,
    pub article_id: DbId,
    pub user_id: DbId,
    pub content: String,
    pub highlighted_text: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A comment as listed under an article: author, vote totals, and the
/// viewer's own vote when the request is authenticated.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CommentListing {
    pub id: DbId,
    pub article_id: DbId,
    pub content: String,
    pub highlighted_text: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub author_id: DbId,
    pub author_username: String,
    pub author_first_name: String,
    pub author_last_name: String,
    pub author_image: Option<String>,
    pub upvotes: i64,
    pub downvotes: i64,
    pub history_count: i64,
    /// `Some(true)` upvoted, `Some(false)` downvoted, `None` no vote or anonymous.
    pub user_vote: Option<bool>,
}

/// DTO for inserting a comment.
#[derive(Debug)]
pub struct CreateComment {
    pub article_id: DbId,
    pub user_id: DbId,
    pub content: String,
    pub highlighted_text: Option<String>,
}

/// A row from the `comment_votes` table (`status`: true = up).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CommentVote {
    pub id: DbId,
    pub comment_id: DbId,
    pub user_id: DbId,
    pub status: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the append-only `comment_histories` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CommentHistory {
    pub id: DbId,
    pub comment_id: DbId,
    pub content: String,
    pub created_at: Timestamp,
}
