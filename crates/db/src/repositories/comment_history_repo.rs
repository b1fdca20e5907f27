//! Read access to the append-only `comment_histories` table.
//!
//! Rows are written only by [`CommentRepo::edit_with_history`].
//!
//! [`CommentRepo::edit_with_history`]: super::CommentRepo::edit_with_history

use haven_core::types::DbId;
use sqlx::PgPool;

use crate::models::comment::CommentHistory;

const COLUMNS: &str = "id, comment_id, content, created_at";

pub struct CommentHistoryRepo;

impl CommentHistoryRepo {
    /// Previous versions of a comment, most recent first.
    pub async fn list_for_comment(
        pool: &PgPool,
        comment_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CommentHistory>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM comment_histories WHERE comment_id = $1 \
             ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, CommentHistory>(&query)
            .bind(comment_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count_for_comment(pool: &PgPool, comment_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM comment_histories WHERE comment_id = $1")
            .bind(comment_id)
            .fetch_one(pool)
            .await
    }
}
