//! Repository for the `comments` table.

use haven_core::types::DbId;
use sqlx::PgPool;

use crate::models::comment::{Comment, CommentListing, CreateComment};

const COLUMNS: &str = "id, article_id, user_id, content, highlighted_text, created_at, updated_at";

/// Provides CRUD operations for comments.
pub struct CommentRepo;

impl CommentRepo {
    pub async fn create(pool: &PgPool, input: &CreateComment) -> Result<Comment, sqlx::Error> {
        let query = format!(
            "INSERT INTO comments (article_id, user_id, content, highlighted_text) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(input.article_id)
            .bind(input.user_id)
            .bind(&input.content)
            .bind(&input.highlighted_text)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Comment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM comments WHERE id = $1");
        sqlx::query_as::<_, Comment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a comment only if it belongs to the given article.
    pub async fn find_in_article(
        pool: &PgPool,
        article_id: DbId,
        id: DbId,
    ) -> Result<Option<Comment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM comments WHERE id = $1 AND article_id = $2");
        sqlx::query_as::<_, Comment>(&query)
            .bind(id)
            .bind(article_id)
            .fetch_optional(pool)
            .await
    }

    /// Comments on an article, newest first.
    ///
    /// `viewer_id` drives a conditional join on `comment_votes` so each row
    /// carries the viewer's own vote; anonymous callers get `user_vote = NULL`.
    pub async fn list_for_article(
        pool: &PgPool,
        article_id: DbId,
        viewer_id: Option<DbId>,
    ) -> Result<Vec<CommentListing>, sqlx::Error> {
        sqlx::query_as::<_, CommentListing>(
            "SELECT c.id, c.article_id, c.content, c.highlighted_text, \
                    c.created_at, c.updated_at, \
                    u.id AS author_id, u.username AS author_username, \
                    u.first_name AS author_first_name, u.last_name AS author_last_name, \
                    u.image AS author_image, \
                    (SELECT COUNT(*) FROM comment_votes v \
                      WHERE v.comment_id = c.id AND v.status) AS upvotes, \
                    (SELECT COUNT(*) FROM comment_votes v \
                      WHERE v.comment_id = c.id AND NOT v.status) AS downvotes, \
                    (SELECT COUNT(*) FROM comment_histories h \
                      WHERE h.comment_id = c.id) AS history_count, \
                    mine.status AS user_vote \
             FROM comments c \
             JOIN users u ON u.id = c.user_id \
             LEFT JOIN comment_votes mine \
                    ON mine.comment_id = c.id AND mine.user_id = $2 \
             WHERE c.article_id = $1 \
             ORDER BY c.created_at DESC, c.id DESC",
        )
        .bind(article_id)
        .bind(viewer_id)
        .fetch_all(pool)
        .await
    }

    /// Snapshot the current content into `comment_histories`, then apply
    /// the new content. Both writes commit together.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn edit_with_history(
        pool: &PgPool,
        id: DbId,
        content: &str,
    ) -> Result<Option<Comment>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let snapshot = sqlx::query(
            "INSERT INTO comment_histories (comment_id, content) \
             SELECT id, content FROM comments WHERE id = $1",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if snapshot.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let query = format!("UPDATE comments SET content = $2 WHERE id = $1 RETURNING {COLUMNS}");
        let comment = sqlx::query_as::<_, Comment>(&query)
            .bind(id)
            .bind(content)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(comment))
    }
}
