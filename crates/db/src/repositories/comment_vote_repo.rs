//! Repository for the `comment_votes` table.

use haven_core::types::DbId;
use haven_core::voting::{VoteTally, VoteTransition};
use sqlx::PgPool;

use crate::models::comment::CommentVote;

const COLUMNS: &str = "id, comment_id, user_id, status, created_at, updated_at";

/// Up/down vote storage driven by [`VoteTransition`].
pub struct CommentVoteRepo;

impl CommentVoteRepo {
    pub async fn find(
        pool: &PgPool,
        comment_id: DbId,
        user_id: DbId,
    ) -> Result<Option<CommentVote>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM comment_votes WHERE comment_id = $1 AND user_id = $2"
        );
        sqlx::query_as::<_, CommentVote>(&query)
            .bind(comment_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Resolve and apply the transition for `incoming` against the stored vote.
    pub async fn toggle(
        pool: &PgPool,
        comment_id: DbId,
        user_id: DbId,
        incoming: bool,
    ) -> Result<VoteTransition, sqlx::Error> {
        let current = Self::find(pool, comment_id, user_id).await?;
        let transition = VoteTransition::resolve(current.as_ref().map(|v| v.status), incoming);

        match current {
            None => {
                sqlx::query(
                    "INSERT INTO comment_votes (comment_id, user_id, status) VALUES ($1, $2, $3)",
                )
                .bind(comment_id)
                .bind(user_id)
                .bind(incoming)
                .execute(pool)
                .await?;
            }
            Some(vote) => match transition.resulting_status() {
                Some(status) => {
                    sqlx::query("UPDATE comment_votes SET status = $2 WHERE id = $1")
                        .bind(vote.id)
                        .bind(status)
                        .execute(pool)
                        .await?;
                }
                None => {
                    sqlx::query("DELETE FROM comment_votes WHERE id = $1")
                        .bind(vote.id)
                        .execute(pool)
                        .await?;
                }
            },
        }
        Ok(transition)
    }

    pub async fn tally(pool: &PgPool, comment_id: DbId) -> Result<VoteTally, sqlx::Error> {
        let (upvotes, downvotes): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*) FILTER (WHERE status), COUNT(*) FILTER (WHERE NOT status) \
             FROM comment_votes WHERE comment_id = $1",
        )
        .bind(comment_id)
        .fetch_one(pool)
        .await?;
        Ok(VoteTally { upvotes, downvotes })
    }
}
