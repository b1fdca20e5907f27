//! Repository for the `article_votes` table (likes and dislikes).

use haven_core::types::DbId;
use haven_core::voting::{VoteTally, VoteTransition};
use sqlx::PgPool;

use crate::models::article::ArticleVote;

const COLUMNS: &str = "id, article_id, user_id, status, created_at, updated_at";

/// Like/dislike storage driven by [`VoteTransition`].
pub struct ArticleVoteRepo;

impl ArticleVoteRepo {
    pub async fn find(
        pool: &PgPool,
        article_id: DbId,
        user_id: DbId,
    ) -> Result<Option<ArticleVote>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM article_votes WHERE article_id = $1 AND user_id = $2"
        );
        sqlx::query_as::<_, ArticleVote>(&query)
            .bind(article_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Resolve and apply the transition for `incoming` against the stored vote.
    ///
    /// Two concurrent first votes by the same user collide on
    /// `uq_article_votes_user_article`; the loser gets the unique violation.
    pub async fn toggle(
        pool: &PgPool,
        article_id: DbId,
        user_id: DbId,
        incoming: bool,
    ) -> Result<VoteTransition, sqlx::Error> {
        let current = Self::find(pool, article_id, user_id).await?;
        let transition = VoteTransition::resolve(current.as_ref().map(|v| v.status), incoming);

        match current {
            None => {
                sqlx::query(
                    "INSERT INTO article_votes (article_id, user_id, status) VALUES ($1, $2, $3)",
                )
                .bind(article_id)
                .bind(user_id)
                .bind(incoming)
                .execute(pool)
                .await?;
            }
            Some(vote) => match transition.resulting_status() {
                Some(status) => {
                    sqlx::query("UPDATE article_votes SET status = $2 WHERE id = $1")
                        .bind(vote.id)
                        .bind(status)
                        .execute(pool)
                        .await?;
                }
                None => {
                    sqlx::query("DELETE FROM article_votes WHERE id = $1")
                        .bind(vote.id)
                        .execute(pool)
                        .await?;
                }
            },
        }
        Ok(transition)
    }

    /// Current like (`upvotes`) and dislike (`downvotes`) totals.
    pub async fn tally(pool: &PgPool, article_id: DbId) -> Result<VoteTally, sqlx::Error> {
        let (upvotes, downvotes): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*) FILTER (WHERE status), COUNT(*) FILTER (WHERE NOT status) \
             FROM article_votes WHERE article_id = $1",
        )
        .bind(article_id)
        .fetch_one(pool)
        .await?;
        Ok(VoteTally { upvotes, downvotes })
    }
}
