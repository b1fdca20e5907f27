//! Repository for the `article_ratings` table.

use haven_core::types::DbId;
use sqlx::PgPool;

use crate::models::article::ArticleRating;

const COLUMNS: &str = "id, article_id, user_id, rate, created_at, updated_at";

/// Star ratings, one per (user, article); re-rating overwrites.
pub struct ArticleRatingRepo;

impl ArticleRatingRepo {
    /// Insert or overwrite the caller's rating.
    pub async fn upsert(
        pool: &PgPool,
        article_id: DbId,
        user_id: DbId,
        rate: i16,
    ) -> Result<ArticleRating, sqlx::Error> {
        let query = format!(
            "INSERT INTO article_ratings (article_id, user_id, rate) VALUES ($1, $2, $3) \
             ON CONFLICT ON CONSTRAINT uq_article_ratings_user_article \
             DO UPDATE SET rate = EXCLUDED.rate \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ArticleRating>(&query)
            .bind(article_id)
            .bind(user_id)
            .bind(rate)
            .fetch_one(pool)
            .await
    }

    /// Average rate and number of ratings for an article.
    pub async fn summary(
        pool: &PgPool,
        article_id: DbId,
    ) -> Result<(Option<f64>, i64), sqlx::Error> {
        sqlx::query_as(
            "SELECT AVG(rate)::DOUBLE PRECISION, COUNT(*) FROM article_ratings \
             WHERE article_id = $1",
        )
        .bind(article_id)
        .fetch_one(pool)
        .await
    }
}
