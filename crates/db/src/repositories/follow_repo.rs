//! Repository for the `follows` table.

use haven_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::UserProfile;

/// Follower/followed relationships between users.
pub struct FollowRepo;

impl FollowRepo {
    /// Create the relationship. Returns `false` when it already existed.
    pub async fn follow(
        pool: &PgPool,
        follower_id: DbId,
        followed_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO follows (follower_id, followed_id) VALUES ($1, $2) \
             ON CONFLICT ON CONSTRAINT uq_follows_follower_followed DO NOTHING",
        )
        .bind(follower_id)
        .bind(followed_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove the relationship. Returns `true` if a row was deleted.
    pub async fn unfollow(
        pool: &PgPool,
        follower_id: DbId,
        followed_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND followed_id = $2")
                .bind(follower_id)
                .bind(followed_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn is_following(
        pool: &PgPool,
        follower_id: DbId,
        followed_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM follows WHERE follower_id = $1 AND followed_id = $2)",
        )
        .bind(follower_id)
        .bind(followed_id)
        .fetch_one(pool)
        .await
    }

    /// Users following `user_id`, most recent first.
    pub async fn list_followers(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<UserProfile>, sqlx::Error> {
        sqlx::query_as::<_, UserProfile>(
            "SELECT u.id, u.username, u.first_name, u.last_name, u.bio, u.image \
             FROM follows f JOIN users u ON u.id = f.follower_id \
             WHERE f.followed_id = $1 \
             ORDER BY f.created_at DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Users `user_id` follows, most recent first.
    pub async fn list_following(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<UserProfile>, sqlx::Error> {
        sqlx::query_as::<_, UserProfile>(
            "SELECT u.id, u.username, u.first_name, u.last_name, u.bio, u.image \
             FROM follows f JOIN users u ON u.id = f.followed_id \
             WHERE f.follower_id = $1 \
             ORDER BY f.created_at DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}
