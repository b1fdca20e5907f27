//! Repository for the `revoked_tokens` table (signed-out JWTs).

use haven_core::types::Timestamp;
use sqlx::PgPool;

/// Tracks access tokens invalidated before their natural expiry.
pub struct RevokedTokenRepo;

impl RevokedTokenRepo {
    /// Record a token id as revoked until `expires_at`. Idempotent.
    pub async fn revoke(pool: &PgPool, jti: &str, expires_at: Timestamp) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO revoked_tokens (jti, expires_at) VALUES ($1, $2) \
             ON CONFLICT (jti) DO NOTHING",
        )
        .bind(jti)
        .bind(expires_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Whether the token id has been revoked.
    pub async fn is_revoked(pool: &PgPool, jti: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM revoked_tokens WHERE jti = $1)")
            .bind(jti)
            .fetch_one(pool)
            .await
    }

    /// Drop entries whose tokens have expired anyway. Returns rows removed.
    pub async fn purge_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM revoked_tokens WHERE expires_at <= NOW()")
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
