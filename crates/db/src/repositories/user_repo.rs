//! Repository for the `users` table.

use haven_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::user::{CreateUser, UpdateUser, User, UserProfile};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, username, email, password_hash, first_name, last_name, bio, image, \
                       role, social, activated, is_active, email_verification_token, \
                       password_reset_token, password_reset_expires_at, email_notify, \
                       in_app_notify, created_at, updated_at";

/// Public profile columns.
const PROFILE_COLUMNS: &str = "id, username, first_name, last_name, bio, image";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users \
                (username, email, password_hash, first_name, last_name, image, social, \
                 email_verification_token) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.username)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.image)
            .bind(input.social)
            .bind(&input.email_verification_token)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email (case-insensitive).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE lower(email) = lower($1)");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Update a user's profile. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateUser,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                username = COALESCE($2, username),
                first_name = COALESCE($3, first_name),
                last_name = COALESCE($4, last_name),
                bio = COALESCE($5, bio),
                image = COALESCE($6, image)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.username)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.bio)
            .bind(&input.image)
            .fetch_optional(pool)
            .await
    }

    /// Activate the not-yet-activated account holding this verification
    /// token digest, consuming the token.
    pub async fn activate_by_token(
        pool: &PgPool,
        token_hash: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET activated = true, email_verification_token = NULL \
             WHERE email_verification_token = $1 AND activated = false \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(token_hash)
            .fetch_optional(pool)
            .await
    }

    /// Store a password reset token digest and its expiry.
    pub async fn set_password_reset(
        pool: &PgPool,
        id: DbId,
        token_hash: &str,
        expires_at: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET password_reset_token = $2, password_reset_expires_at = $3 \
             WHERE id = $1",
        )
        .bind(id)
        .bind(token_hash)
        .bind(expires_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Replace the password of the user holding an unexpired reset token
    /// digest, consuming the token.
    ///
    /// Returns `None` when the token is unknown or expired.
    pub async fn reset_password(
        pool: &PgPool,
        token_hash: &str,
        password_hash: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET password_hash = $2, password_reset_token = NULL, \
                 password_reset_expires_at = NULL \
             WHERE password_reset_token = $1 AND password_reset_expires_at > NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(token_hash)
            .bind(password_hash)
            .fetch_optional(pool)
            .await
    }

    /// Flip the email notification opt-in flag.
    pub async fn toggle_email_notify(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET email_notify = NOT email_notify WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Flip the in-app notification opt-in flag.
    pub async fn toggle_in_app_notify(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET in_app_notify = NOT in_app_notify WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Page through public profiles, oldest account first.
    pub async fn list_profiles(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<UserProfile>, sqlx::Error> {
        let query = format!(
            "SELECT {PROFILE_COLUMNS} FROM users ORDER BY id LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, UserProfile>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Total number of users.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await
    }

    /// Public profile of a user by username.
    pub async fn find_profile(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<UserProfile>, sqlx::Error> {
        let query = format!("SELECT {PROFILE_COLUMNS} FROM users WHERE username = $1");
        sqlx::query_as::<_, UserProfile>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// IDs of every user opted in to in-app notifications.
    pub async fn list_in_app_recipient_ids(pool: &PgPool) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT id FROM users WHERE in_app_notify ORDER BY id")
            .fetch_all(pool)
            .await
    }

    /// Addresses of every user opted in to email notifications.
    pub async fn list_email_recipient_addresses(
        pool: &PgPool,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT email FROM users WHERE email_notify ORDER BY id")
            .fetch_all(pool)
            .await
    }
}
