//! Repository for the `notifications` table.

use haven_core::types::DbId;
use sqlx::PgPool;

use crate::models::notification::{NewNotification, Notification};

const COLUMNS: &str = "id, sender_id, receiver_id, message, link, seen, created_at, updated_at";

/// Provides insert and read operations for notifications.
pub struct NotificationRepo;

impl NotificationRepo {
    /// Insert many notifications in a single statement.
    ///
    /// Returns the number of rows written.
    pub async fn bulk_create(
        pool: &PgPool,
        records: &[NewNotification],
    ) -> Result<u64, sqlx::Error> {
        if records.is_empty() {
            return Ok(0);
        }

        let sender_ids: Vec<DbId> = records.iter().map(|r| r.sender_id).collect();
        let receiver_ids: Vec<DbId> = records.iter().map(|r| r.receiver_id).collect();
        let messages: Vec<String> = records.iter().map(|r| r.message.clone()).collect();
        let links: Vec<String> = records.iter().map(|r| r.link.clone()).collect();

        let result = sqlx::query(
            "INSERT INTO notifications (sender_id, receiver_id, message, link) \
             SELECT * FROM UNNEST($1::bigint[], $2::bigint[], $3::text[], $4::text[])",
        )
        .bind(&sender_ids)
        .bind(&receiver_ids)
        .bind(&messages)
        .bind(&links)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Notifications addressed to `receiver_id`, newest first.
    pub async fn list_for_receiver(
        pool: &PgPool,
        receiver_id: DbId,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notifications WHERE receiver_id = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(receiver_id)
            .fetch_all(pool)
            .await
    }

    /// Number of unread notifications for `receiver_id`.
    pub async fn count_unseen(pool: &PgPool, receiver_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE receiver_id = $1 AND NOT seen",
        )
        .bind(receiver_id)
        .fetch_one(pool)
        .await
    }

    /// Mark a notification seen on behalf of its receiver.
    ///
    /// `seen` only ever moves from false to true; an already-seen row is
    /// returned untouched. Returns `None` when the notification does not
    /// exist or belongs to another receiver.
    pub async fn mark_seen(
        pool: &PgPool,
        id: DbId,
        receiver_id: DbId,
    ) -> Result<Option<Notification>, sqlx::Error> {
        let query = format!(
            "UPDATE notifications SET seen = true \
             WHERE id = $1 AND receiver_id = $2 AND NOT seen \
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Notification>(&query)
            .bind(id)
            .bind(receiver_id)
            .fetch_optional(pool)
            .await?;
        if updated.is_some() {
            return Ok(updated);
        }

        let query =
            format!("SELECT {COLUMNS} FROM notifications WHERE id = $1 AND receiver_id = $2");
        sqlx::query_as::<_, Notification>(&query)
            .bind(id)
            .bind(receiver_id)
            .fetch_optional(pool)
            .await
    }
}
