//! Notification entity model and DTOs.

use haven_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `notifications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub sender_id: DbId,
    pub receiver_id: DbId,
    pub message: String,
    pub link: String,
    pub seen: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for one in-app notification record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub sender_id: DbId,
    pub receiver_id: DbId,
    pub message: String,
    pub link: String,
}
