/// Notification model and database operations
///
/// Notifications are an append-only log: a row is written when a task is
/// assigned to a user at creation time, and the only mutation ever applied
/// is the recipient flagging it read. The recipient is fixed at creation
/// and is not re-synced if the task is later reassigned.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE notifications (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id),
///     message TEXT NOT NULL,
///     task_id UUID NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
///     read BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

/// Notification record
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Unique notification ID
    pub id: Uuid,

    /// Recipient; equals the task's assignee at the moment of creation
    pub user_id: Uuid,

    /// Human-readable message embedding task title and creator name
    pub message: String,

    /// The task this notification is about
    pub task_id: Uuid,

    /// Whether the recipient has marked it read
    pub read: bool,

    /// When the notification was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a notification
#[derive(Debug, Clone)]
pub struct CreateNotification {
    pub user_id: Uuid,
    pub message: String,
    pub task_id: Uuid,
}

impl Notification {
    /// Writes a durable notification row
    pub async fn create(pool: &PgPool, data: CreateNotification) -> Result<Self, sqlx::Error> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (user_id, message, task_id)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, message, task_id, read, created_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.message)
        .bind(data.task_id)
        .fetch_one(pool)
        .await?;

        Ok(notification)
    }

    /// Lists a user's notifications, newest first
    pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let notifications = sqlx::query_as::<_, Notification>(
            r#"
            SELECT id, user_id, message, task_id, read, created_at
            FROM notifications
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(notifications)
    }

    /// Marks a notification read
    ///
    /// Idempotent: marking an already-read notification returns the same
    /// `read = true` record rather than an error. Returns `None` if the id
    /// is unknown.
    pub async fn mark_read(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            UPDATE notifications
            SET read = TRUE
            WHERE id = $1
            RETURNING id, user_id, message, task_id, read, created_at
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(notification)
    }
}
