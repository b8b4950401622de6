//! Repository for notification data access operations.

use crate::entities::{CreateNotificationRequest, Notification, NotificationKind};
use crate::types::{NotificationError, NotificationResult};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::info;

/// Repository for notification database operations
#[derive(Clone)]
pub struct NotificationRepository {
    pool: SqlitePool,
}

impl NotificationRepository {
    /// Create a new notification repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new notification
    pub async fn create(&self, request: &CreateNotificationRequest) -> NotificationResult<Notification> {
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO notifications (user_id, sender_id, message, kind, is_read, created_at)
             VALUES (?, ?, ?, ?, 0, ?)",
        )
        .bind(request.user_id)
        .bind(request.sender_id)
        .bind(&request.message)
        .bind(request.kind.as_str())
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| NotificationError::DatabaseError(e.to_string()))?;

        let notification_id = result.last_insert_rowid();

        info!(
            notification_id,
            user_id = request.user_id,
            kind = request.kind.as_str(),
            "created notification"
        );

        Ok(Notification {
            id: notification_id,
            user_id: request.user_id,
            sender_id: request.sender_id,
            message: request.message.clone(),
            kind: request.kind.clone(),
            is_read: false,
            created_at: now,
        })
    }

    /// Find notifications for a user, newest first
    pub async fn find_by_user_id(
        &self,
        user_id: i64,
        unread_only: bool,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> NotificationResult<Vec<Notification>> {
        let limit = limit.unwrap_or(50);
        let offset = offset.unwrap_or(0);

        let query = if unread_only {
            "SELECT id, user_id, sender_id, message, kind, is_read, created_at
             FROM notifications WHERE user_id = ? AND is_read = 0
             ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?"
        } else {
            "SELECT id, user_id, sender_id, message, kind, is_read, created_at
             FROM notifications WHERE user_id = ?
             ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?"
        };

        let rows = sqlx::query(query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| NotificationError::DatabaseError(e.to_string()))?;

        rows.iter().map(notification_from_row).collect()
    }

    /// Mark a notification read. The recipient scoping keeps users from
    /// touching each other's rows.
    pub async fn mark_read(&self, notification_id: i64, user_id: i64) -> NotificationResult<()> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = 1 WHERE id = ? AND user_id = ?",
        )
        .bind(notification_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| NotificationError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(NotificationError::NotificationNotFound);
        }

        Ok(())
    }
}

fn notification_from_row(row: &SqliteRow) -> NotificationResult<Notification> {
    let kind: String = row
        .try_get("kind")
        .map_err(|e| NotificationError::DatabaseError(e.to_string()))?;

    Ok(Notification {
        id: row
            .try_get("id")
            .map_err(|e| NotificationError::DatabaseError(e.to_string()))?,
        user_id: row
            .try_get("user_id")
            .map_err(|e| NotificationError::DatabaseError(e.to_string()))?,
        sender_id: row
            .try_get("sender_id")
            .map_err(|e| NotificationError::DatabaseError(e.to_string()))?,
        message: row
            .try_get("message")
            .map_err(|e| NotificationError::DatabaseError(e.to_string()))?,
        kind: NotificationKind::from(kind.as_str()),
        is_read: row
            .try_get("is_read")
            .map_err(|e| NotificationError::DatabaseError(e.to_string()))?,
        created_at: row
            .try_get("created_at")
            .map_err(|e| NotificationError::DatabaseError(e.to_string()))?,
    })
}
