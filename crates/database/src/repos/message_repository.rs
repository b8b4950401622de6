//! Repository for message data access operations.

use crate::entities::{ChatMessage, CreateMessageRequest};
use crate::types::{ChatError, ChatResult};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::info;

/// Repository for message database operations
#[derive(Clone)]
pub struct MessageRepository {
    pool: SqlitePool,
}

impl MessageRepository {
    /// Create a new message repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find messages for a chat ordered by recency, excluding deleted rows
    pub async fn find_by_chat_id(
        &self,
        chat_id: i64,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> ChatResult<Vec<ChatMessage>> {
        let limit = limit.unwrap_or(50);
        let offset = offset.unwrap_or(0);

        let rows = sqlx::query(
            "SELECT id, chat_id, sender_id, content, media, is_edited, is_deleted, created_at, updated_at
             FROM messages WHERE chat_id = ? AND is_deleted = 0
             ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        )
        .bind(chat_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        rows.iter().map(message_from_row).collect()
    }

    /// Find a message by its ID
    pub async fn find_by_id(&self, message_id: i64) -> ChatResult<Option<ChatMessage>> {
        let row = sqlx::query(
            "SELECT id, chat_id, sender_id, content, media, is_edited, is_deleted, created_at, updated_at
             FROM messages WHERE id = ?",
        )
        .bind(message_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        row.as_ref().map(message_from_row).transpose()
    }

    /// Create a new message
    pub async fn create(&self, sender_id: i64, request: &CreateMessageRequest) -> ChatResult<ChatMessage> {
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO messages (chat_id, sender_id, content, media, is_edited, is_deleted, created_at, updated_at)
             VALUES (?, ?, ?, ?, 0, 0, ?, ?)",
        )
        .bind(request.chat_id)
        .bind(sender_id)
        .bind(&request.content)
        .bind(&request.media)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        let message_id = result.last_insert_rowid();

        info!(message_id, chat_id = request.chat_id, sender_id, "created new message");

        Ok(ChatMessage {
            id: message_id,
            chat_id: request.chat_id,
            sender_id,
            content: request.content.clone(),
            media: request.media.clone(),
            edited: false,
            deleted: false,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Replace a message's content and mark it edited.
    ///
    /// Only the original sender may edit; deleted messages are out of reach.
    pub async fn update_content(
        &self,
        message_id: i64,
        acting_user_id: i64,
        new_content: &str,
    ) -> ChatResult<ChatMessage> {
        let Some(message) = self.find_by_id(message_id).await? else {
            return Err(ChatError::MessageNotFound);
        };

        if message.deleted {
            return Err(ChatError::MessageNotFound);
        }

        if message.sender_id != acting_user_id {
            return Err(ChatError::OwnershipViolation);
        }

        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            "UPDATE messages SET content = ?, is_edited = 1, updated_at = ? WHERE id = ?",
        )
        .bind(new_content)
        .bind(&now)
        .bind(message_id)
        .execute(&self.pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        info!(message_id, acting_user_id, "updated message content");

        Ok(ChatMessage {
            content: Some(new_content.to_string()),
            edited: true,
            updated_at: now,
            ..message
        })
    }

    /// Soft-delete a message.
    ///
    /// Returns `true` when this call performed the deletion. A missing or
    /// already-deleted target is a no-op success (`false`); a non-sender
    /// acting on a live message is an ownership violation.
    pub async fn mark_deleted(&self, message_id: i64, acting_user_id: i64) -> ChatResult<bool> {
        let Some(message) = self.find_by_id(message_id).await? else {
            return Ok(false);
        };

        if message.deleted {
            return Ok(false);
        }

        if message.sender_id != acting_user_id {
            return Err(ChatError::OwnershipViolation);
        }

        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query("UPDATE messages SET is_deleted = 1, updated_at = ? WHERE id = ?")
            .bind(&now)
            .bind(message_id)
            .execute(&self.pool)
            .await
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        info!(message_id, acting_user_id, "deleted message");

        Ok(true)
    }
}

fn message_from_row(row: &SqliteRow) -> ChatResult<ChatMessage> {
    Ok(ChatMessage {
        id: row
            .try_get("id")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
        chat_id: row
            .try_get("chat_id")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
        sender_id: row
            .try_get("sender_id")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
        content: row
            .try_get("content")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
        media: row
            .try_get("media")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
        edited: row
            .try_get("is_edited")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
        deleted: row
            .try_get("is_deleted")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
        created_at: row
            .try_get("created_at")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
        updated_at: row
            .try_get("updated_at")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
    })
}
