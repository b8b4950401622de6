//! Repository for chat data access operations.

use crate::entities::Chat;
use crate::types::{ChatError, ChatResult};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::info;
use uuid::Uuid;

/// Repository for chat database operations
#[derive(Clone)]
pub struct ChatRepository {
    pool: SqlitePool,
}

impl ChatRepository {
    /// Create a new chat repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find a chat by its ID
    pub async fn find_by_id(&self, chat_id: i64) -> ChatResult<Option<Chat>> {
        let row = sqlx::query(
            "SELECT id, is_group, invite_token, created_at FROM chats WHERE id = ?",
        )
        .bind(chat_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        row.as_ref().map(chat_from_row).transpose()
    }

    /// Create a new chat. Group chats are minted an invite token.
    pub async fn create(&self, is_group: bool) -> ChatResult<Chat> {
        let invite_token = is_group.then(|| Uuid::new_v4().to_string());
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO chats (is_group, invite_token, created_at) VALUES (?, ?, ?)",
        )
        .bind(is_group)
        .bind(&invite_token)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        let chat_id = result.last_insert_rowid();

        info!(chat_id, is_group, "created new chat");

        Ok(Chat {
            id: chat_id,
            is_group,
            invite_token,
            created_at: now,
        })
    }
}

fn chat_from_row(row: &SqliteRow) -> ChatResult<Chat> {
    Ok(Chat {
        id: row
            .try_get("id")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
        is_group: row
            .try_get("is_group")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
        invite_token: row
            .try_get("invite_token")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
        created_at: row
            .try_get("created_at")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
    })
}
