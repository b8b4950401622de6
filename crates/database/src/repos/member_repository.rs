//! Repository for chat membership data access operations.

use crate::entities::ChatMember;
use crate::types::{ChatError, ChatResult};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::{debug, info};

/// Repository for membership database operations
#[derive(Clone)]
pub struct MemberRepository {
    pool: SqlitePool,
}

impl MemberRepository {
    /// Create a new member repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Whether the user belongs to the chat's membership set
    pub async fn is_member(&self, chat_id: i64, user_id: i64) -> ChatResult<bool> {
        let row = sqlx::query(
            "SELECT 1 AS present FROM chat_members WHERE chat_id = ? AND user_id = ?",
        )
        .bind(chat_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        Ok(row.is_some())
    }

    /// Add a user to a chat. Adding an existing member is a no-op success.
    pub async fn add(&self, chat_id: i64, user_id: i64) -> ChatResult<()> {
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT OR IGNORE INTO chat_members (chat_id, user_id, joined_at) VALUES (?, ?, ?)",
        )
        .bind(chat_id)
        .bind(user_id)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        if result.rows_affected() > 0 {
            info!(chat_id, user_id, "added chat member");
        } else {
            debug!(chat_id, user_id, "user already a chat member");
        }

        Ok(())
    }

    /// Find all members for a chat
    pub async fn find_by_chat_id(&self, chat_id: i64) -> ChatResult<Vec<ChatMember>> {
        let rows = sqlx::query(
            "SELECT id, chat_id, user_id, joined_at
             FROM chat_members WHERE chat_id = ? ORDER BY joined_at ASC",
        )
        .bind(chat_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        rows.iter().map(member_from_row).collect()
    }
}

fn member_from_row(row: &SqliteRow) -> ChatResult<ChatMember> {
    Ok(ChatMember {
        id: row
            .try_get("id")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
        chat_id: row
            .try_get("chat_id")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
        user_id: row
            .try_get("user_id")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
        joined_at: row
            .try_get("joined_at")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
    })
}
