//! Message store operations for chat sessions.

use relay_database::{
    ChatMessage, ChatResult, CreateMessageRequest, MessageRepository,
};
use sqlx::SqlitePool;
use tracing::warn;

/// Service for message mutations and history reads.
///
/// Edit and delete enforce that the acting user is the message's original
/// sender; violations surface as [`relay_database::ChatError::OwnershipViolation`]
/// and leave the row untouched.
#[derive(Clone)]
pub struct MessageService {
    message_repository: MessageRepository,
}

impl MessageService {
    /// Create a new message service instance
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            message_repository: MessageRepository::new(pool),
        }
    }

    /// Persist a new message for a chat
    pub async fn send(
        &self,
        chat_id: i64,
        sender_id: i64,
        content: Option<String>,
        media: Option<String>,
    ) -> ChatResult<ChatMessage> {
        let request = CreateMessageRequest {
            chat_id,
            content,
            media,
        };

        self.message_repository.create(sender_id, &request).await
    }

    /// Replace a message's content, marking it edited
    pub async fn edit(
        &self,
        message_id: i64,
        acting_user_id: i64,
        new_content: &str,
    ) -> ChatResult<ChatMessage> {
        let result = self
            .message_repository
            .update_content(message_id, acting_user_id, new_content)
            .await;

        if let Err(relay_database::ChatError::OwnershipViolation) = &result {
            warn!(message_id, acting_user_id, "rejected edit of foreign message");
        }

        result
    }

    /// Soft-delete a message. Returns whether this call deleted the row;
    /// missing or already-deleted targets are a no-op success.
    pub async fn delete(&self, message_id: i64, acting_user_id: i64) -> ChatResult<bool> {
        let result = self
            .message_repository
            .mark_deleted(message_id, acting_user_id)
            .await;

        if let Err(relay_database::ChatError::OwnershipViolation) = &result {
            warn!(message_id, acting_user_id, "rejected delete of foreign message");
        }

        result
    }

    /// Messages for a chat ordered by recency
    pub async fn history(
        &self,
        chat_id: i64,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> ChatResult<Vec<ChatMessage>> {
        self.message_repository
            .find_by_chat_id(chat_id, limit, offset)
            .await
    }
}
