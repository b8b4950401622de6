//! Chat lifecycle operations.

use relay_database::{Chat, ChatError, ChatRepository, ChatResult, MemberRepository};
use sqlx::SqlitePool;
use tracing::info;

/// Creates chats and seeds their membership. Chats are otherwise managed
/// outside the realtime core; this covers the group-chat creation flow that
/// mints invite tokens.
#[derive(Clone)]
pub struct ChatService {
    chat_repository: ChatRepository,
    member_repository: MemberRepository,
}

impl ChatService {
    /// Create a new chat service instance
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            chat_repository: ChatRepository::new(pool.clone()),
            member_repository: MemberRepository::new(pool),
        }
    }

    /// Create a chat with the creator and the given users as members.
    ///
    /// Group chats receive an invite token at creation.
    pub async fn create(
        &self,
        creator_id: i64,
        is_group: bool,
        member_ids: &[i64],
    ) -> ChatResult<Chat> {
        let chat = self.chat_repository.create(is_group).await?;

        self.member_repository.add(chat.id, creator_id).await?;
        for user_id in member_ids {
            self.member_repository.add(chat.id, *user_id).await?;
        }

        info!(chat_id = chat.id, creator_id, is_group, "chat ready");
        Ok(chat)
    }

    /// Fetch a chat by ID
    pub async fn get(&self, chat_id: i64) -> ChatResult<Chat> {
        self.chat_repository
            .find_by_id(chat_id)
            .await?
            .ok_or(ChatError::ChatNotFound)
    }
}
