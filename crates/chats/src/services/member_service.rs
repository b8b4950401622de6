//! Membership authority for chat admission decisions.

use relay_database::{Chat, ChatError, ChatRepository, ChatResult, MemberRepository};
use sqlx::SqlitePool;
use tracing::debug;

/// Answers "may this user enter this chat" and performs the join-by-invite
/// mutation. A missing chat is reported as [`ChatError::ChatNotFound`], which
/// is a different condition from a clean "not a member" answer; callers deny
/// admission either way but log them apart.
#[derive(Clone)]
pub struct MembershipService {
    chat_repository: ChatRepository,
    member_repository: MemberRepository,
}

impl MembershipService {
    /// Create a new membership service instance
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            chat_repository: ChatRepository::new(pool.clone()),
            member_repository: MemberRepository::new(pool),
        }
    }

    /// Whether the user is in the chat's membership set
    pub async fn is_member(&self, chat_id: i64, user_id: i64) -> ChatResult<bool> {
        self.require_chat(chat_id).await?;
        self.member_repository.is_member(chat_id, user_id).await
    }

    /// Whether the presented invite token grants entry to the chat.
    ///
    /// Only group chats honor invite tokens.
    pub async fn can_join_via_invite(&self, chat_id: i64, token: &str) -> ChatResult<bool> {
        let chat = self.require_chat(chat_id).await?;

        let matches = chat.invite_matches(token);
        if !matches {
            debug!(chat_id, "invite token did not match");
        }

        Ok(matches)
    }

    /// Add a user to the chat's membership set; adding an existing member is
    /// a no-op success.
    pub async fn add_member(&self, chat_id: i64, user_id: i64) -> ChatResult<()> {
        self.require_chat(chat_id).await?;
        self.member_repository.add(chat_id, user_id).await
    }

    async fn require_chat(&self, chat_id: i64) -> ChatResult<Chat> {
        self.chat_repository
            .find_by_id(chat_id)
            .await?
            .ok_or(ChatError::ChatNotFound)
    }
}
