//! Chat entity definitions

use serde::{Deserialize, Serialize};

/// A chat room. Direct chats have no invite token; group chats carry the
/// uuid token minted at creation, which grants entry without prior
/// membership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    pub is_group: bool,
    pub invite_token: Option<String>,
    pub created_at: String,
}

impl Chat {
    /// Whether the presented token matches this chat's invite token.
    /// Always false for direct chats.
    pub fn invite_matches(&self, token: &str) -> bool {
        self.is_group
            && self
                .invite_token
                .as_deref()
                .is_some_and(|invite| invite == token)
    }
}
