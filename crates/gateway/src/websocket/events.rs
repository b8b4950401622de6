//! Wire schemas for the WebSocket sessions.
//!
//! Inbound chat payloads are tagged by `action`; outbound chat events by
//! `type`. Notification events are a bare `{"notification": …}` object
//! forwarded verbatim, so the outbound union is untagged.

use serde::{Deserialize, Serialize};

/// Inbound chat action from a client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientAction {
    Send {
        #[serde(default)]
        message: Option<String>,
        #[serde(default)]
        media: Option<String>,
    },
    Edit {
        message_id: i64,
        updated_content: String,
    },
    Delete {
        message_id: i64,
    },
}

/// Outbound chat event broadcast to a chat group
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    Message {
        message: String,
        user: String,
        timestamp: String,
        media: Option<String>,
    },
    Edit {
        message_id: i64,
        updated_content: String,
    },
    Delete {
        message_id: i64,
    },
}

/// Outbound notification event; the payload is producer-defined and opaque
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub notification: serde_json::Value,
}

/// Everything the router can carry to a session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServerEvent {
    Chat(ChatEvent),
    Notification(NotificationEvent),
}
