//! # Relay Chats Crate
//!
//! Domain services for the realtime router: membership decisions, message
//! mutations, and notification rows. Each service wraps the corresponding
//! repository from `relay-database` and owns the domain rules the
//! repositories do not (membership gating, the author-only mutation
//! invariant surfaced to callers).

pub mod services;

pub use services::{ChatService, MembershipService, MessageService, NotificationService};

// Re-export the database types callers handle through the services
pub use relay_database::{
    Chat, ChatError, ChatMember, ChatMessage, ChatResult, CreateMessageRequest,
    CreateNotificationRequest, Notification, NotificationError, NotificationKind,
    NotificationResult,
};
