//! Entity definitions for the relay persistence layer

pub mod chat;
pub mod member;
pub mod message;
pub mod notification;

pub use chat::Chat;
pub use member::ChatMember;
pub use message::{ChatMessage, CreateMessageRequest};
pub use notification::{CreateNotificationRequest, Notification, NotificationKind};
