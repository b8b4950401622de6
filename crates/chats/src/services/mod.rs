//! Service layer for chat domain operations

pub mod chat_service;
pub mod member_service;
pub mod message_service;
pub mod notification_service;

pub use chat_service::ChatService;
pub use member_service::MembershipService;
pub use message_service::MessageService;
pub use notification_service::NotificationService;
