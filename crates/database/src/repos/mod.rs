//! Repository implementations for the relay persistence layer

pub mod chat_repository;
pub mod member_repository;
pub mod message_repository;
pub mod notification_repository;

pub use chat_repository::ChatRepository;
pub use member_repository::MemberRepository;
pub use message_repository::MessageRepository;
pub use notification_repository::NotificationRepository;
