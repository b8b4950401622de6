//! Shared types for the database layer

pub mod errors;

pub use errors::{ChatError, DatabaseError, NotificationError};

/// Result alias for general database operations
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Result alias for chat-domain operations
pub type ChatResult<T> = Result<T, ChatError>;

/// Result alias for notification operations
pub type NotificationResult<T> = Result<T, NotificationError>;
