//! Relay Database Crate
//!
//! Persistence for the realtime router: chats and their membership sets,
//! messages, notification rows, and the tables backing token authentication.
//! Provides connection management, embedded migrations, and repository
//! implementations.

use sqlx::SqlitePool;

use relay_config::DatabaseConfig;

pub mod connection;
pub mod entities;
pub mod migrations;
pub mod repos;
pub mod types;

pub use connection::prepare_database;
pub use migrations::run_migrations;

// Re-export repositories
pub use repos::{ChatRepository, MemberRepository, MessageRepository, NotificationRepository};

// Re-export entities
pub use entities::{
    chat::Chat,
    member::ChatMember,
    message::{ChatMessage, CreateMessageRequest},
    notification::{CreateNotificationRequest, Notification, NotificationKind},
};

// Re-export types
pub use types::{
    errors::{ChatError, DatabaseError, NotificationError},
    ChatResult, DatabaseResult, NotificationResult,
};

/// Initialize the database with migrations
pub async fn initialize_database(config: &DatabaseConfig) -> DatabaseResult<SqlitePool> {
    let pool = prepare_database(config)
        .await
        .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

    run_migrations(&pool)
        .await
        .map_err(|e| DatabaseError::MigrationError(e.to_string()))?;

    Ok(pool)
}
