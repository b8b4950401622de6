//! REST endpoints for the gateway

pub mod auth;
pub mod chats;
pub mod health;
pub mod notifications;
