//! WebSocket endpoints for chat and notification sessions

pub mod chat;
pub mod events;
pub mod notifications;

use axum::{routing::get, Router};

use crate::state::GatewayState;

/// Create the WebSocket routes
pub fn create_websocket_routes() -> Router<GatewayState> {
    Router::new()
        .route("/ws/chat/:chat_id", get(chat::chat_ws))
        .route("/ws/chat/:chat_id/:invite_token", get(chat::chat_invite_ws))
        .route("/ws/notifications/:user_id", get(notifications::notifications_ws))
}
