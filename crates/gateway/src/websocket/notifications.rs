//! Notification WebSocket sessions.
//!
//! Simpler lifecycle than a chat session: connecting → active → closed.
//! The group key is scoped to the user id in the path, so there is no
//! admission decision beyond identity resolution. An active session
//! forwards router broadcasts verbatim and echoes inbound
//! `{"notification": …}` test payloads straight back.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, Query, State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use relay_registry::GroupKey;
use tracing::{debug, info};

use crate::state::GatewayState;
use crate::websocket::chat::WsAuthQuery;
use crate::websocket::events::{NotificationEvent, ServerEvent};

/// `GET /ws/notifications/:user_id`
pub async fn notifications_ws(
    Path(user_id): Path<i64>,
    Query(query): Query<WsAuthQuery>,
    State(state): State<GatewayState>,
    ws: WebSocketUpgrade,
) -> Response {
    let identity = state
        .authenticator
        .resolve_identity(query.token.as_deref())
        .await;

    if let Some(user) = identity.user() {
        if user.id != user_id {
            debug!(stream_user = user_id, caller = %user.username, "identity differs from addressed notification stream");
        }
    }

    ws.on_upgrade(move |socket| run_notification_session(socket, state, user_id))
}

async fn run_notification_session(socket: WebSocket, state: GatewayState, user_id: i64) {
    let (handle, mut events) = state.router.join(GroupKey::Notifications(user_id)).await;
    let (mut sink, mut stream) = socket.split();

    info!(user_id, "notification session open");

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(event) => {
                    let Ok(text) = serde_json::to_string(&event) else {
                        continue;
                    };
                    if sink.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                // Sender side gone: this session was evicted
                None => break,
            },
            inbound = stream.next() => match inbound {
                Some(Ok(Message::Text(text))) => {
                    if let Some(echo) = echo_payload(&text) {
                        let Ok(text) = serde_json::to_string(&echo) else {
                            continue;
                        };
                        if sink.send(Message::Text(text)).await.is_err() {
                            break;
                        }
                    } else {
                        debug!(user_id, "ignoring malformed notification payload");
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(error)) => {
                    debug!(user_id, %error, "notification transport error");
                    break;
                }
            }
        }
    }

    state.router.leave(&handle).await;
    info!(user_id, "notification session closed");
}

/// Parse an inbound echo-test payload; anything without a `notification`
/// field is ignored.
fn echo_payload(text: &str) -> Option<ServerEvent> {
    let value: serde_json::Value = serde_json::from_str(text).ok()?;
    let payload = value.get("notification")?.clone();
    Some(ServerEvent::Notification(NotificationEvent {
        notification: payload,
    }))
}
