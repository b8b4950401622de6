//! Chat WebSocket sessions.
//!
//! A connection moves through connecting → authorizing → admitted → active
//! → closed. Authorization happens before the handshake completes: a denied
//! caller gets a plain 403 and never touches the registry. Once admitted,
//! the session joins its chat group and serializes its own inbound actions
//! one at a time; every mutation is persisted before the matching event is
//! broadcast.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use relay_auth::{Identity, UserRef};
use relay_chats::ChatError;
use relay_registry::GroupKey;
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use crate::state::GatewayState;
use crate::websocket::events::{ChatEvent, ClientAction, ServerEvent};

/// Connection credential, supplied as a query parameter
#[derive(Debug, Deserialize)]
pub struct WsAuthQuery {
    pub token: Option<String>,
}

/// Why a chat connection was refused before its handshake completed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdmissionDenied {
    /// The credential resolved to anonymous, which admits to nothing
    Anonymous,
    /// The addressed chat does not exist
    ChatNotFound,
    /// The caller is neither a member nor the bearer of a valid invite
    NotAMember,
    /// The membership authority could not answer
    Storage(String),
}

/// `GET /ws/chat/:chat_id`
pub async fn chat_ws(
    Path(chat_id): Path<i64>,
    Query(query): Query<WsAuthQuery>,
    State(state): State<GatewayState>,
    ws: WebSocketUpgrade,
) -> Response {
    upgrade_chat_session(chat_id, None, query, state, ws).await
}

/// `GET /ws/chat/:chat_id/:invite_token`
pub async fn chat_invite_ws(
    Path((chat_id, invite_token)): Path<(i64, String)>,
    Query(query): Query<WsAuthQuery>,
    State(state): State<GatewayState>,
    ws: WebSocketUpgrade,
) -> Response {
    upgrade_chat_session(chat_id, Some(invite_token), query, state, ws).await
}

async fn upgrade_chat_session(
    chat_id: i64,
    invite_token: Option<String>,
    query: WsAuthQuery,
    state: GatewayState,
    ws: WebSocketUpgrade,
) -> Response {
    let identity = state
        .authenticator
        .resolve_identity(query.token.as_deref())
        .await;

    match authorize_chat_session(&state, chat_id, invite_token.as_deref(), &identity).await {
        Ok(user) => {
            info!(chat_id, user = %user.username, "chat session admitted");
            ws.on_upgrade(move |socket| run_chat_session(socket, state, chat_id, user))
        }
        Err(denial) => {
            // Refused before the handshake: no events ever flow
            debug!(chat_id, ?denial, "chat connection refused");
            StatusCode::FORBIDDEN.into_response()
        }
    }
}

/// Decide whether the resolved identity may enter the chat.
///
/// Invite admission runs first: a valid invite token on a group chat adds
/// the caller to the membership set. Otherwise plain membership decides.
/// An unknown chat and a non-member are both refusals, logged apart.
pub async fn authorize_chat_session(
    state: &GatewayState,
    chat_id: i64,
    invite_token: Option<&str>,
    identity: &Identity,
) -> Result<UserRef, AdmissionDenied> {
    let Some(user) = identity.user() else {
        info!(chat_id, "denied anonymous chat connection");
        return Err(AdmissionDenied::Anonymous);
    };

    if let Some(token) = invite_token {
        match state.membership.can_join_via_invite(chat_id, token).await {
            Ok(true) => {
                state
                    .membership
                    .add_member(chat_id, user.id)
                    .await
                    .map_err(|e| AdmissionDenied::Storage(e.to_string()))?;
                info!(chat_id, user = %user.username, "admitted via invite token");
                return Ok(user.clone());
            }
            // An invalid invite falls through to the plain membership check
            Ok(false) => {}
            Err(ChatError::ChatNotFound) => {
                info!(chat_id, user = %user.username, "denied connection to unknown chat");
                return Err(AdmissionDenied::ChatNotFound);
            }
            Err(error) => {
                error!(chat_id, %error, "membership authority failed during invite check");
                return Err(AdmissionDenied::Storage(error.to_string()));
            }
        }
    }

    match state.membership.is_member(chat_id, user.id).await {
        Ok(true) => Ok(user.clone()),
        Ok(false) => {
            info!(chat_id, user = %user.username, "denied non-member chat connection");
            Err(AdmissionDenied::NotAMember)
        }
        Err(ChatError::ChatNotFound) => {
            info!(chat_id, user = %user.username, "denied connection to unknown chat");
            Err(AdmissionDenied::ChatNotFound)
        }
        Err(error) => {
            error!(chat_id, %error, "membership authority failed");
            Err(AdmissionDenied::Storage(error.to_string()))
        }
    }
}

/// The active phase of an admitted session: pump broadcasts out, process
/// inbound actions, deregister on the way out.
async fn run_chat_session(socket: WebSocket, state: GatewayState, chat_id: i64, user: UserRef) {
    let (handle, mut events) = state.router.join(GroupKey::Chat(chat_id)).await;
    let (mut sink, mut stream) = socket.split();

    // Outbound pump: registry queue → socket. Ends when the queue's sender
    // disappears (leave or eviction) or the transport goes away.
    let mut pump = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let Ok(text) = serde_json::to_string(&event) else {
                continue;
            };
            if sink.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    loop {
        tokio::select! {
            _ = &mut pump => break,
            inbound = stream.next() => match inbound {
                Some(Ok(Message::Text(text))) => {
                    match serde_json::from_str::<ClientAction>(&text) {
                        Ok(action) => handle_action(&state, chat_id, &user, action).await,
                        // Unrecognized or malformed payloads are ignored
                        Err(error) => {
                            debug!(chat_id, user = %user.username, %error, "ignoring malformed chat action");
                        }
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(error)) => {
                    debug!(chat_id, user = %user.username, %error, "chat transport error");
                    break;
                }
            }
        }
    }

    pump.abort();
    state.router.leave(&handle).await;
    info!(chat_id, user = %user.username, "chat session closed");
}

/// Apply one inbound action: persist first, broadcast after. Failed
/// mutations broadcast nothing.
async fn handle_action(state: &GatewayState, chat_id: i64, user: &UserRef, action: ClientAction) {
    match action {
        ClientAction::Send { message, media } => {
            match state.messages.send(chat_id, user.id, message, media).await {
                Ok(row) => {
                    let event = ChatEvent::Message {
                        message: row.content.unwrap_or_default(),
                        user: user.username.clone(),
                        timestamp: row.created_at,
                        media: row.media,
                    };
                    state
                        .router
                        .broadcast(&GroupKey::Chat(chat_id), ServerEvent::Chat(event))
                        .await;
                }
                Err(error) => {
                    warn!(chat_id, user = %user.username, %error, "failed to store message");
                }
            }
        }
        ClientAction::Edit {
            message_id,
            updated_content,
        } => {
            match state
                .messages
                .edit(message_id, user.id, &updated_content)
                .await
            {
                Ok(_) => {
                    let event = ChatEvent::Edit {
                        message_id,
                        updated_content,
                    };
                    state
                        .router
                        .broadcast(&GroupKey::Chat(chat_id), ServerEvent::Chat(event))
                        .await;
                }
                Err(ChatError::OwnershipViolation) => {}
                Err(ChatError::MessageNotFound) => {
                    debug!(chat_id, message_id, "edit target missing, ignoring");
                }
                Err(error) => {
                    warn!(chat_id, message_id, %error, "failed to edit message");
                }
            }
        }
        ClientAction::Delete { message_id } => {
            match state.messages.delete(message_id, user.id).await {
                Ok(true) => {
                    let event = ChatEvent::Delete { message_id };
                    state
                        .router
                        .broadcast(&GroupKey::Chat(chat_id), ServerEvent::Chat(event))
                        .await;
                }
                // Missing or already-deleted target: success, nothing to announce
                Ok(false) => {
                    debug!(chat_id, message_id, "delete was a no-op");
                }
                Err(ChatError::OwnershipViolation) => {}
                Err(error) => {
                    warn!(chat_id, message_id, %error, "failed to delete message");
                }
            }
        }
    }
}
