//! Chat REST endpoints: creation and message history

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::{GatewayError, GatewayResult};
use crate::middleware::AuthUser;
use crate::state::GatewayState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateChatRequest {
    /// Multi-party chats are minted an invite token at creation
    #[serde(default)]
    pub is_group: bool,
    /// Users to seed the membership set with, besides the creator
    #[serde(default)]
    pub member_ids: Vec<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChatResponse {
    pub id: i64,
    pub is_group: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invite_token: Option<String>,
    pub created_at: String,
}

impl From<relay_database::Chat> for ChatResponse {
    fn from(chat: relay_database::Chat) -> Self {
        Self {
            id: chat.id,
            is_group: chat.is_group,
            invite_token: chat.invite_token,
            created_at: chat.created_at,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub id: i64,
    pub chat_id: i64,
    pub sender_id: i64,
    pub message: Option<String>,
    pub media: Option<String>,
    pub edited: bool,
    pub timestamp: String,
}

impl From<relay_database::ChatMessage> for MessageResponse {
    fn from(message: relay_database::ChatMessage) -> Self {
        Self {
            id: message.id,
            chat_id: message.chat_id,
            sender_id: message.sender_id,
            message: message.content,
            media: message.media,
            edited: message.edited,
            timestamp: message.created_at,
        }
    }
}

/// Create a chat with the caller as its first member
#[utoipa::path(
    post,
    path = "/api/chats",
    tag = "chats",
    request_body = CreateChatRequest,
    responses(
        (status = 201, description = "Chat created", body = ChatResponse),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn create_chat(
    State(state): State<GatewayState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Json(request): Json<CreateChatRequest>,
) -> GatewayResult<(StatusCode, Json<ChatResponse>)> {
    let chat = state
        .chats
        .create(user.id, request.is_group, &request.member_ids)
        .await?;

    Ok((StatusCode::CREATED, Json(chat.into())))
}

/// Message history for a chat, newest first. Members only.
#[utoipa::path(
    get,
    path = "/api/chats/{chat_id}/history",
    tag = "chats",
    params(
        ("chat_id" = i64, Path, description = "Chat ID"),
        HistoryQuery
    ),
    responses(
        (status = 200, description = "Messages by recency", body = [MessageResponse]),
        (status = 403, description = "Caller is not a member"),
        (status = 404, description = "Chat not found")
    )
)]
pub async fn chat_history(
    Path(chat_id): Path<i64>,
    Query(query): Query<HistoryQuery>,
    State(state): State<GatewayState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
) -> GatewayResult<Json<Vec<MessageResponse>>> {
    if !state.membership.is_member(chat_id, user.id).await? {
        return Err(GatewayError::AuthorizationFailed(
            "Not a member of this chat".to_string(),
        ));
    }

    let messages = state
        .messages
        .history(chat_id, query.limit, query.offset)
        .await?;

    Ok(Json(messages.into_iter().map(Into::into).collect()))
}
