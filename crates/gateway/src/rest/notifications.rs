//! Notification REST endpoints: the producer-facing create call and the
//! recipient-facing list.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use relay_database::{CreateNotificationRequest, NotificationKind};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::{IntoParams, ToSchema};

use crate::error::GatewayResult;
use crate::middleware::AuthUser;
use crate::state::GatewayState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct PublishNotificationRequest {
    /// Recipient user ID
    pub user_id: i64,
    pub message: String,
    /// One of `new_post`, `like`, `dislike`, `friend_request`, `follow`
    #[serde(default)]
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListNotificationsQuery {
    #[serde(default)]
    pub unread_only: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NotificationResponse {
    pub id: i64,
    pub user_id: i64,
    pub sender_id: Option<i64>,
    pub message: String,
    pub kind: String,
    pub is_read: bool,
    pub created_at: String,
}

impl From<relay_database::Notification> for NotificationResponse {
    fn from(notification: relay_database::Notification) -> Self {
        Self {
            id: notification.id,
            user_id: notification.user_id,
            sender_id: notification.sender_id,
            message: notification.message,
            kind: notification.kind.as_str().to_string(),
            is_read: notification.is_read,
            created_at: notification.created_at,
        }
    }
}

/// The caller's notifications, newest first
#[utoipa::path(
    get,
    path = "/api/notifications",
    tag = "notifications",
    params(ListNotificationsQuery),
    responses(
        (status = 200, description = "Notifications by recency", body = [NotificationResponse]),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn list_notifications(
    Query(query): Query<ListNotificationsQuery>,
    State(state): State<GatewayState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
) -> GatewayResult<Json<Vec<NotificationResponse>>> {
    let notifications = state
        .notifications
        .list_for_user(
            user.id,
            query.unread_only.unwrap_or(false),
            query.limit,
            query.offset,
        )
        .await?;

    Ok(Json(notifications.into_iter().map(Into::into).collect()))
}

/// Persist a notification and push it to the recipient's live stream.
///
/// Delivery is fire-and-forget: offline recipients pick the row up from the
/// list call instead.
#[utoipa::path(
    post,
    path = "/api/notifications",
    tag = "notifications",
    request_body = PublishNotificationRequest,
    responses(
        (status = 201, description = "Notification stored", body = NotificationResponse),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn create_notification(
    State(state): State<GatewayState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Json(request): Json<PublishNotificationRequest>,
) -> GatewayResult<(StatusCode, Json<NotificationResponse>)> {
    let kind = request
        .kind
        .as_deref()
        .map(NotificationKind::from)
        .unwrap_or(NotificationKind::NewPost);

    let notification = state
        .notifications
        .create(&CreateNotificationRequest {
            user_id: request.user_id,
            sender_id: Some(user.id),
            message: request.message,
            kind,
        })
        .await?;

    let reached = state.publish_notification(&notification).await;
    debug!(
        notification_id = notification.id,
        recipient = notification.user_id,
        reached,
        "notification published"
    );

    Ok((StatusCode::CREATED, Json(notification.into())))
}

/// Mark one of the caller's notifications read
#[utoipa::path(
    post,
    path = "/api/notifications/{notification_id}/read",
    tag = "notifications",
    params(("notification_id" = i64, Path, description = "Notification ID")),
    responses(
        (status = 204, description = "Marked read"),
        (status = 404, description = "Not the caller's notification")
    )
)]
pub async fn mark_notification_read(
    Path(notification_id): Path<i64>,
    State(state): State<GatewayState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
) -> GatewayResult<StatusCode> {
    state
        .notifications
        .mark_read(notification_id, user.id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
