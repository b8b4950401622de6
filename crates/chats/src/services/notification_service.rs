//! Notification rows for the per-user event stream.

use relay_database::{
    CreateNotificationRequest, Notification, NotificationRepository, NotificationResult,
};
use sqlx::SqlitePool;

/// Persists notifications produced on domain actions. Delivery to live
/// sessions is the gateway's concern; rows outlive any connection so
/// offline recipients can list them later.
#[derive(Clone)]
pub struct NotificationService {
    notification_repository: NotificationRepository,
}

impl NotificationService {
    /// Create a new notification service instance
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            notification_repository: NotificationRepository::new(pool),
        }
    }

    /// Persist a new notification
    pub async fn create(&self, request: &CreateNotificationRequest) -> NotificationResult<Notification> {
        self.notification_repository.create(request).await
    }

    /// Notifications for a user, newest first
    pub async fn list_for_user(
        &self,
        user_id: i64,
        unread_only: bool,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> NotificationResult<Vec<Notification>> {
        self.notification_repository
            .find_by_user_id(user_id, unread_only, limit, offset)
            .await
    }

    /// Mark one of the user's notifications read
    pub async fn mark_read(&self, notification_id: i64, user_id: i64) -> NotificationResult<()> {
        self.notification_repository
            .mark_read(notification_id, user_id)
            .await
    }
}
