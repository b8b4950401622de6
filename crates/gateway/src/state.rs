//! Shared application state for the gateway

use std::sync::Arc;

use relay_auth::Authenticator;
use relay_chats::{ChatService, MembershipService, MessageService, NotificationService};
use relay_config::AppConfig;
use relay_database::Notification;
use relay_registry::{GroupKey, GroupRouter};
use sqlx::SqlitePool;
use tracing::debug;

use crate::websocket::events::{NotificationEvent, ServerEvent};

/// Shared application state: the services behind every session plus the
/// single in-process connection router.
#[derive(Clone)]
pub struct GatewayState {
    /// Database connection pool
    pub pool: SqlitePool,
    /// Token authentication and identity resolution
    pub authenticator: Authenticator,
    /// Chat lifecycle service
    pub chats: ChatService,
    /// Membership authority
    pub membership: MembershipService,
    /// Message store
    pub messages: MessageService,
    /// Notification rows
    pub notifications: NotificationService,
    /// Connection registry for group broadcasts
    pub router: Arc<GroupRouter<ServerEvent>>,
}

impl GatewayState {
    /// Create gateway state over an initialized database pool
    pub fn new(pool: SqlitePool, config: &AppConfig) -> Self {
        Self {
            authenticator: Authenticator::new(pool.clone(), config.auth.clone()),
            chats: ChatService::new(pool.clone()),
            membership: MembershipService::new(pool.clone()),
            messages: MessageService::new(pool.clone()),
            notifications: NotificationService::new(pool.clone()),
            router: Arc::new(GroupRouter::new(config.registry.outbound_buffer)),
            pool,
        }
    }

    /// Initialize the database and build the gateway state from configuration
    pub async fn from_config(config: &AppConfig) -> crate::error::GatewayResult<Self> {
        let pool = relay_database::initialize_database(&config.database).await?;
        Ok(Self::new(pool, config))
    }

    /// Push a persisted notification to the recipient's live stream.
    ///
    /// Fire-and-forget: with no session registered the event is simply
    /// dropped; the row is already stored for a later list call. Returns the
    /// number of sessions reached.
    pub async fn publish_notification(&self, notification: &Notification) -> usize {
        let payload = match serde_json::to_value(notification) {
            Ok(payload) => payload,
            Err(error) => {
                debug!(%error, "notification payload did not serialize");
                return 0;
            }
        };

        let event = ServerEvent::Notification(NotificationEvent {
            notification: payload,
        });

        self.router
            .broadcast(&GroupKey::Notifications(notification.user_id), event)
            .await
    }
}
