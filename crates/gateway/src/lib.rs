//! # Relay Gateway Crate
//!
//! The HTTP and WebSocket edge of the realtime backend. Socket endpoints
//! carry the chat and notification sessions; a small REST surface covers
//! account handling, chat creation, message history, and the notification
//! producer hook.
//!
//! - **websocket**: session lifecycles and wire event types
//! - **rest**: JSON endpoints with OpenAPI annotations
//! - **state**: shared services plus the connection router
//! - **middleware**: strict token authentication for REST callers

pub mod error;
pub mod middleware;
pub mod rest;
pub mod state;
pub mod websocket;

pub use error::{GatewayError, GatewayResult};
pub use middleware::{auth_middleware, AuthUser};
pub use state::GatewayState;
pub use websocket::chat::{authorize_chat_session, AdmissionDenied};

use axum::{
    http::Method,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

/// Create the main application router with all routes
pub fn create_router(state: GatewayState) -> Router {
    let public = Router::new()
        .route("/api/health", get(rest::health::health))
        .route("/api/auth/register", post(rest::auth::register))
        .route("/api/auth/login", post(rest::auth::login));

    let protected = Router::new()
        .route("/api/auth/me", get(rest::auth::me))
        .route("/api/chats", post(rest::chats::create_chat))
        .route("/api/chats/:chat_id/history", get(rest::chats::chat_history))
        .route(
            "/api/notifications",
            get(rest::notifications::list_notifications)
                .post(rest::notifications::create_notification),
        )
        .route(
            "/api/notifications/:notification_id/read",
            post(rest::notifications::mark_notification_read),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    let mut router = Router::new()
        .merge(public)
        .merge(protected)
        .merge(websocket::create_websocket_routes())
        .layer(cors)
        .with_state(state);

    // Swagger UI in debug builds only
    #[cfg(debug_assertions)]
    {
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        #[derive(OpenApi)]
        #[openapi(
            paths(
                rest::health::health,
                rest::auth::register,
                rest::auth::login,
                rest::auth::me,
                rest::chats::create_chat,
                rest::chats::chat_history,
                rest::notifications::list_notifications,
                rest::notifications::create_notification,
                rest::notifications::mark_notification_read,
            ),
            components(schemas(
                rest::auth::RegisterRequest,
                rest::auth::LoginRequest,
                rest::auth::SessionResponse,
                rest::auth::UserResponse,
                rest::chats::CreateChatRequest,
                rest::chats::ChatResponse,
                rest::chats::MessageResponse,
                rest::notifications::PublishNotificationRequest,
                rest::notifications::NotificationResponse,
            )),
            tags(
                (name = "auth", description = "Authentication endpoints"),
                (name = "chats", description = "Chat creation and history"),
                (name = "notifications", description = "Notification rows and producer hook"),
                (name = "health", description = "Liveness"),
            )
        )]
        struct ApiDoc;

        router = router
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));
    }

    router
}
