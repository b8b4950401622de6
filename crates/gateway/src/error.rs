//! Error types for the gateway layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Gateway error types
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Authorization failed: {0}")]
    AuthorizationFailed(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::AuthenticationFailed(_) => StatusCode::UNAUTHORIZED,
            GatewayError::AuthorizationFailed(_) => StatusCode::FORBIDDEN,
            GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::InternalError(_) | GatewayError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_response = json!({
            "error": status.as_str(),
            "message": self.to_string(),
        });

        (status, Json(error_response)).into_response()
    }
}

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

impl From<relay_database::ChatError> for GatewayError {
    fn from(error: relay_database::ChatError) -> Self {
        use relay_database::ChatError;
        match error {
            ChatError::ChatNotFound => GatewayError::NotFound("Chat not found".to_string()),
            ChatError::MessageNotFound => GatewayError::NotFound("Message not found".to_string()),
            ChatError::NotAMember => {
                GatewayError::AuthorizationFailed("Not a member of this chat".to_string())
            }
            ChatError::AccessDenied => {
                GatewayError::AuthorizationFailed("Access denied".to_string())
            }
            ChatError::OwnershipViolation => GatewayError::AuthorizationFailed(
                "Only the original sender may modify a message".to_string(),
            ),
            ChatError::DatabaseError(msg) => GatewayError::DatabaseError(msg),
        }
    }
}

impl From<relay_database::NotificationError> for GatewayError {
    fn from(error: relay_database::NotificationError) -> Self {
        use relay_database::NotificationError;
        match error {
            NotificationError::NotificationNotFound => {
                GatewayError::NotFound("Notification not found".to_string())
            }
            NotificationError::DatabaseError(msg) => GatewayError::DatabaseError(msg),
        }
    }
}

impl From<relay_auth::AuthError> for GatewayError {
    fn from(error: relay_auth::AuthError) -> Self {
        use relay_auth::AuthError;
        match error {
            AuthError::UserExists => {
                GatewayError::InvalidRequest("User already exists".to_string())
            }
            AuthError::InvalidCredentials => {
                GatewayError::AuthenticationFailed("Invalid credentials".to_string())
            }
            AuthError::SessionNotFound | AuthError::SessionExpired | AuthError::InvalidSession => {
                GatewayError::AuthenticationFailed("Invalid or expired token".to_string())
            }
            AuthError::Database(e) => GatewayError::DatabaseError(e.to_string()),
            AuthError::PasswordHash(e) => GatewayError::InternalError(e.to_string()),
        }
    }
}

impl From<relay_database::DatabaseError> for GatewayError {
    fn from(error: relay_database::DatabaseError) -> Self {
        GatewayError::DatabaseError(error.to_string())
    }
}
