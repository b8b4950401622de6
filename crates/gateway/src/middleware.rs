//! Middleware for authentication and other cross-cutting concerns

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::error::GatewayError;
use crate::state::GatewayState;

/// The authenticated caller, stored in request extensions by
/// [`auth_middleware`]
#[derive(Debug, Clone)]
pub struct AuthUser(pub relay_auth::User);

/// Authentication middleware for the REST surface.
///
/// Accepts a bearer token in the `Authorization` header or a `token` query
/// parameter and resolves it strictly: REST callers get a 401 instead of
/// the socket endpoints' anonymous fallback.
pub async fn auth_middleware(
    State(state): State<GatewayState>,
    mut request: Request,
    next: Next,
) -> Result<Response, GatewayError> {
    let bearer = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(str::to_owned);

    let query_token = request.uri().query().and_then(|query| {
        query.split('&').find_map(|pair| {
            let mut parts = pair.splitn(2, '=');
            match (parts.next(), parts.next()) {
                (Some("token"), Some(value)) => Some(value.to_string()),
                _ => None,
            }
        })
    });

    let token = bearer.or(query_token).ok_or_else(|| {
        GatewayError::AuthenticationFailed("Missing authentication token".to_string())
    })?;

    let (user, _session) = state
        .authenticator
        .authenticate_token(&token)
        .await
        .map_err(GatewayError::from)?;

    request.extensions_mut().insert(AuthUser(user));

    Ok(next.run(request).await)
}
