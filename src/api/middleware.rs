//! Request guards for protected routes and session headers.

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::error::ServiceError;

/// Header carrying the static API token.
pub const API_TOKEN_HEADER: &str = "token";

/// Header carrying a login session token.
pub const SESSION_TOKEN_HEADER: &str = "x-session-token";

/// Rejects requests whose `Token` header is missing or wrong with
/// `403 Forbidden`.
///
/// # Errors
///
/// Returns [`ServiceError::Forbidden`] when the token does not match.
pub async fn require_api_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ServiceError> {
    let supplied = request
        .headers()
        .get(API_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok());

    if supplied != Some(state.access.api_token.as_str()) {
        tracing::warn!(
            path = %request.uri().path(),
            token_present = supplied.is_some(),
            "rejected request with invalid API token"
        );
        return Err(ServiceError::Forbidden);
    }

    Ok(next.run(request).await)
}

/// Reads the session token from `X-Session-Token`, if well formed.
#[must_use]
pub fn session_token(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get(SESSION_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v.trim()).ok())
}
