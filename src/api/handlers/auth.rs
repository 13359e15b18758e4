//! Session handlers: check-auth, login, logout.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Form, Json, Router};

use crate::api::dto::{ApiResponse, LoginRequest, MessageResponse, SessionDto};
use crate::api::middleware::session_token;
use crate::app_state::AppState;
use crate::error::{ErrorResponse, ServiceError};

/// `GET /check-auth` — Validate the caller's session.
///
/// # Errors
///
/// Returns [`ServiceError::Unauthorized`] if the `X-Session-Token` header
/// is missing, unknown or expired.
#[utoipa::path(
    get,
    path = "/api/v1/check-auth",
    tag = "Auth",
    summary = "Check session",
    description = "Returns 200 if the `X-Session-Token` header names a live session.",
    params(
        ("X-Session-Token" = String, Header, description = "Session token from login"),
    ),
    responses(
        (status = 200, description = "Session is valid", body = MessageResponse),
        (status = 401, description = "No valid session", body = ErrorResponse),
    )
)]
pub async fn check_auth(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MessageResponse>, ServiceError> {
    let token = session_token(&headers).ok_or(ServiceError::Unauthorized)?;
    if !state.sessions.is_valid(token).await {
        return Err(ServiceError::Unauthorized);
    }
    Ok(Json(ApiResponse::message("Authorized")))
}

/// `POST /login` — Exchange credentials for a session token.
///
/// # Errors
///
/// Returns [`ServiceError::Unauthorized`] on wrong credentials.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    tag = "Auth",
    summary = "Log in",
    description = "Accepts form-encoded `username` and `password` and issues a session token.",
    request_body(content = LoginRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Logged in", body = ApiResponse<SessionDto>),
        (status = 401, description = "Login failed", body = ErrorResponse),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Form(req): Form<LoginRequest>,
) -> Result<Json<ApiResponse<SessionDto>>, ServiceError> {
    if req.username != state.access.username || req.password != state.access.password {
        tracing::warn!(username = %req.username, "login failed");
        return Err(ServiceError::Unauthorized);
    }

    let purged = state.sessions.purge_expired().await;
    let session = state.sessions.create().await;
    tracing::info!(username = %req.username, purged, "session issued");

    Ok(Json(ApiResponse::success(SessionDto {
        token: session.token,
        expires_at: session.expires_at,
    })))
}

/// `POST /logout` — End the caller's session.
///
/// Always succeeds; an absent or unknown token is a no-op.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    tag = "Auth",
    summary = "Log out",
    description = "Revokes the session named by `X-Session-Token`, if any.",
    params(
        ("X-Session-Token" = Option<String>, Header, description = "Session token from login"),
    ),
    responses(
        (status = 200, description = "Logged out", body = MessageResponse),
    )
)]
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Json<MessageResponse> {
    if let Some(token) = session_token(&headers) {
        let revoked = state.sessions.revoke(token).await;
        tracing::debug!(revoked, "logout");
    }
    Json(ApiResponse::message("Success"))
}

/// Session routes (unprotected).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/check-auth", get(check_auth))
        .route("/login", post(login))
        .route("/logout", post(logout))
}
