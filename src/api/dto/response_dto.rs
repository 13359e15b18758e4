//! Success envelope shared by every non-error response.

use axum::http::StatusCode;
use serde::Serialize;
use utoipa::ToSchema;

/// Success envelope: `{ "status", "message", "data" }`.
///
/// `data` is `null` for responses that carry only a message.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    /// HTTP status code, repeated in the body.
    pub status: u16,
    /// Human-readable outcome.
    pub message: String,
    /// Payload, if any.
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// `200 Success` with a payload.
    #[must_use]
    pub fn success(data: T) -> Self {
        Self::ok_with("Success", data)
    }

    /// `200` with a custom message and a payload.
    #[must_use]
    pub fn ok_with(message: impl Into<String>, data: T) -> Self {
        Self {
            status: StatusCode::OK.as_u16(),
            message: message.into(),
            data: Some(data),
        }
    }

    /// `200` with a message and no payload.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK.as_u16(),
            message: message.into(),
            data: None,
        }
    }
}

/// Envelope whose payload, when present, is a plain string.
pub type MessageResponse = ApiResponse<String>;
