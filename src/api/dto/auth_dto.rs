//! Login and session DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Form body of `POST /login`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// User name.
    #[serde(default)]
    pub username: String,
    /// Password.
    #[serde(default)]
    pub password: String,
}

/// Session issued by a successful login.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionDto {
    /// Token to send back in the `X-Session-Token` header.
    pub token: Uuid,
    /// Instant after which the token is rejected.
    pub expires_at: DateTime<Utc>,
}
