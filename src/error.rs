//! Service error types with HTTP status code mapping.
//!
//! [`ServiceError`] is the central error type for the service. The storage
//! engine returns the snapshot variants (`Schema`, `Coordinate`,
//! `Transaction`, `TimeFormat`, `NotFound`, ...) and the HTTP layer maps
//! every variant to a status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1002,
///     "message": "invalid time format: yesterday",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category             | HTTP Status                 |
/// |-----------|----------------------|-----------------------------|
/// | 1000–1999 | Validation           | 400 Bad Request             |
/// | 2000–2999 | Not Found / Access   | 404 / 401 / 403             |
/// | 3000–3999 | Storage / Server     | 500 Internal Server Error   |
/// | 4000–4999 | Upstream feed        | 502 Bad Gateway             |
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Table or index creation failed. Fatal at startup.
    #[error("schema bootstrap failed: {0}")]
    Schema(#[source] sqlx::Error),

    /// A station entry in the feed carried a coordinate pair that is not
    /// exactly `[longitude, latitude]`.
    #[error("invalid coordinate for station {station_id}: expected 2 values, got {len}")]
    Coordinate {
        /// Feed-native id of the offending station.
        station_id: i32,
        /// Number of coordinate values received.
        len: usize,
    },

    /// A snapshot write failed and was rolled back.
    #[error("snapshot transaction failed during {stage}: {source}")]
    Transaction {
        /// Step of the write that failed (e.g. `"station insert"`).
        stage: &'static str,
        /// Underlying database error.
        #[source]
        source: sqlx::Error,
    },

    /// A read query against the snapshot tables failed.
    #[error("snapshot query failed: {0}")]
    Query(#[source] sqlx::Error),

    /// The caller supplied a timestamp in none of the accepted formats.
    #[error("invalid time format: {0}")]
    TimeFormat(String),

    /// The query was valid but no snapshot matched it.
    #[error("no snapshot data: {0}")]
    NotFound(String),

    /// Join rows for a single station disagreed on station columns.
    #[error("inconsistent snapshot rows for station row {uid}")]
    InconsistentSnapshot {
        /// Surrogate identifier of the station row.
        uid: i32,
    },

    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Missing, unknown or expired session.
    #[error("unauthorized")]
    Unauthorized,

    /// Missing or wrong API token.
    #[error("forbidden")]
    Forbidden,

    /// The telemetry feed could not be fetched or decoded.
    #[error("upstream feed error: {0}")]
    Upstream(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::TimeFormat(_) => 1002,
            Self::NotFound(_) => 2001,
            Self::Unauthorized => 2002,
            Self::Forbidden => 2003,
            Self::Internal(_) => 3000,
            Self::Schema(_) => 3001,
            Self::Transaction { .. } => 3002,
            Self::Query(_) => 3003,
            Self::InconsistentSnapshot { .. } => 3004,
            Self::Coordinate { .. } => 4001,
            Self::Upstream(_) => 4002,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::TimeFormat(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Schema(_)
            | Self::Transaction { .. }
            | Self::Query(_)
            | Self::InconsistentSnapshot { .. }
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Coordinate { .. } | Self::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Returns `true` for the "valid query, no data" condition.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_bad_request() {
        let err = ServiceError::TimeFormat("yesterday".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), 1002);
        assert_eq!(err.to_string(), "invalid time format: yesterday");
    }

    #[test]
    fn not_found_is_distinguishable() {
        let err = ServiceError::NotFound("kiosk 3005".to_string());
        assert!(err.is_not_found());
        assert!(!ServiceError::Query(sqlx::Error::RowNotFound).is_not_found());
    }

    #[test]
    fn transaction_error_keeps_cause() {
        let err = ServiceError::Transaction {
            stage: "bike insert",
            source: sqlx::Error::PoolTimedOut,
        };
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let Some(cause) = std::error::Error::source(&err) else {
            panic!("expected underlying cause");
        };
        assert!(cause.to_string().contains("timed out"));
        assert!(err.to_string().contains("bike insert"));
    }

    #[test]
    fn coordinate_error_maps_to_bad_gateway() {
        let err = ServiceError::Coordinate {
            station_id: 3005,
            len: 3,
        };
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.error_code(), 4001);
    }

    #[tokio::test]
    async fn into_response_sets_status_and_body() {
        let response = ServiceError::Forbidden.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let Ok(bytes) = axum::body::to_bytes(response.into_body(), usize::MAX).await else {
            panic!("body read failed");
        };
        let Ok(json) = serde_json::from_slice::<serde_json::Value>(&bytes) else {
            panic!("body is not json");
        };
        assert_eq!(json["error"]["code"], 2003);
        assert_eq!(json["error"]["message"], "forbidden");
    }
}
