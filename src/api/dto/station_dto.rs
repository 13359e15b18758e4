//! Station query DTOs.

use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::ServiceError;

/// `?at=` query parameter of the station endpoints.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AtQuery {
    /// Snapshot timestamp, e.g. `2024-11-08 07:30:11` or RFC 3339.
    pub at: Option<String>,
}

impl AtQuery {
    /// Returns the trimmed timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidRequest`] if `at` is missing or
    /// blank.
    pub fn required(&self) -> Result<&str, ServiceError> {
        self.at
            .as_deref()
            .map(str::trim)
            .filter(|at| !at.is_empty())
            .ok_or_else(|| ServiceError::InvalidRequest("at cannot be empty".to_string()))
    }
}
