//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use chrono::TimeDelta;

use crate::config::ServiceConfig;
use crate::domain::SessionStore;
use crate::service::StationService;

/// Login credentials and the API token guarding protected routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessConfig {
    /// Value the `Token` header must carry.
    pub api_token: String,
    /// Login user name.
    pub username: String,
    /// Login password.
    pub password: String,
}

impl From<&ServiceConfig> for AccessConfig {
    fn from(config: &ServiceConfig) -> Self {
        Self {
            api_token: config.api_token.clone(),
            username: config.auth_username.clone(),
            password: config.auth_password.clone(),
        }
    }
}

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Station service for all business logic.
    pub station_service: Arc<StationService>,
    /// Active login sessions.
    pub sessions: Arc<SessionStore>,
    /// Credentials and API token.
    pub access: Arc<AccessConfig>,
}

impl AppState {
    /// Assembles state from a service and the loaded configuration.
    #[must_use]
    pub fn new(station_service: Arc<StationService>, config: &ServiceConfig) -> Self {
        let ttl = i64::try_from(config.session_ttl_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::hours(1));
        Self {
            station_service,
            sessions: Arc::new(SessionStore::new(ttl)),
            access: Arc::new(AccessConfig::from(config)),
        }
    }
}
