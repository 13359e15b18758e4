//! Service configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`).

use std::net::SocketAddr;

/// Default station telemetry feed.
pub const DEFAULT_FEED_URL: &str = "https://bts-status.bicycletransit.workers.dev/phl";

/// Default current-weather endpoint.
pub const DEFAULT_WEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// Top-level service configuration.
///
/// Loaded once at startup via [`ServiceConfig::from_env`].
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:3000`).
    pub listen_addr: SocketAddr,

    /// PostgreSQL connection string.
    pub database_url: String,

    /// Maximum number of database connections in the pool.
    pub database_max_connections: u32,

    /// Minimum idle connections in the pool.
    pub database_min_connections: u32,

    /// Timeout in seconds for acquiring a database connection.
    pub database_connect_timeout_secs: u64,

    /// Station telemetry feed URL.
    pub feed_url: String,

    /// Timeout in seconds for one feed download.
    pub feed_timeout_secs: u64,

    /// OpenWeather API key. Weather enrichment is skipped without one.
    pub weather_api_key: Option<String>,

    /// Current-weather endpoint.
    pub weather_base_url: String,

    /// Timeout in seconds for one weather lookup.
    pub weather_timeout_secs: u64,

    /// Maximum concurrent weather lookups per request.
    pub weather_concurrency: usize,

    /// Seconds between scheduled ingestions (0 = disabled).
    pub ingest_interval_secs: u64,

    /// Value the `Token` header must carry on protected routes.
    pub api_token: String,

    /// Login user name.
    pub auth_username: String,

    /// Login password.
    pub auth_password: String,

    /// Lifetime of a login session in seconds.
    pub session_ttl_secs: u64,

    /// Origin allowed by CORS.
    pub cors_allowed_origin: String,

    /// Request-level timeout in seconds.
    pub request_timeout_secs: u64,

    /// Emit JSON log lines instead of human-readable ones.
    pub log_json: bool,
}

impl ServiceConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to sensible defaults when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` is set but cannot be parsed as
    /// a [`SocketAddr`].
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = std::env::var("LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse()?;

        let database_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| {
            database_url_from_parts(
                &env_or("DB_USER", "postgres"),
                std::env::var("DB_PASSWORD").ok().as_deref(),
                &env_or("DB_HOST", "localhost"),
                &env_or("DB_NAME", "indego"),
            )
        });

        Ok(Self {
            listen_addr,
            database_url,
            database_max_connections: parse_env("DATABASE_MAX_CONNECTIONS", 10),
            database_min_connections: parse_env("DATABASE_MIN_CONNECTIONS", 2),
            database_connect_timeout_secs: parse_env("DATABASE_CONNECT_TIMEOUT_SECS", 5),
            feed_url: env_or("FEED_URL", DEFAULT_FEED_URL),
            feed_timeout_secs: parse_env("FEED_TIMEOUT_SECS", 30),
            weather_api_key: std::env::var("OPEN_WEATHER_APIKEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            weather_base_url: env_or("WEATHER_BASE_URL", DEFAULT_WEATHER_URL),
            weather_timeout_secs: parse_env("WEATHER_TIMEOUT_SECS", 10),
            weather_concurrency: parse_env("WEATHER_CONCURRENCY", 16),
            ingest_interval_secs: parse_env("INGEST_INTERVAL_SECS", 3600),
            api_token: env_or("API_TOKEN", "bike001"),
            auth_username: env_or("AUTH_USERNAME", "user"),
            auth_password: env_or("AUTH_PASSWORD", "123456"),
            session_ttl_secs: parse_env("SESSION_TTL_SECS", 3600),
            cors_allowed_origin: env_or("CORS_ALLOWED_ORIGIN", "http://localhost:5173"),
            request_timeout_secs: parse_env("REQUEST_TIMEOUT_SECS", 60),
            log_json: std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json")),
        })
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            database_url: database_url_from_parts("postgres", None, "localhost", "indego"),
            database_max_connections: 10,
            database_min_connections: 2,
            database_connect_timeout_secs: 5,
            feed_url: DEFAULT_FEED_URL.to_string(),
            feed_timeout_secs: 30,
            weather_api_key: None,
            weather_base_url: DEFAULT_WEATHER_URL.to_string(),
            weather_timeout_secs: 10,
            weather_concurrency: 16,
            ingest_interval_secs: 3600,
            api_token: "bike001".to_string(),
            auth_username: "user".to_string(),
            auth_password: "123456".to_string(),
            session_ttl_secs: 3600,
            cors_allowed_origin: "http://localhost:5173".to_string(),
            request_timeout_secs: 60,
            log_json: false,
        }
    }
}

/// Builds a PostgreSQL URL from the individual `DB_*` settings.
fn database_url_from_parts(user: &str, password: Option<&str>, host: &str, name: &str) -> String {
    match password {
        Some(password) if !password.is_empty() => {
            format!("postgres://{user}:{password}@{host}/{name}?sslmode=disable")
        }
        _ => format!("postgres://{user}@{host}/{name}?sslmode=disable"),
    }
}

/// Reads an environment variable, returning `default` when unset.
fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_url_with_password() {
        let url = database_url_from_parts("bike", Some("s3cret"), "db", "indego");
        assert_eq!(url, "postgres://bike:s3cret@db/indego?sslmode=disable");
    }

    #[test]
    fn database_url_without_password() {
        assert_eq!(
            database_url_from_parts("bike", None, "localhost", "indego"),
            "postgres://bike@localhost/indego?sslmode=disable"
        );
        assert_eq!(
            database_url_from_parts("bike", Some(""), "localhost", "indego"),
            "postgres://bike@localhost/indego?sslmode=disable"
        );
    }

    #[test]
    fn parse_env_falls_back_on_missing_key() {
        let value: u64 = parse_env("INDEGO_HISTORY_TEST_UNSET_KEY", 42);
        assert_eq!(value, 42);
    }

    #[test]
    fn default_config_is_local() {
        let config = ServiceConfig::default();
        assert_eq!(config.listen_addr.port(), 3000);
        assert!(config.weather_api_key.is_none());
        assert_eq!(config.feed_url, DEFAULT_FEED_URL);
    }
}
