//! HTTP clients for the upstream data sources.
//!
//! [`FeedClient`] downloads the station telemetry feed; [`WeatherClient`]
//! looks up current weather per station coordinate. Both are thin
//! `reqwest` wrappers with a client-level timeout that map every failure
//! to [`crate::error::ServiceError::Upstream`].

pub mod feed_client;
pub mod weather_client;

pub use feed_client::FeedClient;
pub use weather_client::WeatherClient;
