//! Service layer: business logic orchestration.
//!
//! [`StationService`] pulls the telemetry feed into the snapshot store and
//! serves reconstructed stations enriched with current weather.
//! [`scheduler`] runs ingestion in the background.

pub mod scheduler;
pub mod station_service;

pub use station_service::{EnrichmentLimits, StationService};
