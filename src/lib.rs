//! # indego-history
//!
//! Point-in-time history service for Indego bike-share station telemetry.
//!
//! The service periodically pulls the station feed (a GeoJSON feature
//! collection) and stores every pull as an append-only snapshot in
//! PostgreSQL. Clients ask what the network looked like at a given
//! second and get stations reassembled from that snapshot, decorated
//! with current weather.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── StationService + scheduler (service/)
//!     ├── FeedClient, WeatherClient (upstream/)
//!     │
//!     ├── Feed model, timestamps, sessions (domain/)
//!     │
//!     └── PostgreSQL snapshot store (persistence/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
pub mod upstream;
