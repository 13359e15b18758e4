//! Domain layer: feed model, read-side views, timestamps, sessions.
//!
//! The feed types describe what the telemetry source publishes and what
//! clients get back; [`timestamp`] turns caller input into the one-second
//! window the snapshot queries run over.

pub mod feed;
pub mod session;
pub mod station;
pub mod timestamp;
pub mod weather;

pub use feed::{Bike, FeedDocument, Geometry, StationFeature, StationProperties};
pub use session::SessionStore;
pub use station::{ReconstructedStation, StationReport};
pub use timestamp::{SnapshotInstant, parse_at};
pub use weather::Weather;
