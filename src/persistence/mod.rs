//! Persistence layer: PostgreSQL station and bike snapshots.
//!
//! Snapshots are append-only. [`PostgresPersistence`] writes a whole feed
//! document in one transaction and reconstructs stations for a timestamp
//! with a single left-joined window query, folded in [`fold`].

pub mod fold;
pub mod models;
pub mod postgres;
pub mod schema;

pub use models::SnapshotReceipt;
pub use postgres::PostgresPersistence;
