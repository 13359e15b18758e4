//! PostgreSQL implementation of the snapshot store.

use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::fold::{fold_single_station, fold_station_list};
use super::models::{JoinedRow, SnapshotReceipt};
use super::schema;
use crate::config::ServiceConfig;
use crate::domain::timestamp::{self, SnapshotInstant};
use crate::domain::{Bike, FeedDocument, ReconstructedStation, StationFeature};
use crate::error::ServiceError;

/// PostgreSQL caps a statement at 65 535 bind parameters.
const PG_BIND_LIMIT: usize = 65_535;

const STATION_INSERT: &str = "INSERT INTO stations (id, name, latitude, longitude, geometry_type, \
     total_docks, docks_available, bikes_available, classic_bikes_available, smart_bikes_available, \
     electric_bikes_available, reward_bikes_available, reward_docks_available, kiosk_status, \
     kiosk_public_status, kiosk_connection_status, kiosk_type, address_street, address_city, \
     address_state, address_zip_code, open_time, close_time, event_start, event_end, is_event_based, \
     is_virtual, kiosk_id, notes, public_text, time_zone, trikes_available, station_type, \
     updated_at, created_at) ";
const STATION_COLUMNS: usize = 35;

const BIKE_INSERT: &str = "INSERT INTO bikes (station_id, dock_number, is_electric, is_available, \
     battery, created_at) ";
const BIKE_COLUMNS: usize = 6;

const SELECT_JOINED: &str = "SELECT st.uid, st.id, st.name, st.latitude, st.longitude, \
     st.geometry_type, st.total_docks, st.docks_available, st.bikes_available, \
     st.classic_bikes_available, st.smart_bikes_available, st.electric_bikes_available, \
     st.reward_bikes_available, st.reward_docks_available, st.kiosk_status, st.kiosk_public_status, \
     st.kiosk_connection_status, st.kiosk_type, st.address_street, st.address_city, \
     st.address_state, st.address_zip_code, st.open_time, st.close_time, st.event_start, \
     st.event_end, st.is_event_based, st.is_virtual, st.kiosk_id, st.notes, st.public_text, \
     st.time_zone, st.trikes_available, st.station_type, st.updated_at, st.created_at, \
     b.dock_number, b.is_electric, b.is_available, b.battery \
     FROM stations AS st LEFT JOIN bikes AS b ON st.uid = b.station_id";

/// PostgreSQL-backed snapshot store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
}

impl PostgresPersistence {
    /// Creates a store over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool sized from `config` and bootstraps the
    /// schema.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Schema`] if the database is unreachable or
    /// the DDL fails.
    pub async fn connect(config: &ServiceConfig) -> Result<Self, ServiceError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await
            .map_err(ServiceError::Schema)?;

        let store = Self::new(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    /// Returns the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the snapshot tables and indexes if missing.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Schema`] on failure.
    pub async fn ensure_schema(&self) -> Result<(), ServiceError> {
        schema::ensure_schema(&self.pool).await
    }

    // ── Snapshot Writer ─────────────────────────────────────────────────

    /// Writes one feed document as a snapshot, atomically.
    ///
    /// All station rows share the document's `last_updated` time. Bikes
    /// are linked to the station row whose kiosk id matches their feed
    /// entry. Nothing is written unless every row is.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::TimeFormat`] if `last_updated` is unparsable.
    /// - [`ServiceError::Coordinate`] if any station's coordinate pair is
    ///   not exactly two values; checked before any row is written.
    /// - [`ServiceError::Transaction`] if any statement or the commit
    ///   fails; the transaction is rolled back.
    pub async fn write_snapshot(&self, doc: &FeedDocument) -> Result<SnapshotReceipt, ServiceError> {
        let snapshot_time = timestamp::parse_precise(&doc.last_updated)?;
        let instant = SnapshotInstant::new(snapshot_time)?;
        let stations = located_stations(&doc.features)?;
        let recorded_at = Utc::now().naive_utc();

        let mut tx = self.pool.begin().await.map_err(|source| ServiceError::Transaction {
            stage: "begin",
            source,
        })?;

        let mut inserted: Vec<(i32, Option<i32>)> = Vec::with_capacity(stations.len());
        for chunk in stations.chunks(rows_per_statement(STATION_COLUMNS)) {
            let mut builder = QueryBuilder::<Postgres>::new(STATION_INSERT);
            builder.push_values(chunk, |mut b, &(feature, lat, lng)| {
                let p = &feature.properties;
                b.push_bind(p.id)
                    .push_bind(p.name.as_str())
                    .push_bind(lat)
                    .push_bind(lng)
                    .push_bind(feature.geometry.geometry_type.as_str())
                    .push_bind(p.total_docks)
                    .push_bind(p.docks_available)
                    .push_bind(p.bikes_available)
                    .push_bind(p.classic_bikes_available)
                    .push_bind(p.smart_bikes_available)
                    .push_bind(p.electric_bikes_available)
                    .push_bind(p.reward_bikes_available)
                    .push_bind(p.reward_docks_available)
                    .push_bind(p.kiosk_status.as_str())
                    .push_bind(p.kiosk_public_status.as_str())
                    .push_bind(p.kiosk_connection_status.as_str())
                    .push_bind(p.kiosk_type)
                    .push_bind(p.address_street.as_str())
                    .push_bind(p.address_city.as_str())
                    .push_bind(p.address_state.as_str())
                    .push_bind(p.address_zip_code.as_str())
                    .push_bind(p.open_time.as_deref())
                    .push_bind(p.close_time.as_deref())
                    .push_bind(p.event_start.as_deref())
                    .push_bind(p.event_end.as_deref())
                    .push_bind(p.is_event_based)
                    .push_bind(p.is_virtual)
                    .push_bind(p.kiosk_id)
                    .push_bind(p.notes.as_deref())
                    .push_bind(p.public_text.as_deref())
                    .push_bind(p.time_zone.as_deref())
                    .push_bind(p.trikes_available)
                    .push_bind(feature.feature_type.as_str())
                    .push_bind(snapshot_time)
                    .push_bind(recorded_at);
            });
            builder.push(" RETURNING uid, kiosk_id");

            let rows = builder
                .build_query_as::<(i32, Option<i32>)>()
                .fetch_all(&mut *tx)
                .await
                .map_err(|source| ServiceError::Transaction {
                    stage: "station insert",
                    source,
                })?;
            inserted.extend(rows);
        }

        let bikes = link_bikes(&doc.features, &inserted);
        for chunk in bikes.chunks(rows_per_statement(BIKE_COLUMNS)) {
            let mut builder = QueryBuilder::<Postgres>::new(BIKE_INSERT);
            builder.push_values(chunk, |mut b, &(uid, bike)| {
                b.push_bind(uid)
                    .push_bind(bike.dock_number)
                    .push_bind(bike.is_electric)
                    .push_bind(bike.is_available)
                    .push_bind(bike.battery)
                    .push_bind(recorded_at);
            });

            builder
                .build()
                .execute(&mut *tx)
                .await
                .map_err(|source| ServiceError::Transaction {
                    stage: "bike insert",
                    source,
                })?;
        }

        tx.commit().await.map_err(|source| ServiceError::Transaction {
            stage: "commit",
            source,
        })?;

        let receipt = SnapshotReceipt {
            snapshot_time: instant,
            stations: inserted.len(),
            bikes: bikes.len(),
        };
        tracing::info!(
            snapshot_time = %receipt.snapshot_time,
            stations = receipt.stations,
            bikes = receipt.bikes,
            "snapshot committed"
        );
        Ok(receipt)
    }

    // ── Temporal Reader ─────────────────────────────────────────────────

    /// Reconstructs every station of the snapshot taken within the second
    /// starting at `at`, sorted ascending by feed-native station id.
    ///
    /// Returns an empty list if no snapshot matches.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::TimeFormat`] if `at` is unparsable.
    /// - [`ServiceError::Query`] on database failure.
    /// - [`ServiceError::InconsistentSnapshot`] on corrupt rows.
    pub async fn list_stations(&self, at: &str) -> Result<Vec<ReconstructedStation>, ServiceError> {
        let instant = timestamp::parse_at(at)?;
        let rows = self.fetch_window(&instant, None).await?;
        let canonical = instant.canonical();

        Ok(fold_station_list(rows)?
            .into_iter()
            .map(|station| ReconstructedStation {
                at: canonical.clone(),
                station,
            })
            .collect())
    }

    /// Reconstructs one station, by feed-native kiosk id, as of `at`.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::TimeFormat`] if `at` is unparsable.
    /// - [`ServiceError::InvalidRequest`] if `kiosk_id` is not numeric.
    /// - [`ServiceError::NotFound`] if no row matches.
    /// - [`ServiceError::Query`] on database failure.
    pub async fn get_station(
        &self,
        at: &str,
        kiosk_id: &str,
    ) -> Result<ReconstructedStation, ServiceError> {
        let instant = timestamp::parse_at(at)?;
        let kiosk: i32 = kiosk_id
            .trim()
            .parse()
            .map_err(|_| ServiceError::InvalidRequest(format!("invalid kiosk id: {kiosk_id}")))?;

        let rows = self.fetch_window(&instant, Some(kiosk)).await?;
        let station = fold_single_station(rows)?.ok_or_else(|| {
            ServiceError::NotFound(format!("kiosk {kiosk} at {instant}"))
        })?;

        Ok(ReconstructedStation {
            at: instant.canonical(),
            station,
        })
    }

    /// Runs the left-joined window query, optionally for one kiosk.
    async fn fetch_window(
        &self,
        at: &SnapshotInstant,
        kiosk_id: Option<i32>,
    ) -> Result<Vec<JoinedRow>, ServiceError> {
        let mut builder = QueryBuilder::<Postgres>::new(SELECT_JOINED);
        builder
            .push(" WHERE st.updated_at >= ")
            .push_bind(at.window_start())
            .push(" AND st.updated_at < ")
            .push_bind(at.window_end());
        if let Some(kiosk_id) = kiosk_id {
            builder.push(" AND st.kiosk_id = ").push_bind(kiosk_id);
        }
        builder.push(" ORDER BY st.uid, b.dock_number NULLS LAST, b.uid");

        let rows = builder
            .build_query_as::<JoinedRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(ServiceError::Query)?;

        tracing::debug!(at = %at, ?kiosk_id, rows = rows.len(), "window query");
        Ok(rows)
    }
}

/// Pairs every station with its `(latitude, longitude)`.
///
/// # Errors
///
/// Returns [`ServiceError::Coordinate`] for the first station whose
/// coordinate list is not exactly two values.
fn located_stations(
    features: &[StationFeature],
) -> Result<Vec<(&StationFeature, f64, f64)>, ServiceError> {
    features
        .iter()
        .map(|feature| {
            let p = &feature.properties;
            p.lat_lng()
                .map(|(lat, lng)| (feature, lat, lng))
                .ok_or(ServiceError::Coordinate {
                    station_id: p.id,
                    len: p.coordinates.len(),
                })
        })
        .collect()
}

/// Flattens bikes onto the inserted station rows.
///
/// Each row takes the bikes of the first feed entry with the same kiosk id.
fn link_bikes<'a>(
    features: &'a [StationFeature],
    inserted: &[(i32, Option<i32>)],
) -> Vec<(i32, &'a Bike)> {
    let mut by_kiosk: HashMap<i32, &StationFeature> = HashMap::with_capacity(features.len());
    for feature in features {
        by_kiosk.entry(feature.properties.kiosk_id).or_insert(feature);
    }

    inserted
        .iter()
        .filter_map(|&(uid, kiosk_id)| {
            let feature: &'a StationFeature = by_kiosk.get(&kiosk_id?).copied()?;
            Some(feature.properties.bikes.iter().map(move |bike| (uid, bike)))
        })
        .flatten()
        .collect()
}

/// Largest row count whose bind parameters fit in one statement.
const fn rows_per_statement(columns: usize) -> usize {
    PG_BIND_LIMIT / columns
}
