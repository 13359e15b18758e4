//! Database row models for station and bike snapshots.

use chrono::NaiveDateTime;

use crate::domain::{Bike, Geometry, SnapshotInstant, StationFeature, StationProperties};

/// Outcome of a committed snapshot write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotReceipt {
    /// Snapshot time shared by every row of the write, to the second.
    pub snapshot_time: SnapshotInstant,
    /// Station rows inserted.
    pub stations: usize,
    /// Bike rows inserted.
    pub bikes: usize,
}

/// Station columns of a `stations` row as read back by the window query.
///
/// Every column except the keys is nullable in the schema, so each is
/// optional here; NULLs from older rows read back as defaults.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct StationRow {
    /// Surrogate identifier. Links bikes; never exposed to clients.
    pub uid: i32,
    /// Feed-native station id.
    pub id: i32,
    /// Display name.
    pub name: Option<String>,
    /// Latitude.
    pub latitude: Option<f64>,
    /// Longitude.
    pub longitude: Option<f64>,
    /// GeoJSON geometry type.
    pub geometry_type: Option<String>,
    /// Total docks.
    pub total_docks: Option<i32>,
    /// Empty docks.
    pub docks_available: Option<i32>,
    /// Bikes available.
    pub bikes_available: Option<i32>,
    /// Classic bikes available.
    pub classic_bikes_available: Option<i32>,
    /// Smart bikes available.
    pub smart_bikes_available: Option<i32>,
    /// Electric bikes available.
    pub electric_bikes_available: Option<i32>,
    /// Reward bikes available.
    pub reward_bikes_available: Option<i32>,
    /// Reward docks available.
    pub reward_docks_available: Option<i32>,
    /// Operational kiosk status.
    pub kiosk_status: Option<String>,
    /// Public kiosk status.
    pub kiosk_public_status: Option<String>,
    /// Kiosk connectivity status.
    pub kiosk_connection_status: Option<String>,
    /// Kiosk hardware type.
    pub kiosk_type: Option<i32>,
    /// Street address.
    pub address_street: Option<String>,
    /// City.
    pub address_city: Option<String>,
    /// State.
    pub address_state: Option<String>,
    /// Postal code.
    pub address_zip_code: Option<String>,
    /// Opening time.
    pub open_time: Option<String>,
    /// Closing time.
    pub close_time: Option<String>,
    /// Event window start.
    pub event_start: Option<String>,
    /// Event window end.
    pub event_end: Option<String>,
    /// Event-only station.
    pub is_event_based: Option<bool>,
    /// Virtual station.
    pub is_virtual: Option<bool>,
    /// Feed-native kiosk id.
    pub kiosk_id: Option<i32>,
    /// Operator notes.
    pub notes: Option<String>,
    /// Public announcement text.
    pub public_text: Option<String>,
    /// Station time zone.
    pub time_zone: Option<String>,
    /// Trikes available.
    pub trikes_available: Option<i32>,
    /// GeoJSON feature type.
    pub station_type: Option<String>,
    /// Snapshot time reported by the feed.
    pub updated_at: Option<NaiveDateTime>,
    /// Wall-clock insert time.
    pub created_at: Option<NaiveDateTime>,
}

/// Bike columns of a left-joined row. All NULL when the station has no
/// bikes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct BikeColumns {
    /// Dock number.
    pub dock_number: Option<i32>,
    /// Electric flag.
    pub is_electric: Option<bool>,
    /// Availability flag.
    pub is_available: Option<bool>,
    /// Battery level.
    pub battery: Option<i32>,
}

/// One row of `stations LEFT JOIN bikes`.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct JoinedRow {
    /// Station half of the row.
    #[sqlx(flatten)]
    pub station: StationRow,
    /// Bike half of the row.
    #[sqlx(flatten)]
    pub bike: BikeColumns,
}

impl From<BikeColumns> for Bike {
    fn from(cols: BikeColumns) -> Self {
        Self {
            dock_number: cols.dock_number,
            is_electric: cols.is_electric,
            is_available: cols.is_available,
            battery: cols.battery,
        }
    }
}

impl From<&StationRow> for StationFeature {
    fn from(row: &StationRow) -> Self {
        let latitude = row.latitude.unwrap_or_default();
        let longitude = row.longitude.unwrap_or_default();
        let properties = StationProperties {
            id: row.id,
            name: row.name.clone().unwrap_or_default(),
            coordinates: vec![longitude, latitude],
            total_docks: row.total_docks.unwrap_or_default(),
            docks_available: row.docks_available.unwrap_or_default(),
            bikes_available: row.bikes_available.unwrap_or_default(),
            classic_bikes_available: row.classic_bikes_available.unwrap_or_default(),
            smart_bikes_available: row.smart_bikes_available.unwrap_or_default(),
            electric_bikes_available: row.electric_bikes_available.unwrap_or_default(),
            reward_bikes_available: row.reward_bikes_available.unwrap_or_default(),
            reward_docks_available: row.reward_docks_available.unwrap_or_default(),
            kiosk_status: row.kiosk_status.clone().unwrap_or_default(),
            kiosk_public_status: row.kiosk_public_status.clone().unwrap_or_default(),
            kiosk_connection_status: row.kiosk_connection_status.clone().unwrap_or_default(),
            kiosk_type: row.kiosk_type.unwrap_or_default(),
            address_street: row.address_street.clone().unwrap_or_default(),
            address_city: row.address_city.clone().unwrap_or_default(),
            address_state: row.address_state.clone().unwrap_or_default(),
            address_zip_code: row.address_zip_code.clone().unwrap_or_default(),
            bikes: Vec::new(),
            close_time: row.close_time.clone(),
            event_end: row.event_end.clone(),
            event_start: row.event_start.clone(),
            is_event_based: row.is_event_based.unwrap_or_default(),
            is_virtual: row.is_virtual.unwrap_or_default(),
            kiosk_id: row.kiosk_id.unwrap_or_default(),
            notes: row.notes.clone(),
            open_time: row.open_time.clone(),
            public_text: row.public_text.clone(),
            time_zone: row.time_zone.clone(),
            trikes_available: row.trikes_available.unwrap_or_default(),
            latitude,
            longitude,
        };

        Self {
            geometry: Geometry {
                coordinates: vec![longitude, latitude],
                geometry_type: row.geometry_type.clone().unwrap_or_default(),
            },
            properties,
            feature_type: row.station_type.clone().unwrap_or_default(),
        }
    }
}
