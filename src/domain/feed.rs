//! Decoded station telemetry feed (GeoJSON feature collection).
//!
//! The same feature shape is used on the read side: a reconstructed
//! station is served back to clients as a [`StationFeature`].

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// One feed document: every station as of a single `last_updated` instant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedDocument {
    /// The feed's reported last-updated timestamp, shared by every station.
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_updated: String,
    /// Station entries in feed order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub features: Vec<StationFeature>,
}

/// A single station as a GeoJSON feature.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StationFeature {
    /// Point geometry of the station.
    #[serde(default)]
    pub geometry: Geometry,
    /// Station attributes and docked bikes.
    #[serde(default)]
    pub properties: StationProperties,
    /// GeoJSON feature type (normally `"Feature"`).
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub feature_type: String,
}

/// GeoJSON point geometry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Geometry {
    /// `[longitude, latitude]`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub coordinates: Vec<f64>,
    /// GeoJSON geometry type (normally `"Point"`).
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub geometry_type: String,
}

/// Station attributes as published by the feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct StationProperties {
    /// Feed-native station id.
    #[serde(deserialize_with = "null_as_default")]
    pub id: i32,
    /// Display name.
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    /// `[longitude, latitude]`; must hold exactly two values.
    #[serde(deserialize_with = "null_as_default")]
    pub coordinates: Vec<f64>,
    /// Total docks at the station.
    #[serde(deserialize_with = "null_as_default")]
    pub total_docks: i32,
    /// Empty docks.
    #[serde(deserialize_with = "null_as_default")]
    pub docks_available: i32,
    /// Bikes available for rent.
    #[serde(deserialize_with = "null_as_default")]
    pub bikes_available: i32,
    /// Classic bikes available.
    #[serde(deserialize_with = "null_as_default")]
    pub classic_bikes_available: i32,
    /// Smart bikes available.
    #[serde(deserialize_with = "null_as_default")]
    pub smart_bikes_available: i32,
    /// Electric bikes available.
    #[serde(deserialize_with = "null_as_default")]
    pub electric_bikes_available: i32,
    /// Reward bikes available.
    #[serde(deserialize_with = "null_as_default")]
    pub reward_bikes_available: i32,
    /// Reward docks available.
    #[serde(deserialize_with = "null_as_default")]
    pub reward_docks_available: i32,
    /// Operational kiosk status.
    #[serde(deserialize_with = "null_as_default")]
    pub kiosk_status: String,
    /// Public-facing kiosk status.
    #[serde(deserialize_with = "null_as_default")]
    pub kiosk_public_status: String,
    /// Kiosk connectivity status.
    #[serde(deserialize_with = "null_as_default")]
    pub kiosk_connection_status: String,
    /// Kiosk hardware type.
    #[serde(deserialize_with = "null_as_default")]
    pub kiosk_type: i32,
    /// Street address.
    #[serde(deserialize_with = "null_as_default")]
    pub address_street: String,
    /// City.
    #[serde(deserialize_with = "null_as_default")]
    pub address_city: String,
    /// State.
    #[serde(deserialize_with = "null_as_default")]
    pub address_state: String,
    /// Postal code.
    #[serde(deserialize_with = "null_as_default")]
    pub address_zip_code: String,
    /// Docked bikes. Empty for stations reporting none.
    #[serde(deserialize_with = "null_as_default")]
    pub bikes: Vec<Bike>,
    /// Closing time, verbatim from the feed.
    pub close_time: Option<String>,
    /// End of the event window for event-based stations.
    pub event_end: Option<String>,
    /// Start of the event window for event-based stations.
    pub event_start: Option<String>,
    /// Whether the station only operates during events.
    #[serde(deserialize_with = "null_as_default")]
    pub is_event_based: bool,
    /// Whether the station is virtual (no physical docks).
    #[serde(deserialize_with = "null_as_default")]
    pub is_virtual: bool,
    /// Feed-native kiosk id, used to link bikes to their station row.
    #[serde(deserialize_with = "null_as_default")]
    pub kiosk_id: i32,
    /// Operator notes.
    pub notes: Option<String>,
    /// Opening time, verbatim from the feed.
    pub open_time: Option<String>,
    /// Public announcement text.
    pub public_text: Option<String>,
    /// IANA time zone of the station.
    pub time_zone: Option<String>,
    /// Trikes available.
    #[serde(deserialize_with = "null_as_default")]
    pub trikes_available: i32,
    /// Latitude.
    #[serde(deserialize_with = "null_as_default")]
    pub latitude: f64,
    /// Longitude.
    #[serde(deserialize_with = "null_as_default")]
    pub longitude: f64,
}

impl StationProperties {
    /// Splits `coordinates` into `(latitude, longitude)`.
    ///
    /// Returns `None` unless exactly two values are present.
    #[must_use]
    pub fn lat_lng(&self) -> Option<(f64, f64)> {
        match self.coordinates.as_slice() {
            [lng, lat] => Some((*lat, *lng)),
            _ => None,
        }
    }
}

/// A bike docked at a station. Any field may be unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Bike {
    /// Dock the bike occupies.
    #[serde(default)]
    pub dock_number: Option<i32>,
    /// Electric-assist bike.
    #[serde(default)]
    pub is_electric: Option<bool>,
    /// Available for rent.
    #[serde(default)]
    pub is_available: Option<bool>,
    /// Battery level in percent (electric bikes).
    #[serde(default)]
    pub battery: Option<i32>,
}

impl Bike {
    /// Returns `true` if at least one field is known.
    ///
    /// A left-joined row without a bike has all four fields unknown.
    #[must_use]
    pub const fn has_data(&self) -> bool {
        self.dock_number.is_some()
            || self.is_electric.is_some()
            || self.is_available.is_some()
            || self.battery.is_some()
    }
}

/// Deserializes JSON `null` as the type's default value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
