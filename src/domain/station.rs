//! Read-side view of a station as of a snapshot instant.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::feed::StationFeature;
use super::weather::Weather;

/// A station reassembled from snapshot rows, never persisted.
///
/// `at` is the canonical timestamp of the query that produced it. The
/// feature's bike list is ordered by dock number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReconstructedStation {
    /// Canonical `YYYY-MM-DD HH:MM:SS` query timestamp.
    pub at: String,
    /// Station attributes and docked bikes.
    #[serde(rename = "stations")]
    pub station: StationFeature,
}

impl ReconstructedStation {
    /// Feed-native station id.
    #[must_use]
    pub const fn station_id(&self) -> i32 {
        self.station.properties.id
    }

    /// Station `(latitude, longitude)`.
    #[must_use]
    pub const fn position(&self) -> (f64, f64) {
        (
            self.station.properties.latitude,
            self.station.properties.longitude,
        )
    }
}

/// A reconstructed station with the current weather at its position.
///
/// `weather` is `None` when no lookup was made or the lookup failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StationReport {
    /// The reconstructed station.
    #[serde(flatten)]
    pub snapshot: ReconstructedStation,
    /// Current weather at the station, if known.
    pub weather: Option<Weather>,
}

impl From<ReconstructedStation> for StationReport {
    fn from(snapshot: ReconstructedStation) -> Self {
        Self {
            snapshot,
            weather: None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::StationProperties;

    #[test]
    fn report_serializes_flat() {
        let snapshot = ReconstructedStation {
            at: "2024-11-08 07:30:11".to_string(),
            station: StationFeature {
                properties: StationProperties {
                    id: 3005,
                    latitude: 39.94,
                    longitude: -75.14,
                    ..StationProperties::default()
                },
                ..StationFeature::default()
            },
        };
        assert_eq!(snapshot.station_id(), 3005);
        assert_eq!(snapshot.position(), (39.94, -75.14));

        let Ok(value) = serde_json::to_value(StationReport::from(snapshot)) else {
            panic!("report should serialize");
        };
        assert_eq!(value["at"], "2024-11-08 07:30:11");
        assert_eq!(value["stations"]["properties"]["id"], 3005);
        assert!(value["weather"].is_null());
    }
}
