//! Folding flat join rows into nested stations.
//!
//! The window query returns one row per (station, bike) pair, or a single
//! row with NULL bike columns for a station without bikes. Folding runs in
//! two passes:
//!
//! 1. group rows by surrogate identifier, keeping first-seen order;
//! 2. convert each group into one [`StationFeature`] with its bike list.
//!
//! Every row of a group must carry the same station columns. A mismatch
//! means the snapshot tables are corrupt and is reported instead of
//! silently keeping the first row.

use std::collections::HashMap;

use super::models::{BikeColumns, JoinedRow, StationRow};
use crate::domain::{Bike, StationFeature};
use crate::error::ServiceError;

/// All join rows belonging to one station row.
#[derive(Debug, Clone, PartialEq)]
pub struct StationGroup {
    /// Station columns, shared by every row of the group.
    pub station: StationRow,
    /// Bike columns of each row, in query order.
    pub bikes: Vec<BikeColumns>,
}

impl StationGroup {
    /// Surrogate identifier of the group.
    #[must_use]
    pub const fn uid(&self) -> i32 {
        self.station.uid
    }

    /// Builds the feature, attaching every bike row that carries data.
    #[must_use]
    pub fn to_feature(&self) -> StationFeature {
        let mut feature = StationFeature::from(&self.station);
        feature.properties.bikes = attached_bikes(&self.bikes).collect();
        feature
    }
}

/// First pass: groups rows by surrogate identifier in first-seen order.
///
/// # Errors
///
/// Returns [`ServiceError::InconsistentSnapshot`] if two rows with the
/// same identifier disagree on any station column.
pub fn group_rows(rows: Vec<JoinedRow>) -> Result<Vec<StationGroup>, ServiceError> {
    let mut index: HashMap<i32, usize> = HashMap::new();
    let mut groups: Vec<StationGroup> = Vec::new();

    for row in rows {
        let uid = row.station.uid;
        let existing = index.get(&uid).and_then(|&pos| groups.get_mut(pos));
        match existing {
            Some(group) => {
                if group.station != row.station {
                    return Err(ServiceError::InconsistentSnapshot { uid });
                }
                group.bikes.push(row.bike);
            }
            None => {
                index.insert(uid, groups.len());
                groups.push(StationGroup {
                    station: row.station,
                    bikes: vec![row.bike],
                });
            }
        }
    }

    Ok(groups)
}

/// Folds rows into stations sorted ascending by feed-native station id.
///
/// Stations sharing an id keep their query order.
///
/// # Errors
///
/// Propagates [`group_rows`] failures.
pub fn fold_station_list(rows: Vec<JoinedRow>) -> Result<Vec<StationFeature>, ServiceError> {
    let mut features: Vec<StationFeature> = group_rows(rows)?
        .iter()
        .map(StationGroup::to_feature)
        .collect();
    features.sort_by_key(|f| f.properties.id);
    Ok(features)
}

/// Folds rows for a single kiosk into one station.
///
/// The first group supplies the station columns; bikes from every group
/// are appended in query order. Returns `None` for zero rows.
///
/// # Errors
///
/// Propagates [`group_rows`] failures.
pub fn fold_single_station(rows: Vec<JoinedRow>) -> Result<Option<StationFeature>, ServiceError> {
    let groups = group_rows(rows)?;
    let Some((first, rest)) = groups.split_first() else {
        return Ok(None);
    };

    if !rest.is_empty() {
        tracing::warn!(
            uid = first.uid(),
            extra_rows = rest.len(),
            "multiple station rows share one kiosk and snapshot time"
        );
    }

    let mut feature = StationFeature::from(&first.station);
    feature.properties.bikes = groups
        .iter()
        .flat_map(|group| attached_bikes(&group.bikes))
        .collect();
    Ok(Some(feature))
}

fn attached_bikes(cols: &[BikeColumns]) -> impl Iterator<Item = Bike> + '_ {
    cols.iter()
        .map(|&c| Bike::from(c))
        .filter(Bike::has_data)
}
