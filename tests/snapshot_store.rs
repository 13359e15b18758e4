//! PostgreSQL integration tests for the snapshot store.
//!
//! Run against a disposable database:
//!
//! ```text
//! TEST_DATABASE_URL=postgres://postgres@localhost/indego_test cargo test --test snapshot_store
//! ```
//!
//! Without `TEST_DATABASE_URL` every test returns immediately. Each test
//! writes at its own random snapshot time, so tests can share a database
//! and run in parallel.

#![allow(clippy::panic)]

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use indego_history::domain::timestamp::CANONICAL_FORMAT;
use indego_history::domain::{
    Bike, FeedDocument, Geometry, ReconstructedStation, StationFeature, StationProperties,
};
use indego_history::error::ServiceError;
use indego_history::persistence::PostgresPersistence;

async fn store() -> Option<PostgresPersistence> {
    let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set; skipping");
        return None;
    };
    let Ok(pool) = PgPoolOptions::new().max_connections(4).connect(&url).await else {
        panic!("cannot connect to TEST_DATABASE_URL");
    };
    let store = PostgresPersistence::new(pool);
    if let Err(e) = store.ensure_schema().await {
        panic!("schema bootstrap failed: {e}");
    }
    Some(store)
}

/// A whole-second instant no other test run is likely to use.
fn unique_instant() -> NaiveDateTime {
    let offset = i64::try_from(Uuid::new_v4().as_u128() % 900_000_000).unwrap_or_default();
    let Some(base) = NaiveDate::from_ymd_opt(1990, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0))
    else {
        panic!("valid base date");
    };
    base + TimeDelta::seconds(offset)
}

fn canonical(at: NaiveDateTime) -> String {
    at.format(CANONICAL_FORMAT).to_string()
}

fn bike(dock: i32, battery: Option<i32>) -> Bike {
    Bike {
        dock_number: Some(dock),
        is_electric: Some(battery.is_some()),
        is_available: Some(true),
        battery,
    }
}

fn station(id: i32, bikes: Vec<Bike>) -> StationFeature {
    let (lng, lat) = (-75.16 + f64::from(id % 100) / 1000.0, 39.95);
    StationFeature {
        geometry: Geometry {
            coordinates: vec![lng, lat],
            geometry_type: "Point".to_string(),
        },
        properties: StationProperties {
            id,
            kiosk_id: id,
            name: format!("Station {id}"),
            coordinates: vec![lng, lat],
            total_docks: 20,
            docks_available: 20 - i32::try_from(bikes.len()).unwrap_or_default(),
            bikes_available: i32::try_from(bikes.len()).unwrap_or_default(),
            kiosk_status: "FullService".to_string(),
            address_city: "Philadelphia".to_string(),
            time_zone: Some("Eastern Standard Time".to_string()),
            latitude: lat,
            longitude: lng,
            bikes,
            ..StationProperties::default()
        },
        feature_type: "Feature".to_string(),
    }
}

fn document(last_updated: String, features: Vec<StationFeature>) -> FeedDocument {
    FeedDocument {
        last_updated,
        features,
    }
}

fn station_ids(stations: &[ReconstructedStation]) -> Vec<i32> {
    stations.iter().map(ReconstructedStation::station_id).collect()
}

fn bike_count(stations: &[ReconstructedStation]) -> usize {
    stations
        .iter()
        .map(|s| s.station.properties.bikes.len())
        .sum()
}

#[tokio::test]
async fn ensure_schema_is_idempotent() {
    let Some(store) = store().await else { return };
    assert!(store.ensure_schema().await.is_ok());
    assert!(store.ensure_schema().await.is_ok());
}

#[tokio::test]
async fn write_then_list_returns_every_station_and_bike() {
    let Some(store) = store().await else { return };
    let at = unique_instant();
    let features = vec![
        station(3001, vec![bike(1, Some(80)), bike(2, None)]),
        station(3002, Vec::new()),
        station(3003, vec![bike(5, None), bike(3, Some(15)), bike(4, None)]),
    ];
    let last_updated = format!("{}.051Z", at.format("%Y-%m-%dT%H:%M:%S"));

    let Ok(receipt) = store.write_snapshot(&document(last_updated, features)).await else {
        panic!("write failed");
    };
    assert_eq!(receipt.stations, 3);
    assert_eq!(receipt.bikes, 5);
    assert_eq!(receipt.snapshot_time.canonical(), canonical(at));

    let Ok(stations) = store.list_stations(&canonical(at)).await else {
        panic!("list failed");
    };
    assert_eq!(station_ids(&stations), vec![3001, 3002, 3003]);
    assert_eq!(bike_count(&stations), 5);
    assert!(stations.iter().all(|s| s.at == canonical(at)));

    let docks: Vec<Vec<Option<i32>>> = stations
        .iter()
        .map(|s| {
            s.station
                .properties
                .bikes
                .iter()
                .map(|b| b.dock_number)
                .collect()
        })
        .collect();
    assert_eq!(
        docks,
        vec![
            vec![Some(1), Some(2)],
            Vec::new(),
            vec![Some(3), Some(4), Some(5)],
        ]
    );

    let Some(first) = stations.first() else {
        panic!("stations expected");
    };
    assert_eq!(first.station.properties.name, "Station 3001");
    assert_eq!(first.station.geometry.coordinates.len(), 2);
    assert_eq!(
        first.station.properties.time_zone.as_deref(),
        Some("Eastern Standard Time")
    );
}

#[tokio::test]
async fn repeated_reads_are_identical() {
    let Some(store) = store().await else { return };
    let at = unique_instant();
    let features = vec![
        station(3010, vec![bike(2, None), bike(1, Some(50))]),
        station(3009, vec![bike(7, None)]),
    ];
    if let Err(e) = store.write_snapshot(&document(canonical(at), features)).await {
        panic!("write failed: {e}");
    }

    let (Ok(first), Ok(second)) = (
        store.list_stations(&canonical(at)).await,
        store.list_stations(&canonical(at)).await,
    ) else {
        panic!("list failed");
    };
    assert_eq!(first, second);
}

#[tokio::test]
async fn list_is_sorted_by_station_id() {
    let Some(store) = store().await else { return };
    let at = unique_instant();
    let features = vec![
        station(3020, Vec::new()),
        station(3004, vec![bike(1, None)]),
        station(3011, Vec::new()),
        station(3001, Vec::new()),
    ];
    if let Err(e) = store.write_snapshot(&document(canonical(at), features)).await {
        panic!("write failed: {e}");
    }

    let Ok(stations) = store.list_stations(&canonical(at)).await else {
        panic!("list failed");
    };
    assert_eq!(station_ids(&stations), vec![3001, 3004, 3011, 3020]);
}

#[tokio::test]
async fn bikes_without_any_field_are_dropped() {
    let Some(store) = store().await else { return };
    let at = unique_instant();
    let battery_only = Bike {
        battery: Some(12),
        ..Bike::default()
    };
    let features = vec![station(3030, vec![Bike::default(), battery_only])];
    let Ok(receipt) = store.write_snapshot(&document(canonical(at), features)).await else {
        panic!("write failed");
    };
    assert_eq!(receipt.bikes, 2);

    let Ok(found) = store.get_station(&canonical(at), "3030").await else {
        panic!("station expected");
    };
    assert_eq!(found.station.properties.bikes, vec![battery_only]);
}

#[tokio::test]
async fn window_includes_exact_second_and_excludes_neighbours() {
    let Some(store) = store().await else { return };
    let at = unique_instant();
    let next = at + TimeDelta::seconds(1);
    let fractional = format!("{}.999", canonical(at));

    if let Err(e) = store
        .write_snapshot(&document(fractional, vec![station(3040, Vec::new())]))
        .await
    {
        panic!("write failed: {e}");
    }
    if let Err(e) = store
        .write_snapshot(&document(canonical(next), vec![station(3041, Vec::new())]))
        .await
    {
        panic!("write failed: {e}");
    }

    let Ok(at_list) = store.list_stations(&canonical(at)).await else {
        panic!("list failed");
    };
    assert_eq!(station_ids(&at_list), vec![3040]);

    let Ok(next_list) = store.list_stations(&canonical(next)).await else {
        panic!("list failed");
    };
    assert_eq!(station_ids(&next_list), vec![3041]);

    let before = canonical(at - TimeDelta::seconds(1));
    let Ok(before_list) = store.list_stations(&before).await else {
        panic!("list failed");
    };
    assert!(before_list.is_empty());
}

#[tokio::test]
async fn offset_timestamps_store_their_wall_clock() {
    let Some(store) = store().await else { return };
    let at = unique_instant();
    let with_offset = format!("{}-05:00", at.format("%Y-%m-%dT%H:%M:%S"));
    if let Err(e) = store
        .write_snapshot(&document(with_offset.clone(), vec![station(3050, Vec::new())]))
        .await
    {
        panic!("write failed: {e}");
    }

    let Ok(stations) = store.list_stations(&with_offset).await else {
        panic!("list failed");
    };
    assert_eq!(station_ids(&stations), vec![3050]);
    assert_eq!(stations.first().map(|s| s.at.clone()), Some(canonical(at)));
}

#[tokio::test]
async fn get_station_finds_kiosk_or_reports_not_found() {
    let Some(store) = store().await else { return };
    let at = unique_instant();
    let features = vec![
        station(3060, vec![bike(9, None), bike(3, Some(40))]),
        station(3061, vec![bike(1, None)]),
    ];
    if let Err(e) = store.write_snapshot(&document(canonical(at), features)).await {
        panic!("write failed: {e}");
    }

    let Ok(found) = store.get_station(&canonical(at), "3060").await else {
        panic!("station expected");
    };
    assert_eq!(found.station.properties.kiosk_id, 3060);
    let docks: Vec<Option<i32>> = found
        .station
        .properties
        .bikes
        .iter()
        .map(|b| b.dock_number)
        .collect();
    assert_eq!(docks, vec![Some(3), Some(9)]);

    let missing_kiosk = store.get_station(&canonical(at), "999999").await;
    assert!(matches!(missing_kiosk, Err(ref e) if e.is_not_found()));

    let missing_time = store
        .get_station(&canonical(at + TimeDelta::seconds(1)), "3060")
        .await;
    assert!(matches!(missing_time, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn reader_input_errors() {
    let Some(store) = store().await else { return };
    assert!(matches!(
        store.list_stations("not a time").await,
        Err(ServiceError::TimeFormat(_))
    ));
    assert!(matches!(
        store.get_station("2024-11-08 07:30:11", "kiosk").await,
        Err(ServiceError::InvalidRequest(_))
    ));
}

#[tokio::test]
async fn empty_snapshot_is_a_no_op() {
    let Some(store) = store().await else { return };
    let at = unique_instant();
    let Ok(receipt) = store.write_snapshot(&document(canonical(at), Vec::new())).await else {
        panic!("empty write should succeed");
    };
    assert_eq!((receipt.stations, receipt.bikes), (0, 0));

    let Ok(stations) = store.list_stations(&canonical(at)).await else {
        panic!("list failed");
    };
    assert!(stations.is_empty());
}

#[tokio::test]
async fn malformed_coordinates_write_nothing() {
    let Some(store) = store().await else { return };
    let at = unique_instant();
    let mut broken = station(3071, vec![bike(1, None)]);
    broken.properties.coordinates = vec![-75.16, 39.95, 12.0];
    let features = vec![station(3070, vec![bike(2, None)]), broken];

    let result = store.write_snapshot(&document(canonical(at), features)).await;
    assert!(matches!(
        result,
        Err(ServiceError::Coordinate {
            station_id: 3071,
            len: 3
        })
    ));

    let Ok(stations) = store.list_stations(&canonical(at)).await else {
        panic!("list failed");
    };
    assert!(stations.is_empty());
}

#[tokio::test]
async fn failed_bike_insert_rolls_back_stations() {
    let Some(store) = store().await else { return };
    let at = unique_instant();
    let sentinel = -4242;
    let constraint = format!("bikes_reject_sentinel_{}", Uuid::new_v4().simple());

    let add = format!(
        "ALTER TABLE bikes ADD CONSTRAINT {constraint} \
         CHECK (battery IS NULL OR battery <> {sentinel}) NOT VALID"
    );
    if let Err(e) = sqlx::query(&add).execute(store.pool()).await {
        panic!("cannot add constraint: {e}");
    }

    let features = vec![
        station(3080, vec![bike(1, Some(90))]),
        station(3081, vec![bike(2, Some(sentinel))]),
    ];
    let result = store.write_snapshot(&document(canonical(at), features)).await;

    let drop = format!("ALTER TABLE bikes DROP CONSTRAINT IF EXISTS {constraint}");
    if let Err(e) = sqlx::query(&drop).execute(store.pool()).await {
        panic!("cannot drop constraint: {e}");
    }

    assert!(matches!(
        result,
        Err(ServiceError::Transaction {
            stage: "bike insert",
            ..
        })
    ));

    let Ok(stations) = store.list_stations(&canonical(at)).await else {
        panic!("list failed");
    };
    assert!(stations.is_empty());
}
