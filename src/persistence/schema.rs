//! Idempotent creation of the snapshot tables.
//!
//! Safe to run on every start: every statement is `IF NOT EXISTS`.

use sqlx::PgPool;

use crate::error::ServiceError;

const CREATE_STATIONS: &str = r#"
CREATE TABLE IF NOT EXISTS stations (
    uid SERIAL PRIMARY KEY,
    id INT NOT NULL,
    name VARCHAR(255),
    latitude DOUBLE PRECISION,
    longitude DOUBLE PRECISION,
    geometry_type VARCHAR(255),
    total_docks INT,
    docks_available INT,
    bikes_available INT,
    classic_bikes_available INT,
    smart_bikes_available INT,
    electric_bikes_available INT,
    reward_bikes_available INT,
    reward_docks_available INT,
    kiosk_status VARCHAR(255),
    kiosk_public_status VARCHAR(255),
    kiosk_connection_status VARCHAR(255),
    kiosk_type INT,
    address_street VARCHAR(255),
    address_city VARCHAR(255),
    address_state VARCHAR(255),
    address_zip_code VARCHAR(255),
    open_time VARCHAR(255),
    close_time VARCHAR(255),
    event_start VARCHAR(255),
    event_end VARCHAR(255),
    is_event_based BOOLEAN,
    is_virtual BOOLEAN,
    kiosk_id INT,
    notes TEXT,
    public_text TEXT,
    time_zone VARCHAR(255),
    trikes_available INT,
    station_type VARCHAR(255),
    updated_at TIMESTAMP,
    created_at TIMESTAMP
)
"#;

const CREATE_BIKES: &str = r#"
CREATE TABLE IF NOT EXISTS bikes (
    uid SERIAL PRIMARY KEY,
    station_id INT,
    dock_number INT,
    is_electric BOOLEAN,
    is_available BOOLEAN,
    battery INT,
    created_at TIMESTAMP,
    FOREIGN KEY (station_id) REFERENCES stations (uid)
)
"#;

/// Advisory lock key serializing concurrent bootstraps.
const SCHEMA_LOCK_KEY: i64 = 0x1d3_6005;

const CREATE_INDEXES: [&str; 3] = [
    "CREATE INDEX IF NOT EXISTS idx_updated_at ON stations (updated_at)",
    "CREATE INDEX IF NOT EXISTS idx_kiosk_id ON stations (kiosk_id)",
    "CREATE INDEX IF NOT EXISTS idx_bikes_station_id ON bikes (station_id)",
];

/// Creates the `stations` and `bikes` tables and their indexes if missing.
///
/// # Errors
///
/// Returns [`ServiceError::Schema`] if the database is unreachable or
/// rejects the DDL. Callers treat this as fatal.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), ServiceError> {
    let mut tx = pool.begin().await.map_err(ServiceError::Schema)?;

    // Concurrent `CREATE TABLE IF NOT EXISTS` can still collide in the catalog.
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(SCHEMA_LOCK_KEY)
        .execute(&mut *tx)
        .await
        .map_err(ServiceError::Schema)?;

    sqlx::query(CREATE_STATIONS)
        .execute(&mut *tx)
        .await
        .map_err(ServiceError::Schema)?;

    sqlx::query(CREATE_BIKES)
        .execute(&mut *tx)
        .await
        .map_err(ServiceError::Schema)?;

    for statement in CREATE_INDEXES {
        sqlx::query(statement)
            .execute(&mut *tx)
            .await
            .map_err(ServiceError::Schema)?;
    }

    tx.commit().await.map_err(ServiceError::Schema)?;
    tracing::info!("snapshot schema ready");
    Ok(())
}
