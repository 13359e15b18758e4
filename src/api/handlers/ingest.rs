//! Manual ingestion trigger.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{ApiResponse, MessageResponse};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, ServiceError};

/// `POST /indego-data-fetch-and-store-it-db` — Fetch the feed and store a
/// snapshot now.
///
/// # Errors
///
/// Returns [`ServiceError`] if the feed is unavailable or the snapshot
/// write fails.
#[utoipa::path(
    post,
    path = "/api/v1/indego-data-fetch-and-store-it-db",
    tag = "Ingestion",
    summary = "Ingest the station feed",
    description = "Downloads the current station feed and stores it as one snapshot. Returns the snapshot time to query it back with.",
    security(("api_token" = [])),
    responses(
        (status = 200, description = "Snapshot stored; data is its canonical time", body = MessageResponse),
        (status = 403, description = "Missing or wrong API token", body = ErrorResponse),
        (status = 500, description = "Snapshot write failed", body = ErrorResponse),
        (status = 502, description = "Feed unavailable or malformed", body = ErrorResponse),
    )
)]
pub async fn ingest(State(state): State<AppState>) -> Result<Json<MessageResponse>, ServiceError> {
    let receipt = state.station_service.ingest().await?;
    Ok(Json(ApiResponse::ok_with(
        "Indego data fetch and store successfully",
        receipt.snapshot_time.canonical(),
    )))
}

/// Ingestion routes (token-protected by the caller).
pub fn routes() -> Router<AppState> {
    Router::new().route("/indego-data-fetch-and-store-it-db", post(ingest))
}
