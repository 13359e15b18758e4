//! Point-in-time station handlers.

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{ApiResponse, AtQuery};
use crate::app_state::AppState;
use crate::domain::StationReport;
use crate::error::{ErrorResponse, ServiceError};

/// `GET /stations?at=` — Every station as of a snapshot time.
///
/// # Errors
///
/// Returns [`ServiceError::InvalidRequest`] if `at` is missing,
/// [`ServiceError::TimeFormat`] if it is unparsable, or a storage error.
#[utoipa::path(
    get,
    path = "/api/v1/stations",
    tag = "Stations",
    summary = "List stations at a time",
    description = "Reconstructs every station from the snapshot taken within the second starting at `at`, sorted by station id, each with current weather. An empty list means no snapshot matched.",
    params(AtQuery),
    security(("api_token" = [])),
    responses(
        (status = 200, description = "Reconstructed stations", body = ApiResponse<Vec<StationReport>>),
        (status = 400, description = "Missing or invalid `at`", body = ErrorResponse),
        (status = 403, description = "Missing or wrong API token", body = ErrorResponse),
    )
)]
pub async fn list_stations(
    State(state): State<AppState>,
    Query(query): Query<AtQuery>,
) -> Result<Json<ApiResponse<Vec<StationReport>>>, ServiceError> {
    let at = query.required()?;
    let reports = state.station_service.stations_at(at).await?;
    Ok(Json(ApiResponse::success(reports)))
}

/// `GET /stations/{kiosk_id}?at=` — One station as of a snapshot time.
///
/// A valid query that matches nothing answers `200` with no data.
///
/// # Errors
///
/// Returns [`ServiceError::InvalidRequest`] if `at` is missing or the
/// kiosk id is not numeric, [`ServiceError::TimeFormat`] if `at` is
/// unparsable, or a storage error.
#[utoipa::path(
    get,
    path = "/api/v1/stations/{kiosk_id}",
    tag = "Stations",
    summary = "Get one station at a time",
    description = "Reconstructs the station with the given kiosk id from the snapshot taken within the second starting at `at`, with current weather.",
    params(
        ("kiosk_id" = String, Path, description = "Feed-native kiosk id"),
        AtQuery,
    ),
    security(("api_token" = [])),
    responses(
        (status = 200, description = "Reconstructed station, or no data if none matched", body = ApiResponse<StationReport>),
        (status = 400, description = "Missing or invalid `at` or kiosk id", body = ErrorResponse),
        (status = 403, description = "Missing or wrong API token", body = ErrorResponse),
    )
)]
pub async fn get_station(
    State(state): State<AppState>,
    Path(kiosk_id): Path<String>,
    Query(query): Query<AtQuery>,
) -> Result<Json<ApiResponse<StationReport>>, ServiceError> {
    let at = query.required()?;
    match state.station_service.station_at(at, &kiosk_id).await {
        Ok(report) => Ok(Json(ApiResponse::success(report))),
        Err(e) if e.is_not_found() => {
            tracing::debug!(kiosk_id, at, "no snapshot for kiosk");
            Ok(Json(ApiResponse::message("Success")))
        }
        Err(e) => Err(e),
    }
}

/// Station routes (token-protected by the caller).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/stations", get(list_stations))
        .route("/stations/{kiosk_id}", get(get_station))
}
