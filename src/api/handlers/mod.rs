//! REST endpoint handlers organized by resource.

pub mod auth;
pub mod ingest;
pub mod stations;
pub mod system;

use axum::Router;
use axum::middleware;

use crate::api::middleware::require_api_token;
use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
///
/// Ingestion and station routes require the API token; session routes
/// do not.
pub fn routes(state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .merge(ingest::routes())
        .merge(stations::routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_token,
        ));

    Router::new().merge(auth::routes()).merge(protected)
}
