//! OpenAPI document for the REST API.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use super::handlers;
use crate::error::{ErrorBody, ErrorResponse};

/// Generated OpenAPI description of every endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "indego-history",
        description = "Point-in-time history of Indego bike-share station telemetry."
    ),
    paths(
        handlers::system::health_handler,
        handlers::auth::check_auth,
        handlers::auth::login,
        handlers::auth::logout,
        handlers::ingest::ingest,
        handlers::stations::list_stations,
        handlers::stations::get_station,
    ),
    components(schemas(ErrorResponse, ErrorBody)),
    modifiers(&ApiTokenScheme),
    tags(
        (name = "System", description = "Liveness"),
        (name = "Auth", description = "Login sessions"),
        (name = "Ingestion", description = "Feed snapshots"),
        (name = "Stations", description = "Point-in-time station reads"),
    )
)]
pub struct ApiDoc;

/// Registers the `Token` header scheme used by protected routes.
#[derive(Debug)]
struct ApiTokenScheme;

impl Modify for ApiTokenScheme {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_token",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("Token"))),
            );
        }
    }
}
