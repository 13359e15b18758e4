//! REST API layer: route handlers, DTOs, and router composition.
//!
//! Resource endpoints are mounted under `/api/v1`; `/health` sits at the
//! root.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod openapi;

use std::time::Duration;

use axum::Router;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, HeaderValue, Method, StatusCode};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::config::ServiceConfig;

/// Builds the complete API router with all REST endpoints.
pub fn build_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .nest("/api/v1", handlers::routes(state))
        .merge(handlers::system::routes())
}

/// Builds the served application: routes, docs, and the HTTP layers.
pub fn build_app(state: AppState, config: &ServiceConfig) -> Router {
    let router = build_router(&state);

    #[cfg(feature = "swagger-ui")]
    let router = {
        use utoipa::OpenApi;
        router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", openapi::ApiDoc::openapi()),
        )
    };

    router
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.cors_allowed_origin))
        .with_state(state)
}

/// CORS for the single configured front-end origin.
fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            CONTENT_TYPE,
            HeaderName::from_static(middleware::API_TOKEN_HEADER),
            HeaderName::from_static(middleware::SESSION_TOKEN_HEADER),
        ]);

    match HeaderValue::from_str(origin) {
        Ok(origin) => layer.allow_origin(origin),
        Err(e) => {
            tracing::warn!(origin, error = %e, "invalid CORS origin; cross-origin requests disabled");
            layer
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::Request;
    use axum::response::Response;
    use serde_json::Value;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use crate::persistence::PostgresPersistence;
    use crate::service::StationService;

    const TOKEN: &str = "bike001";

    /// App over a pool that never connects and a feed nobody serves.
    fn test_app() -> Router {
        let config = ServiceConfig {
            feed_url: "http://127.0.0.1:1/phl".to_string(),
            feed_timeout_secs: 2,
            ..ServiceConfig::default()
        };
        let Ok(pool) = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(500))
            .connect_lazy("postgres://nobody@127.0.0.1:1/none")
        else {
            panic!("lazy pool");
        };
        let store = PostgresPersistence::new(pool);
        let Ok(service) = StationService::from_config(store, &config) else {
            panic!("service build failed");
        };
        build_app(AppState::new(Arc::new(service), &config), &config)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let Ok(response) = app.clone().oneshot(request).await else {
            panic!("router is infallible");
        };
        body_json(response).await
    }

    async fn body_json(response: Response) -> (StatusCode, Value) {
        let status = response.status();
        let Ok(bytes) = axum::body::to_bytes(response.into_body(), usize::MAX).await else {
            panic!("body read failed");
        };
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    fn get(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header("Token", token);
        }
        let Ok(request) = builder.body(Body::empty()) else {
            panic!("request build failed");
        };
        request
    }

    fn login_request(username: &str, password: &str) -> Request<Body> {
        let Ok(request) = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/login")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!("username={username}&password={password}")))
        else {
            panic!("request build failed");
        };
        request
    }

    fn with_session(method: Method, uri: &str, token: &str) -> Request<Body> {
        let Ok(request) = Request::builder()
            .method(method)
            .uri(uri)
            .header("X-Session-Token", token)
            .body(Body::empty())
        else {
            panic!("request build failed");
        };
        request
    }

    #[tokio::test]
    async fn health_is_public() {
        let app = test_app();
        let (status, body) = send(&app, get("/health", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn protected_routes_need_token() {
        let app = test_app();
        for uri in ["/api/v1/stations?at=2024-11-08%2007:30:11", "/api/v1/stations/3005"] {
            let (status, body) = send(&app, get(uri, None)).await;
            assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
            assert_eq!(body["error"]["code"], 2003);

            let (status, _) = send(&app, get(uri, Some("wrong"))).await;
            assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
        }
    }

    #[tokio::test]
    async fn missing_at_is_bad_request() {
        let app = test_app();
        let (status, body) = send(&app, get("/api/v1/stations", Some(TOKEN))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], 1001);

        let (status, _) = send(&app, get("/api/v1/stations/3005?at=", Some(TOKEN))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unparsable_at_is_time_format_error() {
        let app = test_app();
        let (status, body) = send(&app, get("/api/v1/stations?at=yesterday", Some(TOKEN))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], 1002);
    }

    #[tokio::test]
    async fn non_numeric_kiosk_is_bad_request() {
        let app = test_app();
        let uri = "/api/v1/stations/abc?at=2024-11-08%2007:30:11";
        let (status, body) = send(&app, get(uri, Some(TOKEN))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], 1001);
    }

    #[tokio::test]
    async fn unreachable_database_is_query_error() {
        let app = test_app();
        let uri = "/api/v1/stations?at=2024-11-08%2007:30:11";
        let (status, body) = send(&app, get(uri, Some(TOKEN))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], 3003);
    }

    #[tokio::test]
    async fn single_station_reaches_the_store() {
        let app = test_app();
        let uri = "/api/v1/stations/3005?at=2024-11-08T07:30:11Z";
        let (status, body) = send(&app, get(uri, Some(TOKEN))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], 3003);
    }

    #[tokio::test]
    async fn last_representable_second_is_time_format_error() {
        let app = test_app();
        for uri in [
            "/api/v1/stations?at=%2B262142-12-31%2023:59:59",
            "/api/v1/stations/3005?at=%2B262142-12-31%2023:59:59",
        ] {
            let (status, body) = send(&app, get(uri, Some(TOKEN))).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body["error"]["code"], 1002, "{uri}");
        }
    }

    #[tokio::test]
    async fn ingest_reports_unreachable_feed() {
        let app = test_app();
        let Ok(request) = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/indego-data-fetch-and-store-it-db")
            .header("Token", TOKEN)
            .body(Body::empty())
        else {
            panic!("request build failed");
        };
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], 4002);
    }

    #[tokio::test]
    async fn session_lifecycle() {
        let app = test_app();

        let (status, body) = send(&app, login_request("user", "wrong")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], 2002);

        let (status, body) = send(&app, login_request("user", "123456")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Success");
        let Some(token) = body["data"]["token"].as_str().map(str::to_string) else {
            panic!("login should return a token");
        };

        let check = || with_session(Method::GET, "/api/v1/check-auth", &token);
        let (status, body) = send(&app, check()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Authorized");

        let (status, _) = send(&app, with_session(Method::POST, "/api/v1/logout", &token)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&app, check()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn check_auth_without_session_is_unauthorized() {
        let app = test_app();
        let (status, _) = send(&app, get("/api/v1/check-auth", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn cors_allows_configured_origin() {
        let app = test_app();
        let Ok(request) = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/v1/stations")
            .header("Origin", "http://localhost:5173")
            .header("Access-Control-Request-Method", "GET")
            .header("Access-Control-Request-Headers", "token")
            .body(Body::empty())
        else {
            panic!("request build failed");
        };
        let Ok(response) = app.oneshot(request).await else {
            panic!("router is infallible");
        };
        let allowed = response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok());
        assert_eq!(allowed, Some("http://localhost:5173"));
    }
}
