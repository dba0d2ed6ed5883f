//! HTTP interface of the emergency vehicle router

pub mod config;
mod error;
mod routes;

use std::sync::Arc;

use axum::error_handling::HandleErrorLayer;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{BoxError, Json, Router};
use sirena_core::RoutingService;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::{AppConfig, ConfigError, ServerConfig};
pub use error::{ApiError, ErrorResponse};

pub type AppState = Arc<RoutingService>;

/// Builds the router with its middleware stack
pub fn app(state: AppState, config: &ServerConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(routes::root))
        .route("/health", get(routes::health))
        .route("/route_ambulance", post(routes::route_ambulance))
        .route("/traffic_snapshot", post(routes::traffic_snapshot))
        .route("/reroute_check", post(routes::reroute_check))
        .route("/vehicles/{id}/route.geojson", get(routes::route_geojson))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .timeout(config.request_timeout())
                .concurrency_limit(config.concurrency_limit),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn handle_middleware_error(error: BoxError) -> (StatusCode, Json<ErrorResponse>) {
    let status = if error.is::<tower::timeout::error::Elapsed>() {
        StatusCode::REQUEST_TIMEOUT
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
}
