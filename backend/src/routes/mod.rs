//! Route definitions for the Engagement Drift API
//!
//! This module organizes all API routes and applies middleware.

use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    http::{header, Method},
    routing::get,
    Router,
};
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

mod drift;
mod health;
mod logs;
mod metrics;
mod nudges;
mod plan;

pub use drift::drift_routes;
pub use logs::log_routes;
pub use nudges::nudge_routes;
pub use plan::plan_routes;

/// Create the main application router with all middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/health/live", get(health::liveness_check))
        .route("/metrics", get(metrics::render_metrics))
        .nest("/api/v1", api_routes())
        .fallback(|| async { ApiError::NotFound("No such route".to_string()) })
        // Apply middleware layers
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::PATCH])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// API v1 routes, all bearer-authenticated
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { "Engagement Drift API v1" }))
        .nest("/drift", drift::drift_routes())
        .nest("/plan", plan::plan_routes())
        .nest("/logs", logs::log_routes())
        .nest("/nudges", nudges::nudge_routes())
}
