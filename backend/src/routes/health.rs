//! Health check endpoints
//!
//! `/health` and `/health/live` answer as long as the process runs;
//! `/health/ready` also pings the log store's database.

use crate::{db, state::AppState};
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

const SERVICE_NAME: &str = "engagement-drift";

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<ReadinessChecks>,
}

impl HealthResponse {
    fn new(status: &'static str) -> Self {
        Self {
            status,
            service: SERVICE_NAME,
            version: env!("CARGO_PKG_VERSION"),
            checks: None,
        }
    }
}

#[derive(Serialize)]
pub struct ReadinessChecks {
    /// Backing database of the log/nudge store
    pub store: CheckStatus,
    /// Whether `/metrics` has a recorder behind it; informational only
    pub metrics: CheckStatus,
}

#[derive(Serialize)]
pub struct CheckStatus {
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CheckStatus {
    fn ok() -> Self {
        Self {
            healthy: true,
            message: None,
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            healthy: false,
            message: Some(message.into()),
        }
    }
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::new("healthy"))
}

/// Readiness probe; 503 while the store's database is unreachable
pub async fn readiness_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let store = match db::health_check(state.db()).await {
        Ok(()) => CheckStatus::ok(),
        Err(e) => CheckStatus::failed(e.to_string()),
    };
    let metrics = if state.metrics.is_some() {
        CheckStatus::ok()
    } else {
        CheckStatus::failed("recorder not installed")
    };

    let ready = store.healthy;
    let mut response = HealthResponse::new(if ready { "ready" } else { "not_ready" });
    response.checks = Some(ReadinessChecks { store, metrics });

    if ready {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

pub async fn liveness_check() -> Json<HealthResponse> {
    Json(HealthResponse::new("alive"))
}
