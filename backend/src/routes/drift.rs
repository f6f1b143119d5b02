//! Drift analysis API routes

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::services::{DriftService, InsightsService};
use crate::state::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use engagement_drift_shared::export::{export_analysis, AnalysisExport};
use engagement_drift_shared::{DriftAnalyzeResponse, InsightsResponse};

/// Create drift routes
pub fn drift_routes() -> Router<AppState> {
    Router::new()
        .route("/analyze", post(analyze))
        .route("/insights", get(insights))
        .route("/export", get(export))
}

/// POST /api/v1/drift/analyze - Live analysis of the last 14 days of logs
///
/// Persists the drift event (when drift is detected) and the selected nudge.
async fn analyze(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<DriftAnalyzeResponse>, ApiError> {
    let mut random = state.random();
    let response =
        DriftService::analyze(state.store(), state.core(), &mut random, auth.user_id, Utc::now())
            .await?;
    Ok(Json(response))
}

/// GET /api/v1/drift/insights - Windowed analysis, rule-based nudges and plan
async fn insights(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<InsightsResponse>, ApiError> {
    let insights =
        InsightsService::insights(state.store(), state.core(), auth.user_id, Utc::now()).await?;
    Ok(Json(insights))
}

/// GET /api/v1/drift/export - Shareable summary of the windowed analysis
async fn export(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<AnalysisExport>, ApiError> {
    let now = Utc::now();
    let insights = InsightsService::insights(state.store(), state.core(), auth.user_id, now).await?;
    Ok(Json(export_analysis(&insights.analysis, now)))
}
