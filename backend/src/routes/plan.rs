//! Adaptive plan API routes

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::services::PlanService;
use crate::state::AppState;
use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use engagement_drift_shared::plan::PlanExport;
use engagement_drift_shared::RestoreCheckResponse;

pub fn plan_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_plan))
        .route("/restore-check", get(restore_check))
}

/// GET /api/v1/plan - Current plan with disclaimer and privacy note
async fn get_plan(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<PlanExport>, ApiError> {
    let export = PlanService::export(state.store(), state.core(), auth.user_id, Utc::now()).await?;
    Ok(Json(export))
}

/// GET /api/v1/plan/restore-check - Whether a scheduler should restore the plan
async fn restore_check(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<RestoreCheckResponse>, ApiError> {
    let check =
        PlanService::restore_check(state.store(), state.core(), auth.user_id, Utc::now()).await?;
    Ok(Json(check))
}
