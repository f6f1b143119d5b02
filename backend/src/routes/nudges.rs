//! Nudge inbox API routes

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::services::NudgeService;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use engagement_drift_shared::{MarkReadRequest, MarkReadResponse, NudgesQuery, NudgesResponse};

pub fn nudge_routes() -> Router<AppState> {
    Router::new().route("/", get(list_nudges).patch(mark_read))
}

/// GET /api/v1/nudges?limit=&unread= - Newest nudges first
async fn list_nudges(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<NudgesQuery>,
) -> Result<Json<NudgesResponse>, ApiError> {
    let response = NudgeService::list(state.db(), auth.user_id, query).await?;
    Ok(Json(response))
}

/// PATCH /api/v1/nudges - Mark nudges read
async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<MarkReadRequest>,
) -> Result<Json<MarkReadResponse>, ApiError> {
    let response = NudgeService::mark_read(state.db(), auth.user_id, req).await?;
    Ok(Json(response))
}
