//! Activity log API routes

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::services::LogService;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use chrono::Utc;
use engagement_drift_shared::{CreateLogRequest, CreateLogResponse, LogsQuery, LogsResponse};

pub fn log_routes() -> Router<AppState> {
    Router::new().route("/", post(create_log).get(list_logs))
}

/// POST /api/v1/logs - Append a log entry
async fn create_log(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateLogRequest>,
) -> Result<(StatusCode, Json<CreateLogResponse>), ApiError> {
    let response = LogService::create(state.db(), auth.user_id, req, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/v1/logs?days=&limit=&offset=&log_type= - Recent log history
async fn list_logs(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<LogsQuery>,
) -> Result<Json<LogsResponse>, ApiError> {
    let response = LogService::list(state.db(), auth.user_id, query, Utc::now()).await?;
    Ok(Json(response))
}
