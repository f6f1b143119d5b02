//! Activity log service
//!
//! Log creation and paged history. Logs are append-only; nothing here
//! updates or deletes an entry.

use crate::error::ApiError;
use crate::repositories::{ActivityLogRecord, ActivityLogRepository, CreateActivityLog, LogFilter};
use chrono::{DateTime, Duration, Utc};
use engagement_drift_shared::validation::{
    validate_days, validate_limit, validate_log_timestamp, validate_log_value, MAX_LOGS_LIMIT,
};
use engagement_drift_shared::{
    CreateLogRequest, CreateLogResponse, LogCategory, LogEntry, LogsQuery, LogsResponse,
    LogsSummary, Pagination, ValidationError, LOGS_DISCLAIMER,
};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

/// Stored precision of log values
const VALUE_DECIMAL_PLACES: u32 = 2;

fn to_decimal(value: f64) -> Result<Decimal, ApiError> {
    Decimal::from_f64(value)
        .map(|d| d.round_dp(VALUE_DECIMAL_PLACES))
        .ok_or_else(|| ApiError::BadRequest("Value cannot be stored as a decimal".to_string()))
}

/// Convert a stored row; rows with an unknown type are dropped
fn to_entry(record: ActivityLogRecord) -> Option<LogEntry> {
    let log_type = match record.log_type.parse::<LogCategory>() {
        Ok(category) => category,
        Err(e) => {
            warn!(log_id = %record.id, error = %e, "Skipping log with unknown type");
            return None;
        }
    };

    Some(LogEntry {
        id: record.id,
        log_type,
        logged_at: record.logged_at,
        value: record.value.and_then(|v| v.to_f64()),
        notes: record.notes,
        created_at: record.created_at,
    })
}

/// Activity log service
pub struct LogService;

impl LogService {
    /// Validate and append one log entry
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        req: CreateLogRequest,
        now: DateTime<Utc>,
    ) -> Result<CreateLogResponse, ApiError> {
        req.validate()?;

        let logged_at = req.logged_at.unwrap_or(now);
        validate_log_timestamp(logged_at, now).map_err(|m| ValidationError::new("logged_at", m))?;
        validate_log_value(req.log_type, req.value).map_err(|m| ValidationError::new("value", m))?;

        let value = req.value.map(to_decimal).transpose()?;
        let notes = req
            .notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        let record = ActivityLogRepository::create(
            pool,
            CreateActivityLog {
                user_id,
                log_type: req.log_type.as_str().to_string(),
                logged_at,
                value,
                notes,
            },
        )
        .await
        .map_err(ApiError::Internal)?;

        info!(user_id = %user_id, log_type = %req.log_type, "Log created");

        let log = to_entry(record)
            .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("Stored log has an unknown type")))?;

        Ok(CreateLogResponse { success: true, log })
    }

    /// One page of history with a per-type summary of that page
    pub async fn list(
        pool: &PgPool,
        user_id: Uuid,
        query: LogsQuery,
        now: DateTime<Utc>,
    ) -> Result<LogsResponse, ApiError> {
        validate_days(query.days).map_err(|m| ValidationError::new("days", m))?;
        validate_limit(query.limit, MAX_LOGS_LIMIT).map_err(|m| ValidationError::new("limit", m))?;

        let filter = LogFilter {
            since: now - Duration::days(query.days as i64),
            log_type: query.log_type.map(|t| t.as_str().to_string()),
            limit: query.limit as i64,
            offset: query.offset as i64,
        };

        let records = ActivityLogRepository::list(pool, user_id, &filter)
            .await
            .map_err(ApiError::Internal)?;
        let total = ActivityLogRepository::count(pool, user_id, &filter)
            .await
            .map_err(ApiError::Internal)?
            .max(0) as u64;

        let logs: Vec<LogEntry> = records.into_iter().filter_map(to_entry).collect();
        let summary = LogsSummary::from_entries(&logs, total);

        Ok(LogsResponse {
            logs,
            summary,
            pagination: Pagination {
                limit: query.limit,
                offset: query.offset,
                total,
            },
            disclaimer: LOGS_DISCLAIMER.to_string(),
        })
    }
}
