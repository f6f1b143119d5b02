//! Activity log repository for database operations

use anyhow::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

/// Activity log record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ActivityLogRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub log_type: String,
    pub logged_at: DateTime<Utc>,
    pub value: Option<Decimal>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Category and time only, as read by the live analysis
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LogStampRecord {
    pub log_type: String,
    pub logged_at: DateTime<Utc>,
}

/// Input for creating an activity log
#[derive(Debug, Clone)]
pub struct CreateActivityLog {
    pub user_id: Uuid,
    pub log_type: String,
    pub logged_at: DateTime<Utc>,
    pub value: Option<Decimal>,
    pub notes: Option<String>,
}

/// Filter for log history queries
#[derive(Debug, Clone)]
pub struct LogFilter {
    pub since: DateTime<Utc>,
    pub log_type: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

/// Activity log repository
pub struct ActivityLogRepository;

impl ActivityLogRepository {
    /// Append a log entry
    pub async fn create(pool: &PgPool, input: CreateActivityLog) -> Result<ActivityLogRecord> {
        let record = sqlx::query_as::<_, ActivityLogRecord>(
            r#"
            INSERT INTO activity_logs (user_id, log_type, logged_at, value, notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, log_type, logged_at, value, notes, created_at
            "#,
        )
        .bind(input.user_id)
        .bind(&input.log_type)
        .bind(input.logged_at)
        .bind(input.value)
        .bind(&input.notes)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    /// Category and time of every log since `since`, newest first
    pub async fn get_stamps_since(
        pool: &PgPool,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<LogStampRecord>> {
        let records = sqlx::query_as::<_, LogStampRecord>(
            r#"
            SELECT log_type, logged_at
            FROM activity_logs
            WHERE user_id = $1 AND logged_at >= $2
            ORDER BY logged_at DESC
            "#,
        )
        .bind(user_id)
        .bind(since)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// Full records since `since`, newest first
    pub async fn get_since(
        pool: &PgPool,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<ActivityLogRecord>> {
        let records = sqlx::query_as::<_, ActivityLogRecord>(
            r#"
            SELECT id, user_id, log_type, logged_at, value, notes, created_at
            FROM activity_logs
            WHERE user_id = $1 AND logged_at >= $2
            ORDER BY logged_at DESC
            "#,
        )
        .bind(user_id)
        .bind(since)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// One page of history
    pub async fn list(pool: &PgPool, user_id: Uuid, filter: &LogFilter) -> Result<Vec<ActivityLogRecord>> {
        let records = sqlx::query_as::<_, ActivityLogRecord>(
            r#"
            SELECT id, user_id, log_type, logged_at, value, notes, created_at
            FROM activity_logs
            WHERE user_id = $1
              AND logged_at >= $2
              AND ($3::TEXT IS NULL OR log_type = $3)
            ORDER BY logged_at DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(user_id)
        .bind(filter.since)
        .bind(&filter.log_type)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// Number of entries matching the filter, ignoring paging
    pub async fn count(pool: &PgPool, user_id: Uuid, filter: &LogFilter) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM activity_logs
            WHERE user_id = $1
              AND logged_at >= $2
              AND ($3::TEXT IS NULL OR log_type = $3)
            "#,
        )
        .bind(user_id)
        .bind(filter.since)
        .bind(&filter.log_type)
        .fetch_one(pool)
        .await?;

        Ok(count.0)
    }
}
