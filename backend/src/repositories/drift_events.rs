//! Drift event repository

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Drift event record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DriftEventRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub drift_type: Option<String>,
    pub drift_level: String,
    pub engagement_score: i32,
    pub metadata: serde_json::Value,
    pub detected_at: DateTime<Utc>,
}

/// Input for recording a drift event
#[derive(Debug, Clone)]
pub struct CreateDriftEvent {
    pub user_id: Uuid,
    pub drift_type: Option<String>,
    pub drift_level: String,
    pub engagement_score: i32,
    pub metadata: serde_json::Value,
    pub detected_at: DateTime<Utc>,
}

pub struct DriftEventRepository;

impl DriftEventRepository {
    pub async fn create(pool: &PgPool, input: CreateDriftEvent) -> Result<DriftEventRecord> {
        let record = sqlx::query_as::<_, DriftEventRecord>(
            r#"
            INSERT INTO drift_events (user_id, drift_type, drift_level, engagement_score, metadata, detected_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, drift_type, drift_level, engagement_score, metadata, detected_at
            "#,
        )
        .bind(input.user_id)
        .bind(&input.drift_type)
        .bind(&input.drift_level)
        .bind(input.engagement_score)
        .bind(&input.metadata)
        .bind(input.detected_at)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    /// The N most recent drift events for a user
    pub async fn get_recent(pool: &PgPool, user_id: Uuid, limit: i64) -> Result<Vec<DriftEventRecord>> {
        let records = sqlx::query_as::<_, DriftEventRecord>(
            r#"
            SELECT id, user_id, drift_type, drift_level, engagement_score, metadata, detected_at
            FROM drift_events
            WHERE user_id = $1
            ORDER BY detected_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }
}
