//! Nudge inbox repository

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Nudge record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct NudgeRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub message: String,
    pub nudge_type: String,
    pub tone: String,
    pub language: String,
    pub is_read: bool,
    pub sent_at: DateTime<Utc>,
}

/// Input for storing a nudge
#[derive(Debug, Clone)]
pub struct CreateNudge {
    pub user_id: Uuid,
    pub message: String,
    pub nudge_type: String,
    pub tone: String,
    pub language: String,
    pub sent_at: DateTime<Utc>,
}

pub struct NudgeRepository;

impl NudgeRepository {
    pub async fn create(pool: &PgPool, input: CreateNudge) -> Result<NudgeRecord> {
        let record = sqlx::query_as::<_, NudgeRecord>(
            r#"
            INSERT INTO nudges (user_id, message, nudge_type, tone, language, sent_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, message, nudge_type, tone, language, is_read, sent_at
            "#,
        )
        .bind(input.user_id)
        .bind(&input.message)
        .bind(&input.nudge_type)
        .bind(&input.tone)
        .bind(&input.language)
        .bind(input.sent_at)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    /// Newest nudges first, optionally unread only
    pub async fn list(
        pool: &PgPool,
        user_id: Uuid,
        limit: i64,
        unread_only: bool,
    ) -> Result<Vec<NudgeRecord>> {
        let records = sqlx::query_as::<_, NudgeRecord>(
            r#"
            SELECT id, user_id, message, nudge_type, tone, language, is_read, sent_at
            FROM nudges
            WHERE user_id = $1 AND (NOT $2 OR NOT is_read)
            ORDER BY sent_at DESC
            LIMIT $3
            "#,
        )
        .bind(user_id)
        .bind(unread_only)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    pub async fn count_unread(pool: &PgPool, user_id: Uuid) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM nudges
            WHERE user_id = $1 AND NOT is_read
            "#,
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(count.0)
    }

    /// Mark the given nudges read; ids owned by other users are ignored
    pub async fn mark_read(pool: &PgPool, user_id: Uuid, ids: &[Uuid]) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE nudges
            SET is_read = TRUE
            WHERE user_id = $1 AND id = ANY($2)
            "#,
        )
        .bind(user_id)
        .bind(ids)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }
}
