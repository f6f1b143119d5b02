//! Plan state repository

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Plan state record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PlanStateRecord {
    pub user_id: Uuid,
    pub current_mode: String,
    pub mode_changed_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct PlanStateRepository;

impl PlanStateRepository {
    pub async fn get(pool: &PgPool, user_id: Uuid) -> Result<Option<PlanStateRecord>> {
        let record = sqlx::query_as::<_, PlanStateRecord>(
            r#"
            SELECT user_id, current_mode, mode_changed_at, updated_at
            FROM plan_states
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    pub async fn upsert(
        pool: &PgPool,
        user_id: Uuid,
        current_mode: &str,
        mode_changed_at: DateTime<Utc>,
    ) -> Result<PlanStateRecord> {
        let record = sqlx::query_as::<_, PlanStateRecord>(
            r#"
            INSERT INTO plan_states (user_id, current_mode, mode_changed_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id) DO UPDATE
            SET current_mode = EXCLUDED.current_mode,
                mode_changed_at = EXCLUDED.mode_changed_at,
                updated_at = NOW()
            RETURNING user_id, current_mode, mode_changed_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(current_mode)
        .bind(mode_changed_at)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }
}
