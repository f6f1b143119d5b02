//! PostgreSQL-backed store

use super::{DriftEventInput, EngagementStore, NudgeInput, StoreResult};
use crate::repositories::{
    ActivityLogRepository, CreateDriftEvent, CreateNudge, DriftEventRepository, NudgeRepository,
    PlanStateRepository, ProfileRepository,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use engagement_drift_shared::{LogCategory, LogEvent, LogStamp, PlanMode, PlanState};
use rust_decimal::prelude::ToPrimitive;
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

#[derive(Clone)]
pub struct PgEngagementStore {
    pool: PgPool,
}

impl PgEngagementStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn parse_category(raw: &str) -> Option<LogCategory> {
    match raw.parse() {
        Ok(category) => Some(category),
        Err(_) => {
            warn!(log_type = %raw, "Skipping log with unknown type");
            None
        }
    }
}

#[async_trait]
impl EngagementStore for PgEngagementStore {
    async fn fetch_log_window(
        &self,
        user_id: Uuid,
        days: u32,
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<LogStamp>> {
        let since = now - Duration::days(days as i64);
        let records = ActivityLogRepository::get_stamps_since(&self.pool, user_id, since).await?;

        Ok(records
            .into_iter()
            .filter_map(|r| {
                parse_category(&r.log_type).map(|category| LogStamp {
                    category,
                    timestamp: r.logged_at,
                })
            })
            .collect())
    }

    async fn fetch_log_events(
        &self,
        user_id: Uuid,
        days: u32,
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<LogEvent>> {
        let since = now - Duration::days(days as i64);
        let records = ActivityLogRepository::get_since(&self.pool, user_id, since).await?;

        Ok(records
            .into_iter()
            .filter_map(|r| {
                parse_category(&r.log_type).map(|category| LogEvent {
                    id: r.id,
                    category,
                    timestamp: r.logged_at,
                    value: r.value.and_then(|v| v.to_f64()),
                })
            })
            .collect())
    }

    async fn record_drift_event(&self, user_id: Uuid, event: DriftEventInput) -> StoreResult<()> {
        DriftEventRepository::create(
            &self.pool,
            CreateDriftEvent {
                user_id,
                drift_type: event.drift_type,
                drift_level: event.drift_level,
                engagement_score: event.engagement_score as i32,
                metadata: event.metadata,
                detected_at: event.detected_at,
            },
        )
        .await?;
        Ok(())
    }

    async fn record_nudge(&self, user_id: Uuid, nudge: NudgeInput) -> StoreResult<()> {
        NudgeRepository::create(
            &self.pool,
            CreateNudge {
                user_id,
                message: nudge.message,
                nudge_type: nudge.nudge_type,
                tone: nudge.tone,
                language: nudge.language,
                sent_at: nudge.sent_at,
            },
        )
        .await?;
        Ok(())
    }

    async fn fetch_language_preference(&self, user_id: Uuid) -> StoreResult<Option<String>> {
        Ok(ProfileRepository::get_language(&self.pool, user_id).await?)
    }

    async fn load_plan_state(&self, user_id: Uuid) -> StoreResult<Option<PlanState>> {
        let Some(record) = PlanStateRepository::get(&self.pool, user_id).await? else {
            return Ok(None);
        };

        match record.current_mode.parse::<PlanMode>() {
            Ok(current_mode) => Ok(Some(PlanState {
                current_mode,
                mode_changed_at: record.mode_changed_at,
            })),
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Ignoring unreadable plan state");
                Ok(None)
            }
        }
    }

    async fn save_plan_state(&self, user_id: Uuid, state: &PlanState) -> StoreResult<()> {
        PlanStateRepository::upsert(
            &self.pool,
            user_id,
            state.current_mode.as_str(),
            state.mode_changed_at,
        )
        .await?;
        Ok(())
    }
}
