//! Log/nudge store contract
//!
//! The services only talk to storage through [`EngagementStore`], so the
//! analysis pipeline can run against PostgreSQL or an in-memory double.

mod postgres;

#[cfg(test)]
pub mod memory;

pub use postgres::PgEngagementStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use engagement_drift_shared::{LogEvent, LogStamp, PlanState};
use thiserror::Error;
use uuid::Uuid;

/// Storage failure
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store could not be reached (pool exhausted, connection lost)
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store query failed: {0}")]
    Query(#[from] sqlx::Error),
}

impl From<anyhow::Error> for StoreError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<sqlx::Error>() {
            Ok(sqlx::Error::PoolTimedOut) => {
                StoreError::Unavailable("connection pool timed out".to_string())
            }
            Ok(sqlx::Error::PoolClosed) => StoreError::Unavailable("connection pool closed".to_string()),
            Ok(sqlx::Error::Io(e)) => StoreError::Unavailable(e.to_string()),
            Ok(other) => StoreError::Query(other),
            Err(other) => StoreError::Unavailable(other.to_string()),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A detected drift to persist
#[derive(Debug, Clone, PartialEq)]
pub struct DriftEventInput {
    pub drift_type: Option<String>,
    pub drift_level: String,
    pub engagement_score: u8,
    pub metadata: serde_json::Value,
    pub detected_at: DateTime<Utc>,
}

/// A selected nudge to persist
#[derive(Debug, Clone, PartialEq)]
pub struct NudgeInput {
    pub message: String,
    pub nudge_type: String,
    pub tone: String,
    pub language: String,
    pub sent_at: DateTime<Utc>,
}

#[async_trait]
pub trait EngagementStore: Send + Sync {
    /// Category and time of every log in the `days` before `now`, newest first
    async fn fetch_log_window(
        &self,
        user_id: Uuid,
        days: u32,
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<LogStamp>>;

    /// Full log events in the `days` before `now`, newest first
    async fn fetch_log_events(
        &self,
        user_id: Uuid,
        days: u32,
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<LogEvent>>;

    async fn record_drift_event(&self, user_id: Uuid, event: DriftEventInput) -> StoreResult<()>;

    async fn record_nudge(&self, user_id: Uuid, nudge: NudgeInput) -> StoreResult<()>;

    /// Stored language code, `None` when the user has no preference
    async fn fetch_language_preference(&self, user_id: Uuid) -> StoreResult<Option<String>>;

    async fn load_plan_state(&self, user_id: Uuid) -> StoreResult<Option<PlanState>>;

    async fn save_plan_state(&self, user_id: Uuid, state: &PlanState) -> StoreResult<()>;
}
