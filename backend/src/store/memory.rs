//! In-memory store for service tests

use super::{DriftEventInput, EngagementStore, NudgeInput, StoreError, StoreResult};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use engagement_drift_shared::{LogEvent, LogStamp, PlanState};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

/// Which operations should fail
#[derive(Debug, Clone, Copy, Default)]
pub struct Failures {
    pub reads: bool,
    pub writes: bool,
    pub language: bool,
}

#[derive(Default)]
pub struct MemoryStore {
    pub events: Mutex<Vec<(Uuid, LogEvent)>>,
    pub drift_events: Mutex<Vec<(Uuid, DriftEventInput)>>,
    pub nudges: Mutex<Vec<(Uuid, NudgeInput)>>,
    pub languages: Mutex<HashMap<Uuid, String>>,
    pub plans: Mutex<HashMap<Uuid, PlanState>>,
    pub failures: Failures,
}

impl MemoryStore {
    pub fn failing(failures: Failures) -> Self {
        Self {
            failures,
            ..Self::default()
        }
    }

    pub fn add_event(&self, user_id: Uuid, event: LogEvent) {
        self.events.lock().unwrap().push((user_id, event));
    }

    fn window(&self, user_id: Uuid, days: u32, now: DateTime<Utc>) -> StoreResult<Vec<LogEvent>> {
        if self.failures.reads {
            return Err(StoreError::Unavailable("memory store offline".to_string()));
        }
        let since = now - Duration::days(days as i64);
        let mut events: Vec<LogEvent> = self
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|(owner, e)| *owner == user_id && e.timestamp >= since)
            .map(|(_, e)| e.clone())
            .collect();
        events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(events)
    }

    fn check_write(&self) -> StoreResult<()> {
        if self.failures.writes {
            return Err(StoreError::Unavailable("memory store read-only".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl EngagementStore for MemoryStore {
    async fn fetch_log_window(&self, user_id: Uuid, days: u32, now: DateTime<Utc>) -> StoreResult<Vec<LogStamp>> {
        Ok(self.window(user_id, days, now)?.iter().map(LogStamp::from).collect())
    }

    async fn fetch_log_events(&self, user_id: Uuid, days: u32, now: DateTime<Utc>) -> StoreResult<Vec<LogEvent>> {
        self.window(user_id, days, now)
    }

    async fn record_drift_event(&self, user_id: Uuid, event: DriftEventInput) -> StoreResult<()> {
        self.check_write()?;
        self.drift_events.lock().unwrap().push((user_id, event));
        Ok(())
    }

    async fn record_nudge(&self, user_id: Uuid, nudge: NudgeInput) -> StoreResult<()> {
        self.check_write()?;
        self.nudges.lock().unwrap().push((user_id, nudge));
        Ok(())
    }

    async fn fetch_language_preference(&self, user_id: Uuid) -> StoreResult<Option<String>> {
        if self.failures.language {
            return Err(StoreError::Unavailable("profiles offline".to_string()));
        }
        Ok(self.languages.lock().unwrap().get(&user_id).cloned())
    }

    async fn load_plan_state(&self, user_id: Uuid) -> StoreResult<Option<PlanState>> {
        Ok(self.plans.lock().unwrap().get(&user_id).copied())
    }

    async fn save_plan_state(&self, user_id: Uuid, state: &PlanState) -> StoreResult<()> {
        self.check_write()?;
        self.plans.lock().unwrap().insert(user_id, *state);
        Ok(())
    }
}
