//! Windowed insights service - analysis, rule-based nudges and adaptive plan

use crate::error::ApiError;
use crate::services::drift::preferred_language;
use crate::store::EngagementStore;
use crate::telemetry;
use chrono::{DateTime, Utc};
use engagement_drift_shared::{EngagementCore, InsightsResponse, PlanState};
use tracing::{error, info, warn};
use uuid::Uuid;

/// Saved plan state, `None` when missing or unreadable
pub async fn previous_plan_state(store: &dyn EngagementStore, user_id: Uuid) -> Option<PlanState> {
    match store.load_plan_state(user_id).await {
        Ok(state) => state,
        Err(e) => {
            warn!(user_id = %user_id, error = %e, "Plan state unavailable, evaluating from scratch");
            None
        }
    }
}

/// Insights service
pub struct InsightsService;

impl InsightsService {
    /// Analyze the configured window and move the user's plan accordingly
    pub async fn insights(
        store: &dyn EngagementStore,
        core: &EngagementCore,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<InsightsResponse, ApiError> {
        let language = preferred_language(store, user_id).await;
        let events = store
            .fetch_log_events(user_id, core.window().window_days, now)
            .await?;
        let previous = previous_plan_state(store, user_id).await;

        let insights = core.insights_from_events(&events, previous.as_ref(), language, now);

        if let Err(e) = store.save_plan_state(user_id, &insights.plan.state()).await {
            error!(user_id = %user_id, error = %e, "Failed to save plan state");
            telemetry::record_write_failure("plan_state");
        }

        telemetry::record_analysis("window", insights.analysis.drift_level.as_str());
        info!(
            user_id = %user_id,
            score = insights.analysis.overall_score,
            drift_level = %insights.analysis.drift_level,
            plan_mode = %insights.plan.current_mode,
            "Insights computed"
        );

        Ok(insights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::{Failures, MemoryStore};
    use chrono::{Duration, TimeZone};
    use engagement_drift_shared::{DriftLevel, LogCategory, LogEvent, PlanMode, TrendDirection};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 20, 0, 0).unwrap()
    }

    fn engaged_store(user: Uuid) -> MemoryStore {
        let store = MemoryStore::default();
        for d in 0..14 {
            let date = (now() - Duration::days(d)).date_naive();
            for (category, hour) in [
                (LogCategory::Glucose, 7),
                (LogCategory::Glucose, 12),
                (LogCategory::Meal, 8),
                (LogCategory::Meal, 13),
                (LogCategory::Activity, 18),
                (LogCategory::Medication, 9),
            ] {
                store.add_event(
                    user,
                    LogEvent {
                        id: Uuid::new_v4(),
                        category,
                        timestamp: date.and_hms_opt(hour, 0, 0).unwrap().and_utc(),
                        value: (category == LogCategory::Activity).then_some(30.0),
                    },
                );
            }
        }
        store
    }

    #[tokio::test]
    async fn test_empty_history_moves_plan_to_minimal() {
        let store = MemoryStore::default();
        let user = Uuid::new_v4();

        let insights = InsightsService::insights(&store, &EngagementCore::default(), user, now())
            .await
            .unwrap();

        assert_eq!(insights.analysis.drift_level, DriftLevel::Significant);
        assert_eq!(insights.analysis.overall_score, 0);
        assert_eq!(insights.analysis.trend, TrendDirection::Declining);
        assert_eq!(insights.plan.current_mode, PlanMode::Minimal);
        let saved = store.plans.lock().unwrap().get(&user).copied().unwrap();
        assert_eq!(saved.current_mode, PlanMode::Minimal);
        assert_eq!(saved.mode_changed_at, now());
    }

    #[tokio::test]
    async fn test_engaged_user_keeps_full_plan_and_timestamp() {
        let user = Uuid::new_v4();
        let store = engaged_store(user);
        let earlier = now() - Duration::days(5);
        store.plans.lock().unwrap().insert(
            user,
            PlanState {
                current_mode: PlanMode::Full,
                mode_changed_at: earlier,
            },
        );

        let insights = InsightsService::insights(&store, &EngagementCore::default(), user, now())
            .await
            .unwrap();

        assert_eq!(insights.plan.current_mode, PlanMode::Full);
        assert_eq!(insights.plan.mode_changed_at, earlier);
        assert!(insights.plan.auto_restore_at.is_none());
    }

    #[tokio::test]
    async fn test_plan_save_failure_is_swallowed() {
        let store = MemoryStore::failing(Failures {
            writes: true,
            ..Failures::default()
        });

        let result = InsightsService::insights(&store, &EngagementCore::default(), Uuid::new_v4(), now()).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_read_failure_is_fatal() {
        let store = MemoryStore::failing(Failures {
            reads: true,
            ..Failures::default()
        });

        let result = InsightsService::insights(&store, &EngagementCore::default(), Uuid::new_v4(), now()).await;

        assert!(matches!(result, Err(ApiError::StoreUnavailable(_))));
    }
}
