//! Live drift analysis service
//!
//! Reads the user's recent logs, scores them, picks one motivational
//! message and persists both the drift event and the nudge. Only the log
//! read is fatal; persistence failures are logged and counted.

use crate::error::ApiError;
use crate::store::{DriftEventInput, EngagementStore, NudgeInput};
use crate::telemetry;
use chrono::{DateTime, Utc};
use engagement_drift_shared::live::{LiveMetadata, LIVE_WINDOW_DAYS};
use engagement_drift_shared::{
    DriftAnalyzeResponse, DriftLevel, EngagementCore, Language, RandomSource,
};
use tracing::{error, info, warn};
use uuid::Uuid;

/// Stored language preference, English when missing or unreadable
pub async fn preferred_language(store: &dyn EngagementStore, user_id: Uuid) -> Language {
    match store.fetch_language_preference(user_id).await {
        Ok(Some(code)) => Language::from_code(&code),
        Ok(None) => Language::En,
        Err(e) => {
            warn!(user_id = %user_id, error = %e, "Language preference unavailable, using English");
            Language::En
        }
    }
}

/// Metadata column for a drift event; `Null` when it cannot be serialized
fn event_metadata(metadata: &LiveMetadata, user_id: Uuid) -> serde_json::Value {
    serde_json::to_value(metadata).unwrap_or_else(|e| {
        error!(user_id = %user_id, error = %e, "Failed to serialize drift event metadata");
        telemetry::record_write_failure("drift_event_metadata");
        serde_json::Value::Null
    })
}

/// Drift analysis service
pub struct DriftService;

impl DriftService {
    /// Run the live analysis for `user_id` and persist its side effects
    pub async fn analyze<R>(
        store: &dyn EngagementStore,
        core: &EngagementCore,
        random: &mut R,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<DriftAnalyzeResponse, ApiError>
    where
        R: RandomSource + Send,
    {
        let language = preferred_language(store, user_id).await;

        let logs = store.fetch_log_window(user_id, LIVE_WINDOW_DAYS, now).await?;

        let response = core.analyze_live(&logs, language, random, now);
        let analysis = &response.analysis;

        if analysis.drift_level != DriftLevel::None {
            let event = DriftEventInput {
                drift_type: analysis.drift_type.map(|t| t.as_str().to_string()),
                drift_level: analysis.drift_level.as_str().to_string(),
                engagement_score: analysis.engagement_score,
                metadata: event_metadata(&analysis.metadata, user_id),
                detected_at: now,
            };
            if let Err(e) = store.record_drift_event(user_id, event).await {
                error!(user_id = %user_id, error = %e, "Failed to record drift event");
                telemetry::record_write_failure("drift_event");
            }
        }

        let nudge = NudgeInput {
            message: response.nudge.message.clone(),
            nudge_type: response.nudge.category.as_str().to_string(),
            tone: response.nudge.tone.as_str().to_string(),
            language: response.nudge.language.code().to_string(),
            sent_at: now,
        };
        if let Err(e) = store.record_nudge(user_id, nudge).await {
            error!(user_id = %user_id, error = %e, "Failed to record nudge");
            telemetry::record_write_failure("nudge");
        }

        telemetry::record_analysis("live", analysis.drift_level.as_str());
        info!(
            user_id = %user_id,
            score = analysis.engagement_score,
            drift_level = %analysis.drift_level,
            logs = logs.len(),
            "Drift analysis completed"
        );

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::{Failures, MemoryStore};
    use chrono::{Duration, TimeZone};
    use engagement_drift_shared::{LogCategory, LogEvent};

    struct FirstIndex;

    impl RandomSource for FirstIndex {
        fn next_index(&mut self, _len: usize) -> usize {
            0
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    fn event(hours_ago: i64, category: LogCategory) -> LogEvent {
        LogEvent {
            id: Uuid::new_v4(),
            category,
            timestamp: now() - Duration::hours(hours_ago),
            value: None,
        }
    }

    #[tokio::test]
    async fn test_no_logs_records_significant_drift() {
        let store = MemoryStore::default();
        let user = Uuid::new_v4();

        let response = DriftService::analyze(&store, &EngagementCore::default(), &mut FirstIndex, user, now())
            .await
            .unwrap();

        assert_eq!(response.analysis.engagement_score, 0);
        assert_eq!(response.analysis.drift_level, DriftLevel::Significant);
        assert!(response.recommendations.is_some());

        let events = store.drift_events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].1.drift_level, "significant");
        assert_eq!(events[0].1.metadata["logsCount"], 0);
        assert_eq!(
            events[0].1.metadata,
            serde_json::to_value(&response.analysis.metadata).unwrap()
        );
        assert_eq!(store.nudges.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_event_metadata_is_an_object() {
        let metadata = engagement_drift_shared::LiveDriftAnalysis::no_logs().metadata;
        let value = event_metadata(&metadata, Uuid::new_v4());
        assert!(value.is_object());
        assert!(value.get("daysAnalyzed").is_some());
    }

    #[tokio::test]
    async fn test_read_failure_is_store_unavailable() {
        let store = MemoryStore::failing(Failures {
            reads: true,
            ..Failures::default()
        });

        let result =
            DriftService::analyze(&store, &EngagementCore::default(), &mut FirstIndex, Uuid::new_v4(), now()).await;

        assert!(matches!(result, Err(ApiError::StoreUnavailable(_))));
    }

    #[tokio::test]
    async fn test_write_failures_do_not_fail_the_request() {
        let store = MemoryStore::failing(Failures {
            writes: true,
            ..Failures::default()
        });

        let result =
            DriftService::analyze(&store, &EngagementCore::default(), &mut FirstIndex, Uuid::new_v4(), now()).await;

        assert!(result.is_ok());
        assert!(store.nudges.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_uses_stored_language() {
        let store = MemoryStore::default();
        let user = Uuid::new_v4();
        store.languages.lock().unwrap().insert(user, "es".to_string());

        let response = DriftService::analyze(&store, &EngagementCore::default(), &mut FirstIndex, user, now())
            .await
            .unwrap();

        assert_eq!(response.nudge.language, Language::Es);
        assert_eq!(store.nudges.lock().unwrap()[0].1.language, "es");
    }

    #[tokio::test]
    async fn test_language_failure_falls_back_to_english() {
        let store = MemoryStore::failing(Failures {
            language: true,
            ..Failures::default()
        });

        let response =
            DriftService::analyze(&store, &EngagementCore::default(), &mut FirstIndex, Uuid::new_v4(), now())
                .await
                .unwrap();

        assert_eq!(response.nudge.language, Language::En);
    }

    #[tokio::test]
    async fn test_only_own_logs_are_scored() {
        let store = MemoryStore::default();
        let user = Uuid::new_v4();
        let other = Uuid::new_v4();
        for day in 0..14 {
            for category in LogCategory::ALL {
                store.add_event(other, event(day * 24 + 2, category));
            }
        }
        store.add_event(user, event(3, LogCategory::Glucose));

        let response = DriftService::analyze(&store, &EngagementCore::default(), &mut FirstIndex, user, now())
            .await
            .unwrap();

        assert_eq!(response.analysis.metadata.logs_count, 1);
    }
}
