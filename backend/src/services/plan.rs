//! Adaptive plan service

use crate::error::ApiError;
use crate::services::insights::{previous_plan_state, InsightsService};
use crate::store::EngagementStore;
use chrono::{DateTime, Utc};
use engagement_drift_shared::plan::{export_plan, should_restore, PlanExport};
use engagement_drift_shared::{EngagementCore, PlanMode, RestoreCheckResponse};
use uuid::Uuid;

pub struct PlanService;

impl PlanService {
    /// Current plan in its export shape, re-evaluated against today's window
    pub async fn export(
        store: &dyn EngagementStore,
        core: &EngagementCore,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<PlanExport, ApiError> {
        let insights = InsightsService::insights(store, core, user_id, now).await?;
        Ok(export_plan(&insights.plan))
    }

    /// Whether the saved plan should be re-evaluated toward full mode.
    /// Does not change the saved state.
    pub async fn restore_check(
        store: &dyn EngagementStore,
        core: &EngagementCore,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<RestoreCheckResponse, ApiError> {
        let current_mode = previous_plan_state(store, user_id)
            .await
            .map(|s| s.current_mode)
            .unwrap_or(PlanMode::Full);

        let events = store
            .fetch_log_events(user_id, core.window().window_days, now)
            .await?;
        let analysis = core.analyze_events(&events, now);

        Ok(RestoreCheckResponse {
            current_mode,
            should_restore: should_restore(current_mode, &analysis),
        })
    }
}
