//! Wiring of the three core components
//!
//! [`EngagementCore`] owns the injected configuration (window settings, nudge
//! catalog, message pools, plan categories) and runs the full pipeline for
//! both analysis paths.

use crate::drift::DriftEngine;
use crate::language::Language;
use crate::live::analyze_live;
use crate::messages::{MessagePools, RandomSource};
use crate::models::{DailyEngagement, DriftAnalysis, LogEvent, LogStamp};
use crate::nudges::{NudgeCatalog, NudgePolicy};
use crate::plan::{AdaptivePlanner, PlanConfig, PlanState};
use crate::source::AnalysisSource;
use crate::synthetic::streak_days;
use crate::types::{DriftAnalyzeResponse, InsightsResponse};
use crate::window::{aggregate_window, WindowConfig};
use chrono::{DateTime, Utc};

pub const INSIGHTS_DISCLAIMER: &str = "Insights describe logging habits only. They are not medical advice and do not assess health conditions.";

#[derive(Debug, Clone)]
pub struct EngagementCore {
    engine: DriftEngine,
    window: WindowConfig,
    policy: NudgePolicy,
    pools: MessagePools,
    planner: AdaptivePlanner,
}

impl Default for EngagementCore {
    fn default() -> Self {
        Self::new(
            WindowConfig::default(),
            NudgeCatalog::english(),
            MessagePools::builtin(),
            AdaptivePlanner::default(),
        )
    }
}

impl EngagementCore {
    pub fn new(
        window: WindowConfig,
        catalog: NudgeCatalog,
        pools: MessagePools,
        planner: AdaptivePlanner,
    ) -> Self {
        Self {
            engine: DriftEngine::new(),
            window,
            policy: NudgePolicy::new(catalog),
            pools,
            planner,
        }
    }

    /// Default catalogs with custom window and restore settings
    pub fn with_settings(window: WindowConfig, auto_restore_days: u32) -> Self {
        Self::new(
            window,
            NudgeCatalog::english(),
            MessagePools::builtin(),
            AdaptivePlanner::new(PlanConfig::default(), auto_restore_days),
        )
    }

    pub fn window(&self) -> &WindowConfig {
        &self.window
    }

    pub fn planner(&self) -> &AdaptivePlanner {
        &self.planner
    }

    /// Live path: score raw stamps and pick one message from the pools
    pub fn analyze_live(
        &self,
        logs: &[LogStamp],
        language: Language,
        random: &mut impl RandomSource,
        now: DateTime<Utc>,
    ) -> DriftAnalyzeResponse {
        let analysis = analyze_live(logs, now);
        let nudge = self.pools.select(&analysis, language, random);
        DriftAnalyzeResponse::new(analysis, nudge, now)
    }

    /// Daily window for raw events; empty when no event falls inside it
    fn event_window(&self, events: &[LogEvent], now: DateTime<Utc>) -> Vec<DailyEngagement> {
        let window = aggregate_window(events, now, &self.window);
        if window.iter().all(|day| day.logs_count == 0) {
            return Vec::new();
        }
        window
    }

    /// Canonical analysis of raw events via the daily window
    pub fn analyze_events(&self, events: &[LogEvent], now: DateTime<Utc>) -> DriftAnalysis {
        self.engine.analyze(&self.event_window(events, now), now)
    }

    /// Canonical path: analysis, rule-based nudges and plan from any source
    pub fn insights(
        &self,
        source: AnalysisSource,
        previous: Option<&PlanState>,
        language: Language,
        now: DateTime<Utc>,
    ) -> InsightsResponse {
        let streak = match &source {
            AnalysisSource::Synthetic(window) => streak_days(window),
            AnalysisSource::Live(_) => 0,
        };
        let analysis = source.into_analysis(&self.engine, now);
        self.respond(analysis, previous, language, now, streak)
    }

    /// Insights over raw events, aggregated with the configured window
    pub fn insights_from_events(
        &self,
        events: &[LogEvent],
        previous: Option<&PlanState>,
        language: Language,
        now: DateTime<Utc>,
    ) -> InsightsResponse {
        let window = self.event_window(events, now);
        self.insights(AnalysisSource::Synthetic(window), previous, language, now)
    }

    fn respond(
        &self,
        analysis: DriftAnalysis,
        previous: Option<&PlanState>,
        language: Language,
        now: DateTime<Utc>,
        streak_days: u32,
    ) -> InsightsResponse {
        let nudges = self.policy.generate(&analysis, language);
        let plan = self.planner.evaluate(&analysis, previous, now);
        InsightsResponse {
            disclaimer: INSIGHTS_DISCLAIMER.to_string(),
            analysis,
            nudges,
            plan,
            streak_days,
            streak_nudge: self.policy.streak_celebration(streak_days, language),
        }
    }
}
