//! Normalisation of live and synthetic analyses into one [`DriftAnalysis`]

use crate::drift::DriftEngine;
use crate::live::LiveDriftAnalysis;
use crate::models::{DailyEngagement, DriftAnalysis, DriftIndicator, DriftLevel, IndicatorCategory};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where an analysis came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", content = "data", rename_all = "lowercase")]
pub enum AnalysisSource {
    /// Result of the live scoring path over raw logs
    Live(LiveDriftAnalysis),
    /// Daily aggregates to be scored by the windowed engine
    Synthetic(Vec<DailyEngagement>),
}

impl AnalysisSource {
    pub fn label(&self) -> &'static str {
        match self {
            AnalysisSource::Live(_) => "live",
            AnalysisSource::Synthetic(_) => "synthetic",
        }
    }

    /// Produce the canonical analysis consumed by nudges and plans
    pub fn into_analysis(self, engine: &DriftEngine, now: DateTime<Utc>) -> DriftAnalysis {
        match self {
            AnalysisSource::Synthetic(window) => engine.analyze(&window, now),
            AnalysisSource::Live(live) => normalize_live(live, now),
        }
    }
}

fn live_indicator(
    category: IndicatorCategory,
    label: &str,
    description: String,
    severity: DriftLevel,
    data_points: u32,
) -> DriftIndicator {
    DriftIndicator {
        id: match category {
            IndicatorCategory::Frequency => "frequency",
            IndicatorCategory::Timing => "timing",
            IndicatorCategory::Completeness => "tasks",
            IndicatorCategory::Variety => "variety",
        }
        .to_string(),
        category,
        label: label.to_string(),
        description,
        severity,
        confidence: 1.0,
        data_points,
    }
}

fn normalize_live(live: LiveDriftAnalysis, now: DateTime<Utc>) -> DriftAnalysis {
    let days = live.metadata.days_analyzed;

    let indicators = vec![
        live_indicator(
            IndicatorCategory::Frequency,
            "Logging Frequency",
            format!("{}% of expected logs", live.scores.frequency),
            live.drift_level,
            live.metadata.logs_count,
        ),
        live_indicator(
            IndicatorCategory::Timing,
            "Timing Consistency",
            format!("{}% consistency", live.scores.timing),
            if live.scores.timing < 50 {
                DriftLevel::Moderate
            } else {
                DriftLevel::None
            },
            days,
        ),
        live_indicator(
            IndicatorCategory::Variety,
            "Log Variety",
            format!("{}% variety", live.scores.variety),
            if live.scores.variety < 50 {
                DriftLevel::Mild
            } else {
                DriftLevel::None
            },
            days,
        ),
    ];

    let (explanation, contributing_factors) = match live.drift_type {
        Some(drift_type) => (
            format!("Detected {}", drift_type.describe()),
            vec![drift_type.describe()],
        ),
        None => ("Engagement patterns are healthy".to_string(), Vec::new()),
    };

    DriftAnalysis {
        overall_score: live.engagement_score,
        drift_level: live.drift_level,
        trend: live.trend,
        indicators,
        days_analyzed: days,
        last_updated: now,
        explanation,
        contributing_factors,
    }
}
