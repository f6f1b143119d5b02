//! Live drift scoring over raw log timestamps
//!
//! This is the service-side variant: it works directly on the flat list of
//! `{category, timestamp}` rows fetched from the log store and blends
//! frequency, timing and variety into a single engagement score. It is not
//! expected to agree numerically with the windowed [`DriftEngine`](crate::drift::DriftEngine).

use crate::models::{DriftLevel, LogCategory, LogStamp, TrendDirection};
use chrono::{DateTime, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Days covered by the live analysis
pub const LIVE_WINDOW_DAYS: u32 = 14;

const PERIOD_DAYS: f64 = 7.0;
/// Minimum baseline logs per day
const BASELINE_FLOOR: f64 = 2.0;
/// Categories a fully varied week touches (glucose, bp, activity, diet)
const EXPECTED_CATEGORIES: f64 = 4.0;
const TIMING_SPREAD_HOURS: f64 = 6.0;

const FREQUENCY_SIGNIFICANT: f64 = 0.3;
const FREQUENCY_MODERATE: f64 = 0.5;
const FREQUENCY_MILD: f64 = 0.7;
const TIMING_SIGNIFICANT_HOURS: f64 = 6.0;
const TIMING_MODERATE_HOURS: f64 = 4.0;
const VARIETY_SPARSE: u8 = 20;

const TREND_UP: f64 = 1.2;
const TREND_DOWN: f64 = 0.8;

/// Primary cause of detected drift
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftType {
    FrequencyDrop,
    IrregularTiming,
    SparseVariety,
}

impl DriftType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DriftType::FrequencyDrop => "frequency_drop",
            DriftType::IrregularTiming => "irregular_timing",
            DriftType::SparseVariety => "sparse_variety",
        }
    }

    /// Human-readable form, e.g. "frequency drop"
    pub fn describe(&self) -> String {
        self.as_str().replace('_', " ")
    }
}

impl fmt::Display for DriftType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-factor scores, each 0-100
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactorScores {
    pub frequency: u8,
    pub timing: u8,
    pub variety: u8,
}

/// Supporting numbers for a live analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveMetadata {
    pub logs_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recent_logs_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub older_logs_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_types: Option<Vec<LogCategory>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timing_variance: Option<f64>,
    pub days_analyzed: u32,
}

/// Result of the live scoring path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveDriftAnalysis {
    pub engagement_score: u8,
    pub drift_level: DriftLevel,
    pub drift_type: Option<DriftType>,
    pub trend: TrendDirection,
    pub scores: FactorScores,
    pub metadata: LiveMetadata,
}

impl LiveDriftAnalysis {
    /// Fixed result when the window holds no logs
    pub fn no_logs() -> Self {
        Self {
            engagement_score: 0,
            drift_level: DriftLevel::Significant,
            drift_type: Some(DriftType::FrequencyDrop),
            trend: TrendDirection::Declining,
            scores: FactorScores {
                frequency: 0,
                timing: 0,
                variety: 0,
            },
            metadata: LiveMetadata {
                logs_count: 0,
                recent_logs_count: None,
                older_logs_count: None,
                log_types: None,
                frequency_ratio: None,
                timing_variance: None,
                days_analyzed: LIVE_WINDOW_DAYS,
            },
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn to_score(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

/// Score a flat list of log stamps against `now`
pub fn analyze_live(logs: &[LogStamp], now: DateTime<Utc>) -> LiveDriftAnalysis {
    if logs.is_empty() {
        return LiveDriftAnalysis::no_logs();
    }

    let window_start = now - Duration::days(LIVE_WINDOW_DAYS as i64);
    let week_start = now - Duration::days(7);

    let recent: Vec<&LogStamp> = logs.iter().filter(|l| l.timestamp >= week_start).collect();
    let older_count = logs
        .iter()
        .filter(|l| l.timestamp >= window_start && l.timestamp < week_start)
        .count();

    // Frequency against the previous week, never below the floor
    let recent_frequency = recent.len() as f64 / PERIOD_DAYS;
    let older_frequency = older_count as f64 / PERIOD_DAYS;
    let baseline = older_frequency.max(BASELINE_FLOOR);
    let frequency_ratio = recent_frequency / baseline;
    let frequency_score = to_score((frequency_ratio * 100.0).min(100.0));

    // Spread of log hours this week
    let hours: Vec<f64> = recent.iter().map(|l| l.timestamp.hour() as f64).collect();
    let divisor = hours.len().max(1) as f64;
    let mean_hour = hours.iter().sum::<f64>() / divisor;
    let variance = hours.iter().map(|h| (h - mean_hour).powi(2)).sum::<f64>() / divisor;
    let std_dev = variance.sqrt();
    let timing_score = to_score((TIMING_SPREAD_HOURS - std_dev) / TIMING_SPREAD_HOURS * 100.0);

    let log_types: BTreeSet<LogCategory> = recent.iter().map(|l| l.category).collect();
    let variety_score = to_score(log_types.len() as f64 / EXPECTED_CATEGORIES * 100.0);

    let engagement_score = to_score(
        frequency_score as f64 * 0.4 + timing_score as f64 * 0.3 + variety_score as f64 * 0.3,
    );

    let (drift_level, drift_type) = classify(frequency_ratio, std_dev, variety_score);

    let trend = if recent_frequency > older_frequency * TREND_UP {
        TrendDirection::Improving
    } else if recent_frequency < older_frequency * TREND_DOWN {
        TrendDirection::Declining
    } else {
        TrendDirection::Stable
    };

    LiveDriftAnalysis {
        engagement_score,
        drift_level,
        drift_type,
        trend,
        scores: FactorScores {
            frequency: frequency_score,
            timing: timing_score,
            variety: variety_score,
        },
        metadata: LiveMetadata {
            logs_count: logs.len() as u32,
            recent_logs_count: Some(recent.len() as u32),
            older_logs_count: Some(older_count as u32),
            log_types: Some(log_types.into_iter().collect()),
            frequency_ratio: Some(round2(frequency_ratio)),
            timing_variance: Some(round2(std_dev)),
            days_analyzed: LIVE_WINDOW_DAYS,
        },
    }
}

/// First matching rule wins: frequency, then timing, then variety
fn classify(frequency_ratio: f64, std_dev: f64, variety_score: u8) -> (DriftLevel, Option<DriftType>) {
    if frequency_ratio < FREQUENCY_SIGNIFICANT {
        (DriftLevel::Significant, Some(DriftType::FrequencyDrop))
    } else if frequency_ratio < FREQUENCY_MODERATE {
        (DriftLevel::Moderate, Some(DriftType::FrequencyDrop))
    } else if frequency_ratio < FREQUENCY_MILD {
        (DriftLevel::Mild, Some(DriftType::FrequencyDrop))
    } else if std_dev > TIMING_SIGNIFICANT_HOURS {
        (DriftLevel::Significant, Some(DriftType::IrregularTiming))
    } else if std_dev > TIMING_MODERATE_HOURS {
        (DriftLevel::Moderate, Some(DriftType::IrregularTiming))
    } else if variety_score < VARIETY_SPARSE {
        (DriftLevel::Moderate, Some(DriftType::SparseVariety))
    } else {
        (DriftLevel::None, None)
    }
}
