//! Data models for engagement drift tracking
//!
//! Raw log events come from the external log store. Everything else in this
//! module is derived per analysis call and never persisted by the core.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Log Events
// ============================================================================

/// Category of a self-reported health log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogCategory {
    Glucose,
    /// Meal / diet entry. Stored as `diet`, `meal` is accepted on input.
    #[serde(rename = "diet", alias = "meal")]
    Meal,
    Activity,
    Medication,
    Weight,
    Bp,
}

impl LogCategory {
    pub const ALL: [LogCategory; 6] = [
        LogCategory::Glucose,
        LogCategory::Meal,
        LogCategory::Activity,
        LogCategory::Medication,
        LogCategory::Weight,
        LogCategory::Bp,
    ];

    /// Storage / wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            LogCategory::Glucose => "glucose",
            LogCategory::Meal => "diet",
            LogCategory::Activity => "activity",
            LogCategory::Medication => "medication",
            LogCategory::Weight => "weight",
            LogCategory::Bp => "bp",
        }
    }
}

impl fmt::Display for LogCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "glucose" => Ok(LogCategory::Glucose),
            "diet" | "meal" => Ok(LogCategory::Meal),
            "activity" => Ok(LogCategory::Activity),
            "medication" => Ok(LogCategory::Medication),
            "weight" => Ok(LogCategory::Weight),
            "bp" => Ok(LogCategory::Bp),
            other => Err(format!("Unknown log category: {}", other)),
        }
    }
}

/// A single timestamped log event. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEvent {
    pub id: Uuid,
    pub category: LogCategory,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

/// Minimal projection of a log event used by the live scoring path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogStamp {
    pub category: LogCategory,
    pub timestamp: DateTime<Utc>,
}

impl From<&LogEvent> for LogStamp {
    fn from(event: &LogEvent) -> Self {
        Self {
            category: event.category,
            timestamp: event.timestamp,
        }
    }
}

// ============================================================================
// Engagement Window
// ============================================================================

/// Per-day engagement aggregate. One entry per day of the analysis horizon,
/// ordered most recent first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyEngagement {
    pub date: NaiveDate,
    pub logs_count: u32,
    pub expected_logs: u32,
    /// 0.0 - 1.0
    pub timing_consistency: f64,
    pub completed_tasks: u32,
    pub total_tasks: u32,
    pub activity_minutes: u32,
    pub meal_logs_count: u32,
    pub glucose_checks: u32,
}

impl DailyEngagement {
    /// Fraction of expected logs recorded. Nothing expected counts as met.
    pub fn log_ratio(&self) -> f64 {
        ratio(self.logs_count, self.expected_logs)
    }

    /// Fraction of tasks completed. No tasks counts as met.
    pub fn completion_ratio(&self) -> f64 {
        ratio(self.completed_tasks, self.total_tasks)
    }
}

fn ratio(numerator: u32, denominator: u32) -> f64 {
    if denominator == 0 {
        1.0
    } else {
        numerator as f64 / denominator as f64
    }
}

// ============================================================================
// Drift Analysis
// ============================================================================

/// Drift severity, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriftLevel {
    None,
    Mild,
    Moderate,
    Significant,
}

impl DriftLevel {
    /// Score contribution of an indicator at this severity
    pub fn severity_score(&self) -> f64 {
        match self {
            DriftLevel::None => 100.0,
            DriftLevel::Mild => 70.0,
            DriftLevel::Moderate => 40.0,
            DriftLevel::Significant => 15.0,
        }
    }

    /// Classify an overall engagement score (0-100)
    pub fn from_score(score: u8) -> Self {
        if score < 30 {
            DriftLevel::Significant
        } else if score < 50 {
            DriftLevel::Moderate
        } else if score < 70 {
            DriftLevel::Mild
        } else {
            DriftLevel::None
        }
    }

    /// Classify a 0-1 ratio with the shared significant/moderate/mild bands
    pub fn from_ratio(value: f64) -> Self {
        if value < 0.3 {
            DriftLevel::Significant
        } else if value < 0.5 {
            DriftLevel::Moderate
        } else if value < 0.7 {
            DriftLevel::Mild
        } else {
            DriftLevel::None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DriftLevel::None => "none",
            DriftLevel::Mild => "mild",
            DriftLevel::Moderate => "moderate",
            DriftLevel::Significant => "significant",
        }
    }

    pub fn is_concerning(&self) -> bool {
        matches!(self, DriftLevel::Moderate | DriftLevel::Significant)
    }
}

impl fmt::Display for DriftLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of recent engagement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Improving,
    Stable,
    Declining,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Improving => "improving",
            TrendDirection::Stable => "stable",
            TrendDirection::Declining => "declining",
        }
    }
}

/// The behaviour an indicator measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorCategory {
    Frequency,
    Timing,
    Completeness,
    Variety,
}

impl IndicatorCategory {
    /// Fixed weight of this category in the overall score
    pub fn weight(&self) -> f64 {
        match self {
            IndicatorCategory::Frequency => 0.35,
            IndicatorCategory::Timing => 0.20,
            IndicatorCategory::Completeness => 0.30,
            IndicatorCategory::Variety => 0.15,
        }
    }
}

/// One drift signal produced per category per analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriftIndicator {
    pub id: String,
    pub category: IndicatorCategory,
    pub label: String,
    pub description: String,
    pub severity: DriftLevel,
    /// 0.0 - 1.0
    pub confidence: f64,
    pub data_points: u32,
}

/// Output of the drift scoring engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriftAnalysis {
    /// 0-100, higher = more engaged
    pub overall_score: u8,
    pub drift_level: DriftLevel,
    pub trend: TrendDirection,
    pub indicators: Vec<DriftIndicator>,
    pub days_analyzed: u32,
    pub last_updated: DateTime<Utc>,
    pub explanation: String,
    pub contributing_factors: Vec<String>,
}

impl DriftAnalysis {
    /// First indicator of the given category, if any
    pub fn indicator(&self, category: IndicatorCategory) -> Option<&DriftIndicator> {
        self.indicators.iter().find(|i| i.category == category)
    }

    /// True when the given category has a non-`none` indicator
    pub fn has_issue(&self, category: IndicatorCategory) -> bool {
        self.indicator(category)
            .map(|i| i.severity != DriftLevel::None)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, DriftLevel::Significant)]
    #[case(29, DriftLevel::Significant)]
    #[case(30, DriftLevel::Moderate)]
    #[case(49, DriftLevel::Moderate)]
    #[case(50, DriftLevel::Mild)]
    #[case(69, DriftLevel::Mild)]
    #[case(70, DriftLevel::None)]
    #[case(100, DriftLevel::None)]
    fn test_drift_level_from_score(#[case] score: u8, #[case] expected: DriftLevel) {
        assert_eq!(DriftLevel::from_score(score), expected);
    }

    #[test]
    fn test_category_weights_sum_to_one() {
        let total: f64 = [
            IndicatorCategory::Frequency,
            IndicatorCategory::Timing,
            IndicatorCategory::Completeness,
            IndicatorCategory::Variety,
        ]
        .iter()
        .map(|c| c.weight())
        .sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_log_category_parsing() {
        assert_eq!("meal".parse::<LogCategory>().unwrap(), LogCategory::Meal);
        assert_eq!("Diet".parse::<LogCategory>().unwrap(), LogCategory::Meal);
        assert_eq!("bp".parse::<LogCategory>().unwrap(), LogCategory::Bp);
        assert!("sleep".parse::<LogCategory>().is_err());
    }

    #[test]
    fn test_log_category_serde_alias() {
        let parsed: LogCategory = serde_json::from_str("\"meal\"").unwrap();
        assert_eq!(parsed, LogCategory::Meal);
        assert_eq!(serde_json::to_string(&LogCategory::Meal).unwrap(), "\"diet\"");
    }

    #[test]
    fn test_zero_denominators_count_as_met() {
        let day = DailyEngagement {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            logs_count: 0,
            expected_logs: 0,
            timing_consistency: 0.0,
            completed_tasks: 0,
            total_tasks: 0,
            activity_minutes: 0,
            meal_logs_count: 0,
            glucose_checks: 0,
        };
        assert_eq!(day.log_ratio(), 1.0);
        assert_eq!(day.completion_ratio(), 1.0);
    }
}
