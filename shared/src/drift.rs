//! Drift scoring engine
//!
//! Turns a window of daily engagement aggregates into a [`DriftAnalysis`].
//!
//! # Design Principles
//!
//! 1. **Pure Functions**: no I/O, the caller supplies `now`
//! 2. **Independent Indicators**: frequency, timing, completeness and variety
//!    are scored separately and blended with fixed category weights
//! 3. **Total**: an empty window yields a fixed maximum-drift result

use crate::models::{
    DailyEngagement, DriftAnalysis, DriftIndicator, DriftLevel, IndicatorCategory, TrendDirection,
};
use chrono::{DateTime, Utc};

/// Days per comparison period
const PERIOD_DAYS: usize = 7;

/// Trend compares entries [0, 3) against [4, 7); entry 3 is a gap
const TREND_RECENT: std::ops::Range<usize> = 0..3;
const TREND_OLDER: std::ops::Range<usize> = 4..7;
const TREND_THRESHOLD: f64 = 0.10;

/// Frequency week-over-week drop that is flagged even when the ratio is fine
const FREQUENCY_DROP_THRESHOLD: f64 = -0.2;

/// Score used when no indicator carries any weight
const NEUTRAL_SCORE: f64 = 50.0;

/// Drift scoring engine
#[derive(Debug, Clone, Default)]
pub struct DriftEngine;

impl DriftEngine {
    pub fn new() -> Self {
        Self
    }

    /// Analyze a most-recent-first window of daily aggregates
    pub fn analyze(&self, window: &[DailyEngagement], now: DateTime<Utc>) -> DriftAnalysis {
        if window.is_empty() {
            return Self::maximum_drift(now);
        }

        let indicators = vec![
            Self::analyze_frequency(window),
            Self::analyze_timing(window),
            Self::analyze_completeness(window),
            Self::analyze_variety(window),
        ];

        let overall_score = Self::overall_score(&indicators);
        let drift_level = DriftLevel::from_score(overall_score);
        let trend = Self::calculate_trend(window);

        let contributing_factors = indicators
            .iter()
            .filter(|i| i.severity != DriftLevel::None)
            .map(|i| i.description.clone())
            .collect();

        DriftAnalysis {
            overall_score,
            drift_level,
            trend,
            explanation: Self::explain(&indicators, trend),
            indicators,
            days_analyzed: window.len() as u32,
            last_updated: now,
            contributing_factors,
        }
    }

    /// Fixed result for an empty window
    pub fn maximum_drift(now: DateTime<Utc>) -> DriftAnalysis {
        DriftAnalysis {
            overall_score: 0,
            drift_level: DriftLevel::Significant,
            trend: TrendDirection::Declining,
            indicators: Vec::new(),
            days_analyzed: 0,
            last_updated: now,
            explanation: "We haven't seen any logs recently. Whenever you're ready, one quick entry is a great restart.".to_string(),
            contributing_factors: vec!["No logs recorded in the analysis window".to_string()],
        }
    }

    /// Confidence-and-category weighted mean of indicator severity scores
    pub fn overall_score(indicators: &[DriftIndicator]) -> u8 {
        let (weighted, total_weight) =
            indicators
                .iter()
                .fold((0.0, 0.0), |(weighted, total), indicator| {
                    let weight = indicator.category.weight() * indicator.confidence;
                    (
                        weighted + indicator.severity.severity_score() * weight,
                        total + weight,
                    )
                });

        let score = if total_weight > 0.0 {
            weighted / total_weight
        } else {
            NEUTRAL_SCORE
        };
        score.round().clamp(0.0, 100.0) as u8
    }

    fn recent(window: &[DailyEngagement]) -> &[DailyEngagement] {
        &window[..window.len().min(PERIOD_DAYS)]
    }

    fn confidence(entries: usize) -> f64 {
        (entries as f64 / PERIOD_DAYS as f64).min(1.0)
    }

    fn mean_by(entries: &[DailyEngagement], f: impl Fn(&DailyEngagement) -> f64) -> f64 {
        if entries.is_empty() {
            return 0.0;
        }
        entries.iter().map(f).sum::<f64>() / entries.len() as f64
    }

    fn indicator(
        category: IndicatorCategory,
        id: &str,
        label: &str,
        description: String,
        severity: DriftLevel,
        entries: usize,
    ) -> DriftIndicator {
        DriftIndicator {
            id: id.to_string(),
            category,
            label: label.to_string(),
            description,
            severity,
            confidence: Self::confidence(entries),
            data_points: entries as u32,
        }
    }

    fn analyze_frequency(window: &[DailyEngagement]) -> DriftIndicator {
        let recent = Self::recent(window);
        let previous = &window[recent.len()..window.len().min(PERIOD_DAYS * 2)];

        let recent_avg = Self::mean_by(recent, DailyEngagement::log_ratio);
        let previous_avg = if previous.is_empty() {
            recent_avg
        } else {
            Self::mean_by(previous, DailyEngagement::log_ratio)
        };
        let change = recent_avg - previous_avg;

        let severity = match DriftLevel::from_ratio(recent_avg) {
            DriftLevel::None if change < FREQUENCY_DROP_THRESHOLD => DriftLevel::Mild,
            level => level,
        };

        Self::indicator(
            IndicatorCategory::Frequency,
            "frequency",
            "Logging Frequency",
            format!(
                "{}% of expected logs recorded this week",
                (recent_avg * 100.0).round()
            ),
            severity,
            recent.len(),
        )
    }

    fn analyze_timing(window: &[DailyEngagement]) -> DriftIndicator {
        let recent = Self::recent(window);
        let consistency = Self::mean_by(recent, |d| d.timing_consistency);
        let severity = DriftLevel::from_ratio(consistency);

        let description = if severity == DriftLevel::None {
            "Logging at consistent times".to_string()
        } else {
            format!(
                "Timing varies more than usual ({}% consistency)",
                (consistency * 100.0).round()
            )
        };

        Self::indicator(
            IndicatorCategory::Timing,
            "timing",
            "Timing Consistency",
            description,
            severity,
            recent.len(),
        )
    }

    fn analyze_completeness(window: &[DailyEngagement]) -> DriftIndicator {
        let recent = Self::recent(window);
        let completion = Self::mean_by(recent, DailyEngagement::completion_ratio);

        Self::indicator(
            IndicatorCategory::Completeness,
            "tasks",
            "Task Completion",
            format!("{}% of daily tasks completed", (completion * 100.0).round()),
            DriftLevel::from_ratio(completion),
            recent.len(),
        )
    }

    fn analyze_variety(window: &[DailyEngagement]) -> DriftIndicator {
        let recent = Self::recent(window);
        let present = [
            recent.iter().any(|d| d.glucose_checks > 0),
            recent.iter().any(|d| d.meal_logs_count > 0),
            recent.iter().any(|d| d.activity_minutes > 0),
        ];
        let variety = present.iter().filter(|p| **p).count() as f64 / present.len() as f64;

        let (severity, description) = if variety < 0.4 {
            (DriftLevel::Moderate, "Some log types are missing recently")
        } else if variety < 0.7 {
            (DriftLevel::Mild, "Some log types are missing recently")
        } else {
            (DriftLevel::None, "Good variety of health data logged")
        };

        Self::indicator(
            IndicatorCategory::Variety,
            "variety",
            "Log Variety",
            description.to_string(),
            severity,
            recent.len(),
        )
    }

    /// Short-horizon trend of the logging ratio
    ///
    /// Windows shorter than a week are always `Stable`.
    pub fn calculate_trend(window: &[DailyEngagement]) -> TrendDirection {
        if window.len() < PERIOD_DAYS {
            return TrendDirection::Stable;
        }

        let recent = Self::mean_by(&window[TREND_RECENT], DailyEngagement::log_ratio);
        let older = Self::mean_by(&window[TREND_OLDER], DailyEngagement::log_ratio);
        let change = recent - older;

        if change > TREND_THRESHOLD {
            TrendDirection::Improving
        } else if change < -TREND_THRESHOLD {
            TrendDirection::Declining
        } else {
            TrendDirection::Stable
        }
    }

    fn explain(indicators: &[DriftIndicator], trend: TrendDirection) -> String {
        let concerning: Vec<String> = indicators
            .iter()
            .filter(|i| i.severity.is_concerning())
            .map(|i| i.label.to_lowercase())
            .collect();

        if concerning.is_empty() {
            return "You're doing great! Your engagement patterns show consistent self-care habits."
                .to_string();
        }

        if trend == TrendDirection::Improving {
            return "We notice you're getting back on track. Small steps make a big difference!"
                .to_string();
        }

        format!(
            "We've noticed some changes in your {}. Life gets busy sometimes, and that's okay.",
            concerning.join(" and ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, TimeZone};
    use proptest::prelude::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    fn day(offset: i64, logs: u32, timing: f64, completed: u32) -> DailyEngagement {
        DailyEngagement {
            date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap() - Duration::days(offset),
            logs_count: logs,
            expected_logs: 6,
            timing_consistency: timing,
            completed_tasks: completed,
            total_tasks: 5,
            activity_minutes: 30,
            meal_logs_count: 3,
            glucose_checks: 4,
        }
    }

    fn perfect_window() -> Vec<DailyEngagement> {
        (0..14).map(|d| day(d, 6, 1.0, 5)).collect()
    }

    #[test]
    fn test_empty_window_is_maximum_drift() {
        let analysis = DriftEngine::new().analyze(&[], now());
        assert_eq!(analysis.drift_level, DriftLevel::Significant);
        assert_eq!(analysis.overall_score, 0);
        assert_eq!(analysis.trend, TrendDirection::Declining);
        assert_eq!(analysis.days_analyzed, 0);
    }

    #[test]
    fn test_perfect_window_has_no_drift() {
        let analysis = DriftEngine::new().analyze(&perfect_window(), now());
        assert_eq!(analysis.overall_score, 100);
        assert_eq!(analysis.drift_level, DriftLevel::None);
        assert_eq!(analysis.trend, TrendDirection::Stable);
        assert!(analysis
            .indicators
            .iter()
            .all(|i| i.severity == DriftLevel::None && i.confidence == 1.0));
        assert!(analysis.contributing_factors.is_empty());
        assert_eq!(
            analysis.explanation,
            "You're doing great! Your engagement patterns show consistent self-care habits."
        );
    }

    #[test]
    fn test_sharp_decline_is_significant() {
        // Last three days silent, rest of the week at half, previous week near full
        let mut window = Vec::new();
        for d in 0..3 {
            window.push(day(d, 0, 0.1, 0));
        }
        for d in 3..7 {
            window.push(day(d, 3, 0.3, 1));
        }
        for d in 7..14 {
            window.push(day(d, 5, 0.9, 5));
        }

        let analysis = DriftEngine::new().analyze(&window, now());
        let frequency = analysis.indicator(IndicatorCategory::Frequency).unwrap();
        assert_eq!(frequency.severity, DriftLevel::Significant);
        assert_eq!(analysis.trend, TrendDirection::Declining);
        assert_eq!(analysis.drift_level, DriftLevel::Significant);
        assert!(analysis.explanation.contains("logging frequency"));
    }

    #[test]
    fn test_week_over_week_drop_flags_mild() {
        // Recent ratio 0.75 is fine on its own, but 0.25 below the previous week
        let mut window: Vec<_> = (0..7).map(|d| day(d, 6, 1.0, 5)).collect();
        for entry in window.iter_mut() {
            entry.expected_logs = 8;
        }
        window.extend((7..14).map(|d| day(d, 6, 1.0, 5)));

        let analysis = DriftEngine::new().analyze(&window, now());
        let frequency = analysis.indicator(IndicatorCategory::Frequency).unwrap();
        assert_eq!(frequency.severity, DriftLevel::Mild);
    }

    #[test]
    fn test_short_window_is_stable_with_partial_confidence() {
        let window: Vec<_> = (0..3).map(|d| day(d, 1, 0.2, 0)).collect();
        let analysis = DriftEngine::new().analyze(&window, now());
        assert_eq!(analysis.trend, TrendDirection::Stable);
        for indicator in &analysis.indicators {
            assert!((indicator.confidence - 3.0 / 7.0).abs() < 1e-9);
            assert_eq!(indicator.data_points, 3);
        }
    }

    #[test]
    fn test_improving_trend_detected() {
        let mut window: Vec<_> = (0..3).map(|d| day(d, 6, 0.8, 4)).collect();
        window.extend((3..14).map(|d| day(d, 2, 0.8, 4)));
        assert_eq!(DriftEngine::calculate_trend(&window), TrendDirection::Improving);
    }

    #[test]
    fn test_missing_categories_reduce_variety() {
        let mut window = perfect_window();
        for entry in window.iter_mut() {
            entry.activity_minutes = 0;
            entry.meal_logs_count = 0;
        }
        let analysis = DriftEngine::new().analyze(&window, now());
        let variety = analysis.indicator(IndicatorCategory::Variety).unwrap();
        assert_eq!(variety.severity, DriftLevel::Moderate);
        assert_eq!(variety.description, "Some log types are missing recently");
    }

    #[test]
    fn test_zero_weight_defaults_to_neutral() {
        assert_eq!(DriftEngine::overall_score(&[]), 50);
    }

    #[test]
    fn test_analysis_is_idempotent() {
        let window: Vec<_> = (0..14).map(|d| day(d, (d % 6) as u32, 0.5, 3)).collect();
        let engine = DriftEngine::new();
        let first = serde_json::to_string(&engine.analyze(&window, now())).unwrap();
        let second = serde_json::to_string(&engine.analyze(&window, now())).unwrap();
        assert_eq!(first, second);
    }

    fn arb_day() -> impl Strategy<Value = DailyEngagement> {
        (0u32..10, 0u32..8, 0.0f64..=1.0, 0u32..6, 0u32..6, 0u32..60, 0u32..4, 0u32..5).prop_map(
            |(logs, expected, timing, completed, total, activity, meals, glucose)| DailyEngagement {
                date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
                logs_count: logs,
                expected_logs: expected,
                timing_consistency: timing,
                completed_tasks: completed.min(total),
                total_tasks: total,
                activity_minutes: activity,
                meal_logs_count: meals,
                glucose_checks: glucose,
            },
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Score stays within 0-100 and the level follows the score thresholds
        #[test]
        fn prop_score_bounded_and_level_matches(window in prop::collection::vec(arb_day(), 1..=14)) {
            let analysis = DriftEngine::new().analyze(&window, now());
            prop_assert!(analysis.overall_score <= 100);
            prop_assert_eq!(analysis.drift_level, DriftLevel::from_score(analysis.overall_score));
            prop_assert_eq!(analysis.indicators.len(), 4);
            prop_assert_eq!(analysis.days_analyzed as usize, window.len());
        }

        /// Windows shorter than a week never report a trend
        #[test]
        fn prop_short_window_stable(window in prop::collection::vec(arb_day(), 1..7)) {
            prop_assert_eq!(DriftEngine::calculate_trend(&window), TrendDirection::Stable);
        }
    }
}
