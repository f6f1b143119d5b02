//! Daily engagement window aggregation
//!
//! Folds raw log events into the per-day aggregates consumed by the
//! [`DriftEngine`](crate::drift::DriftEngine). Windows are derived on every
//! analysis call and never stored.

use crate::models::{DailyEngagement, LogCategory, LogEvent};
use chrono::{DateTime, Duration, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Hours of average deviation at which timing consistency reaches zero
const TIMING_TOLERANCE_HOURS: f64 = 6.0;

/// Window aggregation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Analysis horizon in days
    pub window_days: u32,
    /// Logs expected on a typical day
    pub expected_logs_per_day: u32,
    /// Daily task target per category; completion is capped at the target
    pub task_targets: BTreeMap<LogCategory, u32>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            window_days: 14,
            expected_logs_per_day: 6,
            task_targets: BTreeMap::from([
                (LogCategory::Glucose, 2),
                (LogCategory::Meal, 2),
                (LogCategory::Activity, 1),
            ]),
        }
    }
}

impl WindowConfig {
    pub fn total_tasks(&self) -> u32 {
        self.task_targets.values().sum()
    }
}

/// Aggregate raw events into `window_days` daily entries, most recent first
///
/// Day boundaries are UTC calendar days; entry 0 is the day containing `now`.
/// Events outside the window are ignored.
pub fn aggregate_window(
    events: &[LogEvent],
    now: DateTime<Utc>,
    config: &WindowConfig,
) -> Vec<DailyEngagement> {
    let today = now.date_naive();
    let days = config.window_days as i64;
    let first_day = today - Duration::days(days - 1);

    let in_window: Vec<&LogEvent> = events
        .iter()
        .filter(|e| {
            let date = e.timestamp.date_naive();
            date >= first_day && date <= today && e.timestamp <= now
        })
        .collect();

    let category_mean_hour = mean_hour_by_category(&in_window);

    let mut by_day: HashMap<NaiveDate, Vec<&LogEvent>> = HashMap::new();
    for event in &in_window {
        by_day
            .entry(event.timestamp.date_naive())
            .or_default()
            .push(event);
    }

    (0..days)
        .map(|offset| {
            let date = today - Duration::days(offset);
            let day_events = by_day.get(&date).map(Vec::as_slice).unwrap_or(&[]);
            summarize_day(date, day_events, &category_mean_hour, config)
        })
        .collect()
}

fn fractional_hour(timestamp: &DateTime<Utc>) -> f64 {
    timestamp.hour() as f64 + timestamp.minute() as f64 / 60.0
}

fn mean_hour_by_category(events: &[&LogEvent]) -> HashMap<LogCategory, f64> {
    let mut sums: HashMap<LogCategory, (f64, u32)> = HashMap::new();
    for event in events {
        let entry = sums.entry(event.category).or_insert((0.0, 0));
        entry.0 += fractional_hour(&event.timestamp);
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|(category, (sum, count))| (category, sum / count as f64))
        .collect()
}

fn summarize_day(
    date: NaiveDate,
    events: &[&LogEvent],
    category_mean_hour: &HashMap<LogCategory, f64>,
    config: &WindowConfig,
) -> DailyEngagement {
    let count = |category: LogCategory| events.iter().filter(|e| e.category == category).count() as u32;

    let activity_minutes = events
        .iter()
        .filter(|e| e.category == LogCategory::Activity)
        .map(|e| e.value.map(|v| v.max(0.0).round() as u32).unwrap_or(1))
        .sum();

    let completed_tasks = config
        .task_targets
        .iter()
        .map(|(category, target)| count(*category).min(*target))
        .sum();

    DailyEngagement {
        date,
        logs_count: events.len() as u32,
        expected_logs: config.expected_logs_per_day,
        timing_consistency: timing_consistency(events, category_mean_hour),
        completed_tasks,
        total_tasks: config.total_tasks(),
        activity_minutes,
        meal_logs_count: count(LogCategory::Meal),
        glucose_checks: count(LogCategory::Glucose),
    }
}

/// 1.0 when every log lands at its category's usual hour, 0.0 at six hours off
fn timing_consistency(events: &[&LogEvent], category_mean_hour: &HashMap<LogCategory, f64>) -> f64 {
    if events.is_empty() {
        return 0.0;
    }

    let total_distance: f64 = events
        .iter()
        .map(|e| {
            let usual = category_mean_hour
                .get(&e.category)
                .copied()
                .unwrap_or_else(|| fractional_hour(&e.timestamp));
            (fractional_hour(&e.timestamp) - usual).abs()
        })
        .sum();
    let mean_distance = total_distance / events.len() as f64;

    (1.0 - mean_distance / TIMING_TOLERANCE_HOURS).clamp(0.0, 1.0)
}
