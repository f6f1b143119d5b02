//! Synthetic engagement windows
//!
//! Generates artificial 14-day windows for demos and tests. No real patient
//! data is involved. A seed makes the output reproducible.

use crate::models::DailyEngagement;
use chrono::{DateTime, Duration, Utc};
use rand::{Rng, SeedableRng};
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const SCENARIO_DAYS: u32 = 14;
const EXPECTED_LOGS: u32 = 6;
const EXPECTED_TASKS: u32 = 5;

/// Shape of the generated engagement curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioPattern {
    Stable,
    #[default]
    Declining,
    Recovering,
}

impl ScenarioPattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioPattern::Stable => "stable",
            ScenarioPattern::Declining => "declining",
            ScenarioPattern::Recovering => "recovering",
        }
    }

    /// Engagement multiplier for the day `days_ago` back
    fn multiplier(&self, days_ago: u32, days: u32) -> f64 {
        match self {
            ScenarioPattern::Stable => 1.0,
            ScenarioPattern::Declining => (1.0 - (days - days_ago) as f64 * 0.08).max(0.2),
            ScenarioPattern::Recovering => {
                let midpoint = days as f64 / 2.0;
                0.4 + (midpoint - days_ago as f64).abs() * 0.08
            }
        }
    }
}

impl fmt::Display for ScenarioPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScenarioPattern {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stable" | "engaged" => Ok(ScenarioPattern::Stable),
            "declining" | "drifting" => Ok(ScenarioPattern::Declining),
            "recovering" => Ok(ScenarioPattern::Recovering),
            other => Err(format!("Unknown scenario: {}", other)),
        }
    }
}

/// A generated window with its headline numbers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyntheticScenario {
    pub pattern: ScenarioPattern,
    pub daily_engagement: Vec<DailyEngagement>,
    pub average_logs_per_day: f64,
    pub streak_days: u32,
}

/// Generate a scenario ending at `now`; `seed` pins the noise
pub fn generate_scenario(
    pattern: ScenarioPattern,
    now: DateTime<Utc>,
    seed: Option<u64>,
) -> SyntheticScenario {
    let mut rng = match seed {
        Some(seed) => Mcg128Xsl64::seed_from_u64(seed),
        None => Mcg128Xsl64::from_entropy(),
    };

    let daily_engagement: Vec<DailyEngagement> = (0..SCENARIO_DAYS)
        .map(|days_ago| generate_day(pattern, days_ago, now, &mut rng))
        .collect();

    let average_logs_per_day = daily_engagement
        .iter()
        .map(|d| d.logs_count as f64)
        .sum::<f64>()
        / SCENARIO_DAYS as f64;

    SyntheticScenario {
        pattern,
        streak_days: streak_days(&daily_engagement),
        daily_engagement,
        average_logs_per_day,
    }
}

fn generate_day(
    pattern: ScenarioPattern,
    days_ago: u32,
    now: DateTime<Utc>,
    rng: &mut Mcg128Xsl64,
) -> DailyEngagement {
    let m = pattern.multiplier(days_ago, SCENARIO_DAYS);
    let scaled = |base: f64, low: f64, high: f64, rng: &mut Mcg128Xsl64| -> u32 {
        (base * m * rng.gen_range(low..high)).round().max(0.0) as u32
    };

    let logs_count = scaled(EXPECTED_LOGS as f64, 0.8, 1.2, rng);
    let completed_tasks = scaled(EXPECTED_TASKS as f64, 0.7, 1.2, rng).min(EXPECTED_TASKS);
    let timing_consistency = (m * rng.gen_range(0.7..1.0)).clamp(0.0, 1.0);

    DailyEngagement {
        date: (now - Duration::days(days_ago as i64)).date_naive(),
        logs_count,
        expected_logs: EXPECTED_LOGS,
        timing_consistency,
        completed_tasks,
        total_tasks: EXPECTED_TASKS,
        activity_minutes: scaled(30.0, 0.5, 1.5, rng),
        meal_logs_count: scaled(3.0, 0.6, 1.2, rng),
        glucose_checks: scaled(4.0, 0.5, 1.2, rng),
    }
}

/// Consecutive most-recent days with at least half the expected logs
pub fn streak_days(window: &[DailyEngagement]) -> u32 {
    window
        .iter()
        .take_while(|d| d.logs_count as f64 >= d.expected_logs as f64 * 0.5)
        .count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drift::DriftEngine;
    use crate::models::{DriftLevel, TrendDirection};
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_same_seed_same_window() {
        let a = generate_scenario(ScenarioPattern::Recovering, now(), Some(7));
        let b = generate_scenario(ScenarioPattern::Recovering, now(), Some(7));
        assert_eq!(a, b);
        assert_eq!(a.daily_engagement.len(), 14);
        assert_eq!(a.daily_engagement[0].date, now().date_naive());
    }

    #[test]
    fn test_stable_scenario_has_no_drift() {
        let scenario = generate_scenario(ScenarioPattern::Stable, now(), Some(1));
        let analysis = DriftEngine::new().analyze(&scenario.daily_engagement, now());
        assert!(analysis.drift_level <= DriftLevel::Mild);
        assert!(scenario.average_logs_per_day >= 4.0);
    }

    #[test]
    fn test_declining_scenario_drifts() {
        let scenario = generate_scenario(ScenarioPattern::Declining, now(), Some(1));
        let analysis = DriftEngine::new().analyze(&scenario.daily_engagement, now());
        assert!(analysis.drift_level >= DriftLevel::Moderate);
        assert_eq!(scenario.streak_days, 0);
    }

    #[test]
    fn test_recovering_scenario_improves() {
        let improving = (0..10)
            .map(|seed| generate_scenario(ScenarioPattern::Recovering, now(), Some(seed)))
            .filter(|s| DriftEngine::calculate_trend(&s.daily_engagement) == TrendDirection::Improving)
            .count();
        assert!(improving >= 8, "only {} of 10 recovering windows improved", improving);
    }

    #[test]
    fn test_streak_stops_at_first_quiet_day() {
        let mut scenario = generate_scenario(ScenarioPattern::Stable, now(), Some(5));
        for day in scenario.daily_engagement.iter_mut() {
            day.logs_count = 6;
        }
        scenario.daily_engagement[3].logs_count = 2;
        assert_eq!(streak_days(&scenario.daily_engagement), 3);
        assert_eq!(streak_days(&[]), 0);
    }

    #[test]
    fn test_pattern_aliases() {
        assert_eq!("engaged".parse(), Ok(ScenarioPattern::Stable));
        assert_eq!("Drifting".parse(), Ok(ScenarioPattern::Declining));
        assert!("chaotic".parse::<ScenarioPattern>().is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_generated_days_are_well_formed(seed in any::<u64>(), pattern in 0usize..3) {
            let pattern = [ScenarioPattern::Stable, ScenarioPattern::Declining, ScenarioPattern::Recovering][pattern];
            let scenario = generate_scenario(pattern, now(), Some(seed));
            for day in &scenario.daily_engagement {
                prop_assert!(day.completed_tasks <= day.total_tasks);
                prop_assert!((0.0..=1.0).contains(&day.timing_consistency));
            }
            prop_assert!(scenario.streak_days <= SCENARIO_DAYS);
        }
    }
}
