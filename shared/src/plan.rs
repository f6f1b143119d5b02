//! Adaptive plan state machine
//!
//! Maps a drift analysis to a plan mode and computes the resulting task
//! load. Safety-related categories are validated at construction and always
//! resolve to their full count.

use crate::errors::ConfigError;
use crate::models::{DriftAnalysis, DriftLevel, TrendDirection};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

pub const PLAN_DISCLAIMER: &str = "Task adjustments are for engagement support only. All safety-critical tasks (glucose monitoring, medications) remain unchanged. This is not medical advice.";
pub const PLAN_PRIVACY_NOTE: &str =
    "Plan adjustments are computed locally. No personal data is stored or shared.";
pub const DEFAULT_AUTO_RESTORE_DAYS: u32 = 7;

/// Task-load tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanMode {
    #[default]
    Full,
    Reduced,
    Minimal,
}

/// Display information for a plan mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanModeInfo {
    pub label: String,
    pub description: String,
    pub icon: String,
}

impl PlanMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanMode::Full => "full",
            PlanMode::Reduced => "reduced",
            PlanMode::Minimal => "minimal",
        }
    }

    pub fn info(&self) -> PlanModeInfo {
        let (label, description, icon) = match self {
            PlanMode::Full => ("Full Plan", "Your complete care routine", "☀️"),
            PlanMode::Reduced => ("Balanced Mode", "A lighter load to help you ease back in", "🌤️"),
            PlanMode::Minimal => ("Light Mode", "Focusing on essentials while you recharge", "🌙"),
        };
        PlanModeInfo {
            label: label.to_string(),
            description: description.to_string(),
            icon: icon.to_string(),
        }
    }
}

impl fmt::Display for PlanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(PlanMode::Full),
            "reduced" => Ok(PlanMode::Reduced),
            "minimal" => Ok(PlanMode::Minimal),
            other => Err(format!("Unknown plan mode: {}", other)),
        }
    }
}

/// A configurable group of daily care tasks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCategory {
    pub id: String,
    pub name: String,
    pub is_safety_related: bool,
    pub full_mode_count: u32,
    pub reduced_mode_count: u32,
    pub minimal_mode_count: u32,
}

impl TaskCategory {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        is_safety_related: bool,
        counts: (u32, u32, u32),
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_safety_related,
            full_mode_count: counts.0,
            reduced_mode_count: counts.1,
            minimal_mode_count: counts.2,
        }
    }

    /// Active task count under `mode`; safety categories never drop below full
    pub fn count_for(&self, mode: PlanMode) -> u32 {
        if self.is_safety_related {
            return self.full_mode_count;
        }
        match mode {
            PlanMode::Full => self.full_mode_count,
            PlanMode::Reduced => self.reduced_mode_count,
            PlanMode::Minimal => self.minimal_mode_count,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let (full, reduced, minimal) = (
            self.full_mode_count,
            self.reduced_mode_count,
            self.minimal_mode_count,
        );
        if self.is_safety_related && !(full == reduced && reduced == minimal) {
            return Err(ConfigError::SafetyTaskReduced {
                id: self.id.clone(),
                full,
                reduced,
                minimal,
            });
        }
        if !(minimal <= reduced && reduced <= full) {
            return Err(ConfigError::NonMonotonicCounts {
                id: self.id.clone(),
                full,
                reduced,
                minimal,
            });
        }
        Ok(())
    }
}

/// Validated set of task categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanConfig {
    categories: Vec<TaskCategory>,
}

impl PlanConfig {
    pub fn new(categories: Vec<TaskCategory>) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        for category in &categories {
            category.validate()?;
            if !seen.insert(category.id.as_str()) {
                return Err(ConfigError::DuplicateCategory(category.id.clone()));
            }
        }
        Ok(Self { categories })
    }

    /// Default diabetes-care task load
    pub fn diabetes_care() -> Self {
        Self {
            categories: vec![
                TaskCategory::new("glucose", "Glucose Monitoring", true, (4, 4, 4)),
                TaskCategory::new("medication", "Medication Reminders", true, (3, 3, 3)),
                TaskCategory::new("meals", "Meal Logging", false, (3, 2, 1)),
                TaskCategory::new("activity", "Activity Tracking", false, (2, 1, 0)),
                TaskCategory::new("wellness", "Wellness Check-ins", false, (2, 1, 0)),
                TaskCategory::new("education", "Health Tips", false, (1, 0, 0)),
            ],
        }
    }

    pub fn categories(&self) -> &[TaskCategory] {
        &self.categories
    }
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self::diabetes_care()
    }
}

/// The part of a plan carried between evaluations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanState {
    pub current_mode: PlanMode,
    pub mode_changed_at: DateTime<Utc>,
}

/// Result of one plan evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdaptivePlan {
    pub current_mode: PlanMode,
    pub previous_mode: PlanMode,
    pub mode_changed_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_restore_at: Option<DateTime<Utc>>,
    pub task_categories: Vec<TaskCategory>,
    pub total_tasks: u32,
    pub active_tasks: u32,
    pub reduction_percent: u32,
    pub disclaimer: String,
}

impl AdaptivePlan {
    pub fn state(&self) -> PlanState {
        PlanState {
            current_mode: self.current_mode,
            mode_changed_at: self.mode_changed_at,
        }
    }
}

/// Evaluates plans against drift analyses
#[derive(Debug, Clone)]
pub struct AdaptivePlanner {
    config: PlanConfig,
    auto_restore_days: u32,
}

impl Default for AdaptivePlanner {
    fn default() -> Self {
        Self::new(PlanConfig::default(), DEFAULT_AUTO_RESTORE_DAYS)
    }
}

impl AdaptivePlanner {
    pub fn new(config: PlanConfig, auto_restore_days: u32) -> Self {
        Self {
            config,
            auto_restore_days,
        }
    }

    pub fn config(&self) -> &PlanConfig {
        &self.config
    }

    /// Transition function; only the current analysis matters
    pub fn determine_mode(analysis: &DriftAnalysis) -> PlanMode {
        if analysis.trend == TrendDirection::Improving {
            return match analysis.drift_level {
                DriftLevel::Significant | DriftLevel::Moderate => PlanMode::Reduced,
                _ => PlanMode::Full,
            };
        }

        match analysis.drift_level {
            DriftLevel::Significant => PlanMode::Minimal,
            DriftLevel::Moderate | DriftLevel::Mild => PlanMode::Reduced,
            DriftLevel::None => PlanMode::Full,
        }
    }

    /// Build the plan for `analysis`, carrying `modeChangedAt` from `previous`
    /// when the mode is unchanged
    pub fn evaluate(
        &self,
        analysis: &DriftAnalysis,
        previous: Option<&PlanState>,
        now: DateTime<Utc>,
    ) -> AdaptivePlan {
        let mode = Self::determine_mode(analysis);
        let previous_mode = previous.map(|p| p.current_mode).unwrap_or_default();

        let mode_changed_at = match previous {
            Some(state) if state.current_mode == mode => state.mode_changed_at,
            _ => now,
        };

        let categories = self.config.categories();
        let total_tasks: u32 = categories.iter().map(|c| c.full_mode_count).sum();
        let active_tasks: u32 = categories.iter().map(|c| c.count_for(mode)).sum();

        let auto_restore_at =
            (mode != PlanMode::Full).then(|| now + Duration::days(self.auto_restore_days as i64));

        AdaptivePlan {
            current_mode: mode,
            previous_mode,
            mode_changed_at,
            auto_restore_at,
            task_categories: categories.to_vec(),
            total_tasks,
            active_tasks,
            reduction_percent: reduction_percent(active_tasks, total_tasks),
            disclaimer: PLAN_DISCLAIMER.to_string(),
        }
    }
}

fn reduction_percent(active: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    ((1.0 - active as f64 / total as f64) * 100.0).round().max(0.0) as u32
}

/// Whether an external scheduler should re-run the transition for `mode`
pub fn should_restore(mode: PlanMode, analysis: &DriftAnalysis) -> bool {
    if mode == PlanMode::Full {
        return false;
    }
    (analysis.drift_level == DriftLevel::None && analysis.overall_score >= 70)
        || (analysis.trend == TrendDirection::Improving && analysis.overall_score >= 60)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSummary {
    pub total: u32,
    pub active: u32,
    pub reduction_percent: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyTaskExport {
    pub name: String,
    pub count: u32,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustableTaskExport {
    pub name: String,
    pub full_count: u32,
    pub current_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSummary {
    pub mode: PlanMode,
    pub mode_info: PlanModeInfo,
    pub task_summary: TaskSummary,
    pub safety_tasks: Vec<SafetyTaskExport>,
    pub adjustable_tasks: Vec<AdjustableTaskExport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_restore_date: Option<DateTime<Utc>>,
}

/// Shareable plan document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanExport {
    pub disclaimer: String,
    pub privacy_note: String,
    pub plan: PlanSummary,
}

pub fn export_plan(plan: &AdaptivePlan) -> PlanExport {
    let (safety, adjustable): (Vec<&TaskCategory>, Vec<&TaskCategory>) =
        plan.task_categories.iter().partition(|c| c.is_safety_related);

    PlanExport {
        disclaimer: plan.disclaimer.clone(),
        privacy_note: PLAN_PRIVACY_NOTE.to_string(),
        plan: PlanSummary {
            mode: plan.current_mode,
            mode_info: plan.current_mode.info(),
            task_summary: TaskSummary {
                total: plan.total_tasks,
                active: plan.active_tasks,
                reduction_percent: plan.reduction_percent,
            },
            safety_tasks: safety
                .into_iter()
                .map(|c| SafetyTaskExport {
                    name: c.name.clone(),
                    count: c.full_mode_count,
                    note: "Never reduced".to_string(),
                })
                .collect(),
            adjustable_tasks: adjustable
                .into_iter()
                .map(|c| AdjustableTaskExport {
                    name: c.name.clone(),
                    full_count: c.full_mode_count,
                    current_count: c.count_for(plan.current_mode),
                })
                .collect(),
            auto_restore_date: plan.auto_restore_at,
        },
    }
}
