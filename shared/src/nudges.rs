//! Nudge selection policy
//!
//! Maps a [`DriftAnalysis`] to a short list of supportive messages. Every
//! matching rule fires, and the result is ordered by priority (1 = most
//! urgent). Message text comes from an injected [`NudgeCatalog`].

use crate::language::Language;
use crate::models::{DriftAnalysis, DriftLevel, IndicatorCategory, TrendDirection};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Score at or above which a drift-free analysis is celebrated
const CELEBRATION_MIN_SCORE: u8 = 80;

/// Consecutive logging days needed for a streak celebration
pub const STREAK_CELEBRATION_MIN_DAYS: u32 = 7;

/// Nudge purpose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NudgeType {
    Encouragement,
    Reminder,
    Celebration,
    Support,
    Tip,
}

/// Emotional tone; styling is decided by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NudgeTone {
    Warm,
    Gentle,
    Celebratory,
    Understanding,
}

impl NudgeTone {
    pub fn as_str(&self) -> &'static str {
        match self {
            NudgeTone::Warm => "warm",
            NudgeTone::Gentle => "gentle",
            NudgeTone::Celebratory => "celebratory",
            NudgeTone::Understanding => "understanding",
        }
    }
}

/// What the optional action button does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NudgeAction {
    Log,
    View,
    Adjust,
    Dismiss,
}

/// Identifies a template in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NudgeKey {
    HighEngagement,
    ImprovingTrend,
    MissedLogging,
    TimingShift,
    LifeHappens,
    SmallSteps,
    ReducedPlan,
    WelcomeBack,
    StreakCelebration,
}

impl NudgeKey {
    /// Stable nudge id for this template
    fn nudge_id(&self) -> &'static str {
        match self {
            NudgeKey::HighEngagement => "nudge-celebration-1",
            NudgeKey::ImprovingTrend => "nudge-improving-1",
            NudgeKey::MissedLogging => "nudge-frequency-1",
            NudgeKey::TimingShift => "nudge-timing-1",
            NudgeKey::LifeHappens => "nudge-support-1",
            NudgeKey::SmallSteps => "nudge-steps-1",
            NudgeKey::ReducedPlan => "nudge-reduced-1",
            NudgeKey::WelcomeBack => "nudge-welcome-1",
            NudgeKey::StreakCelebration => "nudge-streak-1",
        }
    }
}

/// Fixed template; only `message` may contain `{percent}` or `{days}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NudgeTemplate {
    #[serde(rename = "type")]
    pub nudge_type: NudgeType,
    pub tone: NudgeTone,
    pub title: String,
    pub message: String,
    pub emoji: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_type: Option<NudgeAction>,
    pub priority: u8,
}

/// A generated nudge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nudge {
    pub id: String,
    pub key: NudgeKey,
    #[serde(rename = "type")]
    pub nudge_type: NudgeType,
    pub tone: NudgeTone,
    pub title: String,
    pub message: String,
    pub emoji: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_type: Option<NudgeAction>,
    /// 1-5, lower = more urgent
    pub priority: u8,
}

/// Per-language nudge templates with English fallback
#[derive(Debug, Clone, Default)]
pub struct NudgeCatalog {
    templates: HashMap<(Language, NudgeKey), NudgeTemplate>,
}

impl NudgeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a template
    pub fn with_template(mut self, language: Language, key: NudgeKey, template: NudgeTemplate) -> Self {
        self.templates.insert((language, key), template);
        self
    }

    /// Look up a template, falling back to English
    pub fn template(&self, key: NudgeKey, language: Language) -> Option<&NudgeTemplate> {
        self.templates
            .get(&(language, key))
            .or_else(|| self.templates.get(&(Language::En, key)))
    }

    /// The built-in English catalog
    pub fn english() -> Self {
        fn template(
            nudge_type: NudgeType,
            tone: NudgeTone,
            title: &str,
            message: &str,
            emoji: &str,
            action: Option<(&str, NudgeAction)>,
            priority: u8,
        ) -> NudgeTemplate {
            NudgeTemplate {
                nudge_type,
                tone,
                title: title.to_string(),
                message: message.to_string(),
                emoji: emoji.to_string(),
                action_label: action.map(|(label, _)| label.to_string()),
                action_type: action.map(|(_, kind)| kind),
                priority,
            }
        }

        let en = Language::En;
        Self::new()
            .with_template(en, NudgeKey::HighEngagement, template(
                NudgeType::Celebration,
                NudgeTone::Celebratory,
                "Great week!",
                "You completed {percent}% of your care tasks this week. That's wonderful consistency!",
                "⭐",
                None,
                3,
            ))
            .with_template(en, NudgeKey::MissedLogging, template(
                NudgeType::Reminder,
                NudgeTone::Gentle,
                "Quick check-in",
                "We noticed fewer logs lately. Would you like to add a quick entry? Even a small note helps!",
                "📝",
                Some(("Log now", NudgeAction::Log)),
                2,
            ))
            .with_template(en, NudgeKey::TimingShift, template(
                NudgeType::Tip,
                NudgeTone::Warm,
                "Flexible timing",
                "Your schedule seems different lately. Would you like to adjust your reminder times to better fit your day?",
                "⏰",
                Some(("Adjust times", NudgeAction::Adjust)),
                3,
            ))
            .with_template(en, NudgeKey::LifeHappens, template(
                NudgeType::Support,
                NudgeTone::Understanding,
                "Life gets busy",
                "We understand things can get hectic. Your care plan is still here whenever you're ready. No pressure.",
                "💙",
                None,
                2,
            ))
            .with_template(en, NudgeKey::SmallSteps, template(
                NudgeType::Encouragement,
                NudgeTone::Warm,
                "One step at a time",
                "Even checking in once today counts. Small steps are still steps forward.",
                "👣",
                Some(("Quick log", NudgeAction::Log)),
                2,
            ))
            .with_template(en, NudgeKey::WelcomeBack, template(
                NudgeType::Encouragement,
                NudgeTone::Warm,
                "Welcome back!",
                "We've simplified your plan while you were away. Ready to ease back in at your own pace?",
                "🌱",
                Some(("View plan", NudgeAction::View)),
                1,
            ))
            .with_template(en, NudgeKey::ReducedPlan, template(
                NudgeType::Support,
                NudgeTone::Understanding,
                "Lighter load ahead",
                "We've temporarily reduced your daily tasks to make things easier. Focus on what feels manageable.",
                "🍃",
                None,
                1,
            ))
            .with_template(en, NudgeKey::ImprovingTrend, template(
                NudgeType::Celebration,
                NudgeTone::Celebratory,
                "You're doing great!",
                "We see you're getting back on track. Your consistency is improving, keep it up!",
                "📈",
                None,
                2,
            ))
            .with_template(en, NudgeKey::StreakCelebration, template(
                NudgeType::Celebration,
                NudgeTone::Celebratory,
                "Amazing streak! 🌟",
                "You've been consistently logging for {days} days. Your dedication to self-care is inspiring!",
                "🎉",
                None,
                3,
            ))
    }
}

/// Rule-based nudge selection
#[derive(Debug, Clone)]
pub struct NudgePolicy {
    catalog: NudgeCatalog,
}

impl Default for NudgePolicy {
    fn default() -> Self {
        Self::new(NudgeCatalog::english())
    }
}

impl NudgePolicy {
    pub fn new(catalog: NudgeCatalog) -> Self {
        Self { catalog }
    }

    /// Template keys that fire for an analysis, in rule order
    pub fn select_keys(analysis: &DriftAnalysis) -> Vec<NudgeKey> {
        let mut keys = Vec::new();

        if analysis.drift_level == DriftLevel::None && analysis.overall_score >= CELEBRATION_MIN_SCORE {
            keys.push(NudgeKey::HighEngagement);
        }

        if analysis.trend == TrendDirection::Improving && analysis.drift_level != DriftLevel::None {
            keys.push(NudgeKey::ImprovingTrend);
        }

        match analysis.drift_level {
            DriftLevel::Mild => {
                if analysis.has_issue(IndicatorCategory::Frequency) {
                    keys.push(NudgeKey::MissedLogging);
                }
                if analysis.has_issue(IndicatorCategory::Timing) {
                    keys.push(NudgeKey::TimingShift);
                }
            }
            DriftLevel::Moderate => {
                keys.push(NudgeKey::LifeHappens);
                keys.push(NudgeKey::SmallSteps);
            }
            DriftLevel::Significant => {
                keys.push(NudgeKey::ReducedPlan);
                if analysis.trend == TrendDirection::Improving {
                    keys.push(NudgeKey::WelcomeBack);
                }
            }
            DriftLevel::None => {}
        }

        keys
    }

    /// Generate nudges sorted ascending by priority
    ///
    /// Keys missing from the catalog are skipped.
    pub fn generate(&self, analysis: &DriftAnalysis, language: Language) -> Vec<Nudge> {
        let mut nudges: Vec<Nudge> = Self::select_keys(analysis)
            .into_iter()
            .filter_map(|key| {
                self.catalog
                    .template(key, language)
                    .map(|template| Self::render(key, template, analysis))
            })
            .collect();

        // Stable: ties keep rule order
        nudges.sort_by_key(|n| n.priority);
        nudges
    }

    /// Streak celebration, kept apart from the drift rules
    ///
    /// `None` below [`STREAK_CELEBRATION_MIN_DAYS`] or without a template.
    pub fn streak_celebration(&self, streak_days: u32, language: Language) -> Option<Nudge> {
        if streak_days < STREAK_CELEBRATION_MIN_DAYS {
            return None;
        }
        let key = NudgeKey::StreakCelebration;
        self.catalog.template(key, language).map(|template| {
            let message = template.message.replace("{days}", &streak_days.to_string());
            Self::build(key, template, message)
        })
    }

    fn render(key: NudgeKey, template: &NudgeTemplate, analysis: &DriftAnalysis) -> Nudge {
        let message = template
            .message
            .replace("{percent}", &analysis.overall_score.to_string());
        Self::build(key, template, message)
    }

    fn build(key: NudgeKey, template: &NudgeTemplate, message: String) -> Nudge {
        Nudge {
            id: key.nudge_id().to_string(),
            key,
            nudge_type: template.nudge_type,
            tone: template.tone,
            title: template.title.clone(),
            message,
            emoji: template.emoji.clone(),
            action_label: template.action_label.clone(),
            action_type: template.action_type,
            priority: template.priority,
        }
    }
}
