//! API request and response types

use crate::language::Language;
use crate::live::LiveDriftAnalysis;
use crate::messages::SelectedMessage;
use crate::models::{DriftAnalysis, DriftLevel, LogCategory};
use crate::nudges::Nudge;
use crate::plan::{AdaptivePlan, PlanMode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;
use validator::Validate;

pub const DRIFT_DISCLAIMER: &str = "This analysis is for engagement tracking only. It is not medical advice and does not assess health conditions.";
pub const NUDGES_DISCLAIMER: &str = "These are motivational messages only, not medical advice.";
pub const LOGS_DISCLAIMER: &str =
    "Log history is shown for engagement tracking only and is not medical advice.";

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

// ============================================================================
// Drift Analysis
// ============================================================================

/// Suggestion attached to significant drift
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub suggest_reduced_plan: bool,
    pub message: String,
}

/// Response of the live analysis endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftAnalyzeResponse {
    pub disclaimer: String,
    pub analysis: LiveDriftAnalysis,
    pub nudge: SelectedMessage,
    /// Present only for significant drift; serialized as `null` otherwise
    pub recommendations: Option<Recommendation>,
    pub timestamp: DateTime<Utc>,
}

impl DriftAnalyzeResponse {
    pub fn new(analysis: LiveDriftAnalysis, nudge: SelectedMessage, now: DateTime<Utc>) -> Self {
        let recommendations = (analysis.drift_level == DriftLevel::Significant).then(|| Recommendation {
            suggest_reduced_plan: true,
            message: nudge.language.reduced_plan_recommendation().to_string(),
        });

        Self {
            disclaimer: DRIFT_DISCLAIMER.to_string(),
            analysis,
            nudge,
            recommendations,
            timestamp: now,
        }
    }
}

/// Canonical analysis with its nudges and plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsResponse {
    pub disclaimer: String,
    pub analysis: DriftAnalysis,
    pub nudges: Vec<Nudge>,
    pub plan: AdaptivePlan,
    pub streak_days: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub streak_nudge: Option<Nudge>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreCheckResponse {
    pub current_mode: PlanMode,
    pub should_restore: bool,
}

// ============================================================================
// Activity Logs
// ============================================================================

/// Create log request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateLogRequest {
    pub log_type: LogCategory,
    /// Defaults to the time the request is handled
    #[serde(default)]
    pub logged_at: Option<DateTime<Utc>>,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 100000.0))]
    pub value: Option<f64>,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

/// Stored log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: Uuid,
    pub log_type: LogCategory,
    pub logged_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateLogResponse {
    pub success: bool,
    pub log: LogEntry,
}

/// Log history query parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsQuery {
    #[serde(default = "default_logs_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub log_type: Option<LogCategory>,
    #[serde(default = "default_logs_days")]
    pub days: u32,
}

fn default_logs_limit() -> u32 {
    50
}

fn default_logs_days() -> u32 {
    14
}

impl Default for LogsQuery {
    fn default() -> Self {
        Self {
            limit: default_logs_limit(),
            offset: 0,
            log_type: None,
            days: default_logs_days(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogsSummary {
    pub total: u64,
    pub by_type: BTreeMap<LogCategory, u64>,
    pub days_with_logs: u32,
}

impl LogsSummary {
    /// Summarize entries; `total` is the full match count, not the page size
    pub fn from_entries(entries: &[LogEntry], total: u64) -> Self {
        let mut by_type = BTreeMap::new();
        for entry in entries {
            *by_type.entry(entry.log_type).or_insert(0) += 1;
        }
        let mut days: Vec<_> = entries.iter().map(|e| e.logged_at.date_naive()).collect();
        days.sort_unstable();
        days.dedup();

        Self {
            total,
            by_type,
            days_with_logs: days.len() as u32,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub limit: u32,
    pub offset: u32,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogsResponse {
    pub logs: Vec<LogEntry>,
    pub summary: LogsSummary,
    pub pagination: Pagination,
    pub disclaimer: String,
}

// ============================================================================
// Stored Nudges
// ============================================================================

/// Nudge query parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NudgesQuery {
    #[serde(default = "default_nudges_limit")]
    pub limit: u32,
    #[serde(default)]
    pub unread: bool,
}

fn default_nudges_limit() -> u32 {
    10
}

impl Default for NudgesQuery {
    fn default() -> Self {
        Self {
            limit: default_nudges_limit(),
            unread: false,
        }
    }
}

/// A nudge as persisted for the read/unread inbox
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredNudge {
    pub id: Uuid,
    pub message: String,
    pub nudge_type: String,
    pub tone: String,
    pub language: Language,
    pub is_read: bool,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NudgesResponse {
    pub nudges: Vec<StoredNudge>,
    pub unread_count: u64,
    pub disclaimer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MarkReadRequest {
    #[validate(length(min = 1, max = 100))]
    pub nudge_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkReadResponse {
    pub success: bool,
    pub updated: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::live::analyze_live;
    use crate::messages::MessageCategory;
    use crate::nudges::NudgeTone;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    fn nudge(language: Language) -> SelectedMessage {
        SelectedMessage {
            message: "msg".to_string(),
            category: MessageCategory::Supportive,
            tone: NudgeTone::Understanding,
            language,
        }
    }

    #[test]
    fn test_significant_drift_carries_recommendation() {
        let response = DriftAnalyzeResponse::new(analyze_live(&[], now()), nudge(Language::Es), now());
        let recommendation = response.recommendations.unwrap();
        assert!(recommendation.suggest_reduced_plan);
        assert_eq!(recommendation.message, Language::Es.reduced_plan_recommendation());
    }

    #[test]
    fn test_response_shape() {
        let mut analysis = LiveDriftAnalysis::no_logs();
        analysis.drift_level = DriftLevel::Mild;
        let response = DriftAnalyzeResponse::new(analysis, nudge(Language::En), now());

        let json = serde_json::to_value(&response).unwrap();
        assert!(json["recommendations"].is_null());
        assert_eq!(json["analysis"]["engagementScore"], 0);
        assert_eq!(json["analysis"]["driftType"], "frequency_drop");
        assert_eq!(json["nudge"]["type"], "supportive");
        assert_eq!(json["nudge"]["tone"], "understanding");
        assert_eq!(json["nudge"]["language"], "en");
        assert_eq!(json["disclaimer"], DRIFT_DISCLAIMER);
    }

    #[test]
    fn test_create_log_request_validation() {
        let request: CreateLogRequest =
            serde_json::from_str(r#"{"log_type":"meal","value":-5}"#).unwrap();
        assert_eq!(request.log_type, LogCategory::Meal);
        assert!(request.validate().is_err());

        let request: CreateLogRequest = serde_json::from_str(r#"{"log_type":"glucose"}"#).unwrap();
        assert!(request.validate().is_ok());
        assert!(request.logged_at.is_none());
    }

    #[test]
    fn test_mark_read_requires_ids() {
        let request: MarkReadRequest = serde_json::from_str(r#"{"nudge_ids":[]}"#).unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_logs_summary_counts_days_and_types() {
        let entry = |day: u32, log_type| LogEntry {
            id: Uuid::new_v4(),
            log_type,
            logged_at: Utc.with_ymd_and_hms(2024, 3, day, 9, 0, 0).unwrap(),
            value: None,
            notes: None,
            created_at: now(),
        };
        let entries = vec![
            entry(14, LogCategory::Glucose),
            entry(14, LogCategory::Glucose),
            entry(13, LogCategory::Meal),
        ];
        let summary = LogsSummary::from_entries(&entries, 42);
        assert_eq!(summary.total, 42);
        assert_eq!(summary.days_with_logs, 2);
        assert_eq!(summary.by_type[&LogCategory::Glucose], 2);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["byType"]["diet"], 1);
    }

    #[test]
    fn test_query_defaults() {
        let query: LogsQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.limit, 50);
        assert_eq!(query.days, 14);
        let query: NudgesQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.limit, 10);
        assert!(!query.unread);
    }
}
