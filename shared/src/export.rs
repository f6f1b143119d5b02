//! Shareable analysis document

use crate::models::{DriftAnalysis, DriftLevel, IndicatorCategory, TrendDirection};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const ANALYSIS_DISCLAIMER: &str =
    "This analysis is for informational purposes only and does not constitute medical advice.";
pub const ANALYSIS_PRIVACY_NOTE: &str =
    "All data is processed locally. No personal health information is stored or transmitted.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorExport {
    pub category: IndicatorCategory,
    pub label: String,
    pub severity: DriftLevel,
    /// Whole percent, e.g. "86%"
    pub confidence: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    pub engagement_score: u8,
    pub drift_level: DriftLevel,
    pub trend: TrendDirection,
    pub explanation: String,
    pub indicators: Vec<IndicatorExport>,
    pub contributing_factors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisExport {
    pub disclaimer: String,
    pub generated: DateTime<Utc>,
    pub privacy_note: String,
    pub analysis: AnalysisSummary,
}

pub fn export_analysis(analysis: &DriftAnalysis, generated_at: DateTime<Utc>) -> AnalysisExport {
    AnalysisExport {
        disclaimer: ANALYSIS_DISCLAIMER.to_string(),
        generated: generated_at,
        privacy_note: ANALYSIS_PRIVACY_NOTE.to_string(),
        analysis: AnalysisSummary {
            engagement_score: analysis.overall_score,
            drift_level: analysis.drift_level,
            trend: analysis.trend,
            explanation: analysis.explanation.clone(),
            indicators: analysis
                .indicators
                .iter()
                .map(|i| IndicatorExport {
                    category: i.category,
                    label: i.label.clone(),
                    severity: i.severity,
                    confidence: format!("{}%", (i.confidence * 100.0).round() as u32),
                })
                .collect(),
            contributing_factors: analysis.contributing_factors.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drift::DriftEngine;
    use crate::models::DailyEngagement;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_export_formats_confidence_as_percent() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        let window: Vec<DailyEngagement> = (0..3)
            .map(|d| DailyEngagement {
                date: (now - Duration::days(d)).date_naive(),
                logs_count: 6,
                expected_logs: 6,
                timing_consistency: 1.0,
                completed_tasks: 5,
                total_tasks: 5,
                activity_minutes: 30,
                meal_logs_count: 3,
                glucose_checks: 4,
            })
            .collect();
        let analysis = DriftEngine::new().analyze(&window, now);

        let export = export_analysis(&analysis, now);
        assert_eq!(export.analysis.indicators.len(), 4);
        assert!(export.analysis.indicators.iter().all(|i| i.confidence == "43%"));

        let json = serde_json::to_value(&export).unwrap();
        assert_eq!(json["analysis"]["engagementScore"], analysis.overall_score);
        assert_eq!(json["privacyNote"], ANALYSIS_PRIVACY_NOTE);
        assert_eq!(json["analysis"]["indicators"][0]["category"], "frequency");
    }
}
