//! Engagement Drift WASM Module
//!
//! Browser bindings for the pure core, used by the presentation layer when
//! the backend is unreachable (demo fallback) and for local previews.
//! Every function takes and returns JSON strings; `now` is an RFC 3339
//! timestamp supplied by the caller.

use chrono::{DateTime, Utc};
use engagement_drift_shared::export::export_analysis;
use engagement_drift_shared::synthetic::{generate_scenario, ScenarioPattern};
use engagement_drift_shared::{
    AdaptivePlanner, DailyEngagement, DriftAnalysis, DriftEngine, Language, NudgeCatalog,
    NudgePolicy, PlanState,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;

fn parse_now(now: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(now)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("Invalid timestamp '{}': {}", now, e))
}

fn parse_json<T: serde::de::DeserializeOwned>(json: &str, what: &str) -> Result<T, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid {}: {}", what, e))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| e.to_string())
}

fn analyze_window(window_json: &str, now: &str) -> Result<String, String> {
    let window: Vec<DailyEngagement> = parse_json(window_json, "window")?;
    to_json(&DriftEngine::new().analyze(&window, parse_now(now)?))
}

fn generate_nudges(analysis_json: &str, language: &str) -> Result<String, String> {
    let analysis: DriftAnalysis = parse_json(analysis_json, "analysis")?;
    let policy = NudgePolicy::new(NudgeCatalog::english());
    to_json(&policy.generate(&analysis, Language::from_code(language)))
}

fn generate_plan(analysis_json: &str, previous_json: Option<String>, now: &str) -> Result<String, String> {
    let analysis: DriftAnalysis = parse_json(analysis_json, "analysis")?;
    let previous: Option<PlanState> = previous_json
        .as_deref()
        .map(|p| parse_json(p, "plan state"))
        .transpose()?;
    let plan = AdaptivePlanner::default().evaluate(&analysis, previous.as_ref(), parse_now(now)?);
    to_json(&plan)
}

fn synthetic_scenario(pattern: &str, now: &str, seed: Option<u64>) -> Result<String, String> {
    let pattern: ScenarioPattern = pattern.parse()?;
    to_json(&generate_scenario(pattern, parse_now(now)?, seed))
}

fn export_window_analysis(window_json: &str, now: &str) -> Result<String, String> {
    let window: Vec<DailyEngagement> = parse_json(window_json, "window")?;
    let now = parse_now(now)?;
    to_json(&export_analysis(&DriftEngine::new().analyze(&window, now), now))
}

/// Analyze a daily engagement window (JSON array, most recent first)
#[wasm_bindgen]
pub fn analyze_window_json(window_json: &str, now: &str) -> Result<String, JsValue> {
    analyze_window(window_json, now).map_err(|e| JsValue::from_str(&e))
}

/// Rule-based nudges for an analysis, in the given language code
#[wasm_bindgen]
pub fn generate_nudges_json(analysis_json: &str, language: &str) -> Result<String, JsValue> {
    generate_nudges(analysis_json, language).map_err(|e| JsValue::from_str(&e))
}

/// Plan for an analysis; `previous_json` is the last saved plan state, if any
#[wasm_bindgen]
pub fn generate_plan_json(
    analysis_json: &str,
    previous_json: Option<String>,
    now: &str,
) -> Result<String, JsValue> {
    generate_plan(analysis_json, previous_json, now).map_err(|e| JsValue::from_str(&e))
}

/// 14-day demo window for `stable`, `declining` or `recovering`
#[wasm_bindgen]
pub fn synthetic_scenario_json(pattern: &str, now: &str, seed: Option<u64>) -> Result<String, JsValue> {
    synthetic_scenario(pattern, now, seed).map_err(|e| JsValue::from_str(&e))
}

/// Shareable export of a window's analysis
#[wasm_bindgen]
pub fn export_analysis_json(window_json: &str, now: &str) -> Result<String, JsValue> {
    export_window_analysis(window_json, now).map_err(|e| JsValue::from_str(&e))
}
