//! Engagement Drift Shared Library
//!
//! The pure core: drift scoring, nudge selection and the adaptive plan,
//! plus the models and API types shared by the backend and WASM modules.
//! Nothing in this crate performs I/O; every operation takes `now` explicitly.

pub mod drift;
pub mod errors;
pub mod export;
pub mod language;
pub mod live;
pub mod messages;
pub mod models;
pub mod nudges;
pub mod pipeline;
pub mod plan;
pub mod source;
pub mod synthetic;
pub mod types;
pub mod validation;
pub mod window;

// Re-export commonly used items
pub use drift::DriftEngine;
pub use errors::*;
pub use language::Language;
pub use live::{analyze_live, LiveDriftAnalysis};
pub use messages::{MessagePools, RandomSource, SeededRandom};
pub use models::*;
pub use nudges::{Nudge, NudgeCatalog, NudgePolicy};
pub use pipeline::EngagementCore;
pub use plan::{AdaptivePlan, AdaptivePlanner, PlanConfig, PlanMode, PlanState};
pub use source::AnalysisSource;
pub use types::*;
pub use window::{aggregate_window, WindowConfig};
