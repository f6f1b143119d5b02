//! Business logic services
//!
//! Services encapsulate business logic and coordinate between
//! the store, repositories and the shared engagement core.

pub mod drift;
pub mod insights;
pub mod logs;
pub mod nudges;
pub mod plan;

pub use drift::DriftService;
pub use insights::InsightsService;
pub use logs::LogService;
pub use nudges::NudgeService;
pub use plan::PlanService;
