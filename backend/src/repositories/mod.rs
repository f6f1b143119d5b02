//! Database repositories
//!
//! Provides data access layer for database operations.

pub mod drift_events;
pub mod logs;
pub mod nudges;
pub mod plans;
pub mod profiles;

pub use drift_events::{CreateDriftEvent, DriftEventRecord, DriftEventRepository};
pub use logs::{ActivityLogRecord, ActivityLogRepository, CreateActivityLog, LogFilter, LogStampRecord};
pub use nudges::{CreateNudge, NudgeRecord, NudgeRepository};
pub use plans::{PlanStateRecord, PlanStateRepository};
pub use profiles::ProfileRepository;
