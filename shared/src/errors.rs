//! Error types for the engagement drift core

use thiserror::Error;

/// Construction-time configuration errors
///
/// Raised when injected configuration (task categories, message pools)
/// violates an invariant the engine relies on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Safety-related task category '{id}' must have equal counts in every mode ({full}/{reduced}/{minimal})")]
    SafetyTaskReduced {
        id: String,
        full: u32,
        reduced: u32,
        minimal: u32,
    },

    #[error("Task category '{id}' must satisfy minimal <= reduced <= full ({full}/{reduced}/{minimal})")]
    NonMonotonicCounts {
        id: String,
        full: u32,
        reduced: u32,
        minimal: u32,
    },

    #[error("Duplicate task category id: {0}")]
    DuplicateCategory(String),

    #[error("Message pool '{0}' has no English templates")]
    EmptyMessagePool(String),
}

/// Request validation error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}
