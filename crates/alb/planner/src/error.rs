//! Planning error types

use crate::config::ConfigError;
use crate::sink::SinkError;
use alb_types::BoundaryId;
use thiserror::Error;

/// Planning errors
///
/// Every variant aborts the planning call that produced it; no partially
/// planned topology is ever returned alongside an error.
#[derive(Debug, Error)]
pub enum PlanError {
    /// The caller passed something the operation does not accept
    #[error("Precondition violated in {operation}: {reason}")]
    Precondition {
        operation: &'static str,
        reason: String,
    },

    /// The boundary's security policy was already finalized
    #[error("Security policy for boundary {boundary} is locked")]
    PolicyLocked { boundary: BoundaryId },

    #[error("Port pool {start}-{end} exhausted")]
    PoolExhausted { start: u16, end: u16 },

    #[error("Invalid port: {0}")]
    InvalidPort(u16),

    #[error("Listener {listener} has no port assigned")]
    MissingPort { listener: String },

    #[error("Resource sink error: {0}")]
    Sink(#[from] SinkError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for planning operations
pub type Result<T> = std::result::Result<T, PlanError>;

impl PlanError {
    pub fn precondition(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::Precondition {
            operation,
            reason: reason.into(),
        }
    }

    /// True for precondition violations (caller misuse)
    pub fn is_precondition(&self) -> bool {
        matches!(self, PlanError::Precondition { .. })
    }

    /// True when the topology was already finalized
    pub fn is_policy_locked(&self) -> bool {
        matches!(self, PlanError::PolicyLocked { .. })
    }
}
