//! Colony Error Types
//!
//! Addressing is always into the fixed directory, so there is no error for
//! an unknown ant: that is an invariant violation and panics. What remains
//! are configuration failures and runtime plumbing going away.

use crate::message::AntId;
use colony_config::ConfigError;
use thiserror::Error;

/// Main colony error type
#[derive(Error, Debug)]
pub enum ColonyError {
    /// Rejected configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The ant's receive loop is gone (colony shut down)
    #[error("Inbox closed for {ant}")]
    InboxClosed { ant: AntId },

    /// The ant dropped an inspection request without answering
    #[error("Inspection of {ant} failed: no snapshot returned")]
    InspectionFailed { ant: AntId },

    /// A colony task panicked or was cancelled
    #[error("Task error: {task}: {source}")]
    Task {
        task: &'static str,
        source: tokio::task::JoinError,
    },
}

/// Result type alias for colony operations
pub type Result<T> = std::result::Result<T, ColonyError>;

impl ColonyError {
    pub fn task(task: &'static str, source: tokio::task::JoinError) -> Self {
        Self::Task { task, source }
    }

    /// Error category for structured logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::InboxClosed { .. } => "inbox",
            Self::InspectionFailed { .. } => "inspection",
            Self::Task { .. } => "task",
        }
    }
}
