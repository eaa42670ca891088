//! Error kinds shared by every timer store and the log pipeline
//!
//! Misuse of a store's state machine, I/O failures, and corrupt log streams
//! each get their own variant so callers can branch on the kind instead of
//! parsing messages. Per-name pairing anomalies found while reconstructing
//! deltas are not errors; see [`crate::deltas::DeltaAnomaly`].

use std::path::PathBuf;
use thiserror::Error;

/// Errors for timer operations
#[derive(Error, Debug)]
pub enum TimerError {
    #[error("Attempted to start running timer {0}")]
    AlreadyRunning(String),

    #[error("Attempted to end stopped timer {0}")]
    AlreadyEnded(String),

    #[error("Timer {0} is not running")]
    NotRunning(String),

    #[error("Invalid timer name {0:?}")]
    InvalidName(String),

    #[error("Invalid timer directory: {}", .0.display())]
    InvalidDirectory(PathBuf),

    #[error("Corrupt timer data in {context}: {reason}")]
    Corrupt { context: String, reason: String },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Elapsed time of timer {0} does not fit in 64 bits")]
    Overflow(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, TimerError>;

impl TimerError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TimerError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn corrupt(context: impl Into<String>, reason: impl Into<String>) -> Self {
        TimerError::Corrupt {
            context: context.into(),
            reason: reason.into(),
        }
    }

    /// Attach a source description (usually a file path) to a corrupt-stream error
    pub(crate) fn in_context(self, context: &str) -> Self {
        match self {
            TimerError::Corrupt { reason, .. } => TimerError::Corrupt {
                context: context.to_string(),
                reason,
            },
            other => other,
        }
    }

    /// True for errors caused by calling a store operation in the wrong state
    pub fn is_misuse(&self) -> bool {
        matches!(
            self,
            TimerError::AlreadyRunning(_) | TimerError::AlreadyEnded(_) | TimerError::NotRunning(_)
        )
    }
}
