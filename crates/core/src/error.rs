//! Error types for Specula
//!
//! Conflicts and retry exhaustion are normal outcomes of speculation and are
//! never represented here. This type covers configuration problems (the only
//! fatal condition before a run starts), bad pool lookups, and failures of
//! the hosting process (I/O, worker threads).
//!
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use crate::types::{VariableId, WorkerId};
use std::io;
use thiserror::Error;

/// Result type alias for Specula operations
pub type SpeculaResult<T> = std::result::Result<T, SpeculaError>;

/// Error types for Specula
#[derive(Debug, Error)]
pub enum SpeculaError {
    /// Configuration rejected before any worker started
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Variable id does not belong to the pool
    #[error("Variable {id} out of range for pool of {len}")]
    VariableOutOfRange {
        /// Requested variable
        id: VariableId,
        /// Number of variables in the pool
        len: usize,
    },

    /// A worker thread panicked before reporting
    #[error("Worker {worker} panicked: {message}")]
    WorkerPanicked {
        /// Worker that panicked
        worker: WorkerId,
        /// Panic payload, when it was a string
        message: String,
    },

    /// I/O error (config files, thread spawning)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Internal invariant violated
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SpeculaError {
    /// Create an `InvalidConfig` error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        SpeculaError::InvalidConfig(message.into())
    }

    /// Create an `Internal` error
    pub fn internal(message: impl Into<String>) -> Self {
        SpeculaError::Internal(message.into())
    }

    /// Whether this error was caused by the caller's configuration
    pub fn is_config_error(&self) -> bool {
        matches!(self, SpeculaError::InvalidConfig(_))
    }
}
