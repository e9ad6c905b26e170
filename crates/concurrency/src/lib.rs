//! Concurrency layer for Specula
//!
//! This crate implements optimistic concurrency control (OCC) over single
//! shared variables:
//! - VersionedVariable: value + monotonic version with a lock-free
//!   compare-and-increment commit primitive
//! - SpeculativeAttempt: READ → EXECUTE → VALIDATE → COMMIT/RETRY state machine
//! - SpeculationMetrics: relaxed counters shared by every attempt of a run

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod attempt;
pub mod metrics;
pub mod versioned;

pub use attempt::{
    AttemptOutcome, AttemptState, Execute, SpeculativeAttempt, DEFAULT_RETRY_BUDGET,
};
pub use metrics::{MetricsSnapshot, SpeculationMetrics};
pub use versioned::{Snapshot, VersionedVariable, MAX_VERSION};
