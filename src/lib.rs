//! Specula - thread-level speculative execution over shared versioned variables
//!
//! Workers speculatively update shared variables without locks. Each update is
//! an attempt that snapshots a variable, computes privately, and commits only
//! if nobody else committed in between; otherwise it retries within a fixed
//! budget.
//!
//! # Quick Start
//!
//! ```no_run
//! use specula::{SelectionPolicy, SpeculationConfig, Speculator};
//!
//! let config = SpeculationConfig::new()
//!     .with_workers(4)
//!     .with_variables(4)
//!     .with_selection(SelectionPolicy::Partitioned);
//!
//! let report = Speculator::new(config)?.run()?;
//! for variable in &report.variables {
//!     println!("shared_data[{}] = {}", variable.id, variable.value);
//! }
//! println!("{} of {} attempts committed", report.total_commits, report.theoretical_max);
//! # Ok::<(), specula::SpeculaError>(())
//! ```
//!
//! # Layers
//!
//! - `specula-core`: identifiers and the error type
//! - `specula-concurrency`: `VersionedVariable` and the `SpeculativeAttempt` state machine
//! - `specula-engine`: configuration, worker loops, parallel runs and sweeps

pub use specula_core::{SpeculaError, SpeculaResult, VariableId, WorkerId};

pub use specula_concurrency::{
    AttemptOutcome, AttemptState, Execute, MetricsSnapshot, Snapshot, SpeculationMetrics,
    SpeculativeAttempt, VersionedVariable, DEFAULT_RETRY_BUDGET, MAX_VERSION,
};

pub use specula_engine::{
    selector_for, sweep, FixedSelector, PartitionedSelector, RunReport, SeededSelector,
    SelectionPolicy, SimulatedWork, SpeculationConfig, Speculator, SweepPoint, TargetSelector,
    VariablePool, VariableReport, WorkerLoop, WorkerReport, CONFIG_FILE_NAME, MAX_VARIABLES,
};
