//! Speculation engine
//!
//! This crate runs speculative workers against a shared pool of versioned
//! variables:
//! - `SpeculationConfig`: run parameters, loadable from `specula.toml`
//! - `VariablePool`: the shared variables, lent to every worker
//! - `TargetSelector`: which variable a worker targets each cycle
//! - `WorkerLoop`: sequential cycles of one worker
//! - `Speculator`: parallel run and its `RunReport`
//! - `sweep`: one run per worker count
//!
//! The engine installs no tracing subscriber; binaries decide where events go.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod pool;
pub mod selector;
pub mod speculator;
pub mod sweep;
pub mod work;
pub mod worker;

pub use config::{SelectionPolicy, SpeculationConfig, CONFIG_FILE_NAME, MAX_VARIABLES};
pub use pool::{VariablePool, VariableReport};
pub use selector::{
    selector_for, FixedSelector, PartitionedSelector, SeededSelector, TargetSelector,
};
pub use speculator::{RunReport, Speculator};
pub use sweep::{sweep, SweepPoint};
pub use work::SimulatedWork;
pub use worker::{WorkerLoop, WorkerReport};
