//! Parallel speculation run
//!
//! [`Speculator`] owns one run: it builds the variable pool and the shared
//! metrics, starts one named OS thread per worker inside a thread scope, and
//! assembles a [`RunReport`] once every worker has joined. The pool and the
//! metrics live on the coordinating thread's stack and are lent to workers
//! by shared reference.

use crate::config::SpeculationConfig;
use crate::pool::{VariablePool, VariableReport};
use crate::worker::{WorkerLoop, WorkerReport};
use serde::{Deserialize, Serialize};
use specula_concurrency::SpeculationMetrics;
use specula_core::{SpeculaError, SpeculaResult, WorkerId};
use std::any::Any;
use std::thread;
use std::time::Instant;
use tracing::{info, warn};

/// Result of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Final `(value, version)` of every variable
    pub variables: Vec<VariableReport>,
    /// Successful commits across all workers
    pub total_commits: u64,
    /// `workers * cycles_per_worker`
    pub theoretical_max: u64,
    /// Attempts abandoned after exhausting their retries
    pub exhausted_attempts: u64,
    /// Failed validations
    pub conflicts: u64,
    /// READ→EXECUTE→VALIDATE rounds across all attempts
    pub rounds: u64,
    /// Per-worker tallies, in worker order
    pub workers: Vec<WorkerReport>,
    /// Wall-clock duration of the run
    pub elapsed_ms: u64,
}

impl RunReport {
    /// Committed attempts as a percentage of the theoretical maximum
    pub fn success_rate(&self) -> f64 {
        if self.theoretical_max == 0 {
            return 0.0;
        }
        self.total_commits as f64 * 100.0 / self.theoretical_max as f64
    }

    /// Sum of all final versions
    pub fn total_version(&self) -> u64 {
        self.variables.iter().map(|v| v.version).sum()
    }
}

/// Runs a configured set of workers against a shared pool
#[derive(Debug, Clone)]
pub struct Speculator {
    config: SpeculationConfig,
}

impl Speculator {
    /// Create an engine for `config`
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the configuration fails validation. Nothing
    /// is started in that case.
    pub fn new(config: SpeculationConfig) -> SpeculaResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The validated configuration
    pub fn config(&self) -> &SpeculationConfig {
        &self.config
    }

    /// Execute every worker to completion and report the final state
    ///
    /// # Errors
    ///
    /// - `Io` if a worker thread cannot be spawned
    /// - `WorkerPanicked` if a worker thread panicked
    /// - any error a worker returned (the first in worker order)
    pub fn run(&self) -> SpeculaResult<RunReport> {
        let config = &self.config;
        let pool = VariablePool::new(config.variables)?;
        let metrics = SpeculationMetrics::new();

        info!(
            target: "specula::engine",
            workers = config.workers,
            variables = config.variables,
            cycles = config.cycles_per_worker,
            retry_budget = config.retry_budget,
            selection = %config.selection,
            "Speculation run started"
        );
        let start = Instant::now();

        let results = thread::scope(|scope| -> SpeculaResult<Vec<_>> {
            let mut handles = Vec::with_capacity(config.workers as usize);
            for index in 0..config.workers {
                let worker_id = WorkerId::new(index);
                let mut worker = WorkerLoop::from_config(config, worker_id);
                let (pool, metrics) = (&pool, &metrics);
                let handle = thread::Builder::new()
                    .name(format!("specula-worker-{}", index))
                    .spawn_scoped(scope, move || worker.run(pool, metrics))?;
                handles.push((worker_id, handle));
            }

            Ok(handles
                .into_iter()
                .map(|(worker_id, handle)| {
                    handle.join().unwrap_or_else(|payload| {
                        Err(SpeculaError::WorkerPanicked {
                            worker: worker_id,
                            message: panic_message(payload.as_ref()),
                        })
                    })
                })
                .collect())
        })?;

        let workers = results.into_iter().collect::<SpeculaResult<Vec<_>>>()?;
        let elapsed = start.elapsed();
        let counters = metrics.snapshot();

        let report = RunReport {
            variables: pool.reports(),
            total_commits: counters.commits,
            theoretical_max: config.theoretical_max_commits(),
            exhausted_attempts: counters.exhausted,
            conflicts: counters.conflicts,
            rounds: counters.rounds,
            workers,
            elapsed_ms: elapsed.as_millis() as u64,
        };

        if report.total_version() != report.total_commits {
            warn!(
                target: "specula::engine",
                commits = report.total_commits,
                versions = report.total_version(),
                "Commit count does not match version delta"
            );
        }

        info!(
            target: "specula::engine",
            total_commits = report.total_commits,
            theoretical_max = report.theoretical_max,
            exhausted = report.exhausted_attempts,
            conflicts = report.conflicts,
            elapsed_ms = report.elapsed_ms,
            "Speculation run finished"
        );
        Ok(report)
    }
}

/// Best-effort text of a panic payload
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
