//! Per-worker orchestration loop
//!
//! A [`WorkerLoop`] runs a fixed number of cycles. Each cycle selects a
//! target, drives one [`SpeculativeAttempt`] to completion, and tallies the
//! outcome. Cycles never overlap within a worker: the next one starts only
//! after the previous attempt committed or exhausted its budget.

use crate::config::SpeculationConfig;
use crate::pool::VariablePool;
use crate::selector::{selector_for, TargetSelector};
use crate::work::SimulatedWork;
use serde::{Deserialize, Serialize};
use specula_concurrency::{AttemptOutcome, Execute, SpeculationMetrics, SpeculativeAttempt};
use specula_core::{SpeculaResult, VariableId, WorkerId};
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// What one worker did during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerReport {
    /// Worker identity
    pub worker_id: WorkerId,
    /// Cycles that ended in COMMIT
    pub committed: u64,
    /// Cycles abandoned with the retry budget exhausted
    pub exhausted: u64,
    /// READ→EXECUTE→VALIDATE rounds across all cycles
    pub rounds: u64,
    /// Commits by this worker per variable; variables it never committed to
    /// are absent
    pub commits_per_variable: BTreeMap<VariableId, u64>,
}

impl WorkerReport {
    fn new(worker_id: WorkerId) -> Self {
        Self {
            worker_id,
            committed: 0,
            exhausted: 0,
            rounds: 0,
            commits_per_variable: BTreeMap::new(),
        }
    }

    /// Cycles completed
    pub fn cycles(&self) -> u64 {
        self.committed + self.exhausted
    }

    /// Commits this worker made to `variable`
    pub fn commits_on(&self, variable: VariableId) -> u64 {
        self.commits_per_variable.get(&variable).copied().unwrap_or(0)
    }
}

/// Sequential cycle loop for one worker
pub struct WorkerLoop<E = SimulatedWork> {
    worker_id: WorkerId,
    cycles: u32,
    retry_budget: u32,
    selector: Box<dyn TargetSelector>,
    work: E,
}

impl<E: Execute> WorkerLoop<E> {
    /// Create a loop from its parts
    pub fn new(
        worker_id: WorkerId,
        cycles: u32,
        retry_budget: u32,
        selector: Box<dyn TargetSelector>,
        work: E,
    ) -> Self {
        Self {
            worker_id,
            cycles,
            retry_budget,
            selector,
            work,
        }
    }

    /// Worker identity
    pub fn worker_id(&self) -> WorkerId {
        self.worker_id
    }

    /// The EXECUTE implementation, for inspection after a run
    pub fn work(&self) -> &E {
        &self.work
    }

    /// Run every cycle against `pool`, recording into `metrics`
    ///
    /// # Errors
    ///
    /// Returns `VariableOutOfRange` if the selector names a variable outside
    /// the pool. Cycles already completed stay committed.
    pub fn run(
        &mut self,
        pool: &VariablePool,
        metrics: &SpeculationMetrics,
    ) -> SpeculaResult<WorkerReport> {
        let mut report = WorkerReport::new(self.worker_id);
        debug!(
            target: "specula::worker",
            worker = %self.worker_id,
            cycles = self.cycles,
            "Worker started"
        );

        for cycle in 0..self.cycles {
            let variable = self.selector.select(pool.len());
            let target = pool.get(variable)?;
            trace!(
                target: "specula::worker",
                worker = %self.worker_id,
                cycle,
                variable = %variable,
                "Cycle started"
            );

            let mut attempt = SpeculativeAttempt::new(
                self.worker_id,
                variable,
                target,
                metrics,
                self.retry_budget,
            );
            let outcome = attempt.run(&mut self.work);

            report.rounds += u64::from(outcome.rounds());
            match outcome {
                AttemptOutcome::Committed { .. } => {
                    report.committed += 1;
                    *report.commits_per_variable.entry(variable).or_insert(0) += 1;
                }
                AttemptOutcome::Exhausted { .. } => report.exhausted += 1,
            }
        }

        debug!(
            target: "specula::worker",
            worker = %self.worker_id,
            committed = report.committed,
            exhausted = report.exhausted,
            rounds = report.rounds,
            "Worker finished"
        );
        Ok(report)
    }
}

impl WorkerLoop<SimulatedWork> {
    /// Build worker `worker_id`'s loop as configured by `config`
    pub fn from_config(config: &SpeculationConfig, worker_id: WorkerId) -> Self {
        let (min, max) = config.execute_delay();
        let seed = config.worker_seed(worker_id);
        Self::new(
            worker_id,
            config.cycles_per_worker,
            config.retry_budget,
            selector_for(config, worker_id),
            SimulatedWork::new(seed, min, max),
        )
    }
}

impl<E> std::fmt::Debug for WorkerLoop<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerLoop")
            .field("worker_id", &self.worker_id)
            .field("cycles", &self.cycles)
            .field("retry_budget", &self.retry_budget)
            .finish_non_exhaustive()
    }
}
