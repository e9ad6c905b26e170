//! Speculative attempt state machine
//!
//! A [`SpeculativeAttempt`] drives one worker's one transaction attempt
//! against a single [`VersionedVariable`]:
//!
//! ```text
//!            ┌──────────────────────────────────────┐
//!            ▼                                      │ retries left
//!  READ ──► EXECUTE ──► VALIDATE ──► COMMIT (done)  │
//!                          │                        │
//!                          └───────► RETRY ─────────┘
//!                                      │ budget exhausted
//!                                      ▼
//!                                   (lost)
//! ```
//!
//! - READ takes a [`Snapshot`] of the target.
//! - EXECUTE computes a candidate from the private copy only; it performs no
//!   shared reads or writes, so concurrent attempts cannot corrupt each
//!   other's in-flight work.
//! - VALIDATE calls [`VersionedVariable::try_commit`] with the observed
//!   version. This is the only synchronisation point.
//! - COMMIT records the success and ends the attempt.
//! - RETRY spends one unit of the retry budget and re-reads, or ends the
//!   attempt as lost once the budget is gone.
//!
//! Attempt-local data (observed version, local value, candidate) lives in the
//! [`AttemptState`] variants, never in shared memory. An attempt performs at
//! most `retry_budget + 1` rounds and then always terminates; exhaustion is a
//! normal outcome, not an error.

use crate::metrics::SpeculationMetrics;
use crate::versioned::VersionedVariable;
use serde::{Deserialize, Serialize};
use specula_core::{VariableId, WorkerId};
use std::fmt;
use tracing::{debug, info, trace};

/// Retries granted to an attempt after its first round
pub const DEFAULT_RETRY_BUDGET: u32 = 3;

/// The EXECUTE phase of an attempt
///
/// Implementations compute a candidate from the attempt's private copy of the
/// value. They must not touch the shared variable; they may take time.
pub trait Execute {
    /// Compute the candidate value to commit
    fn execute(&mut self, local_value: i64) -> i64;
}

impl<F> Execute for F
where
    F: FnMut(i64) -> i64,
{
    fn execute(&mut self, local_value: i64) -> i64 {
        self(local_value)
    }
}

/// Current state of an attempt, with the data that state owns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    /// About to snapshot the target
    Read,
    /// Holding a private copy, about to compute
    Execute {
        /// Version seen at READ
        observed_version: u64,
        /// Private copy of the value seen at READ
        local_value: i64,
    },
    /// Holding a candidate, about to validate and commit
    Validate {
        /// Version seen at READ
        observed_version: u64,
        /// Value computed during EXECUTE
        candidate: i64,
    },
    /// Validation succeeded; the candidate is published
    Commit {
        /// Version the commit produced
        version: u64,
        /// Value the commit published
        value: i64,
    },
    /// Validation failed against the observed version
    Retry {
        /// Version seen at READ that went stale
        observed_version: u64,
    },
}

impl AttemptState {
    /// Upper-case state name, as used in logs
    pub fn name(&self) -> &'static str {
        match self {
            AttemptState::Read => "READ",
            AttemptState::Execute { .. } => "EXECUTE",
            AttemptState::Validate { .. } => "VALIDATE",
            AttemptState::Commit { .. } => "COMMIT",
            AttemptState::Retry { .. } => "RETRY",
        }
    }
}

impl fmt::Display for AttemptState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Terminal result of an attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// The candidate was published
    Committed {
        /// Version produced by this commit
        version: u64,
        /// Value published
        value: i64,
        /// Rounds performed, including the successful one
        rounds: u32,
    },
    /// Every round conflicted and the retry budget ran out
    Exhausted {
        /// Rounds performed (`retry_budget + 1`)
        rounds: u32,
    },
}

impl AttemptOutcome {
    /// Whether the attempt committed
    pub fn is_committed(&self) -> bool {
        matches!(self, AttemptOutcome::Committed { .. })
    }

    /// Rounds performed before reaching this outcome
    pub fn rounds(&self) -> u32 {
        match self {
            AttemptOutcome::Committed { rounds, .. } | AttemptOutcome::Exhausted { rounds } => {
                *rounds
            }
        }
    }
}

/// One worker's attempt to update one shared variable
///
/// Created fresh for every worker cycle and dropped when it reaches a
/// terminal outcome. Borrow-only: the variable and the metrics are owned by
/// the engine and shared by every worker.
pub struct SpeculativeAttempt<'a> {
    worker: WorkerId,
    variable: VariableId,
    target: &'a VersionedVariable,
    metrics: &'a SpeculationMetrics,
    state: AttemptState,
    retries_remaining: u32,
    rounds: u32,
    committed: bool,
    outcome: Option<AttemptOutcome>,
}

impl<'a> SpeculativeAttempt<'a> {
    /// Start an attempt in READ with the full retry budget
    pub fn new(
        worker: WorkerId,
        variable: VariableId,
        target: &'a VersionedVariable,
        metrics: &'a SpeculationMetrics,
        retry_budget: u32,
    ) -> Self {
        metrics.record_start();
        SpeculativeAttempt {
            worker,
            variable,
            target,
            metrics,
            state: AttemptState::Read,
            retries_remaining: retry_budget,
            rounds: 0,
            committed: false,
            outcome: None,
        }
    }

    /// Advance exactly one state
    ///
    /// Returns the outcome once the attempt reaches a terminal state, `None`
    /// while it is still in flight. Calling `step` after the attempt finished
    /// returns the same outcome again and changes nothing.
    pub fn step<E: Execute + ?Sized>(&mut self, work: &mut E) -> Option<AttemptOutcome> {
        if self.outcome.is_some() {
            return self.outcome;
        }

        match self.state {
            AttemptState::Read => {
                let snapshot = self.target.snapshot();
                self.rounds += 1;
                self.metrics.record_round();
                trace!(
                    target: "specula::attempt",
                    worker = %self.worker,
                    variable = %self.variable,
                    version = snapshot.version,
                    round = self.rounds,
                    "Snapshot taken"
                );
                self.state = AttemptState::Execute {
                    observed_version: snapshot.version,
                    local_value: snapshot.value,
                };
            }
            AttemptState::Execute {
                observed_version,
                local_value,
            } => {
                let candidate = work.execute(local_value);
                self.state = AttemptState::Validate {
                    observed_version,
                    candidate,
                };
            }
            AttemptState::Validate {
                observed_version,
                candidate,
            } => {
                if self.target.try_commit(observed_version, candidate) {
                    self.state = AttemptState::Commit {
                        version: observed_version + 1,
                        value: candidate,
                    };
                } else {
                    self.metrics.record_conflict();
                    debug!(
                        target: "specula::attempt",
                        worker = %self.worker,
                        variable = %self.variable,
                        observed_version,
                        retries_remaining = self.retries_remaining,
                        "Validation conflict"
                    );
                    self.state = AttemptState::Retry { observed_version };
                }
            }
            AttemptState::Commit { version, value } => {
                self.committed = true;
                self.metrics.record_commit();
                debug!(
                    target: "specula::attempt",
                    worker = %self.worker,
                    variable = %self.variable,
                    version,
                    rounds = self.rounds,
                    "Attempt committed"
                );
                self.outcome = Some(AttemptOutcome::Committed {
                    version,
                    value,
                    rounds: self.rounds,
                });
            }
            AttemptState::Retry { .. } => {
                if self.retries_remaining == 0 {
                    self.metrics.record_exhausted();
                    info!(
                        target: "specula::attempt",
                        worker = %self.worker,
                        variable = %self.variable,
                        rounds = self.rounds,
                        "Retry limit exceeded"
                    );
                    self.outcome = Some(AttemptOutcome::Exhausted {
                        rounds: self.rounds,
                    });
                } else {
                    self.retries_remaining -= 1;
                    self.state = AttemptState::Read;
                }
            }
        }

        self.outcome
    }

    /// Drive the attempt to a terminal outcome
    pub fn run<E: Execute + ?Sized>(&mut self, work: &mut E) -> AttemptOutcome {
        loop {
            if let Some(outcome) = self.step(work) {
                return outcome;
            }
        }
    }

    /// Current state
    pub fn state(&self) -> AttemptState {
        self.state
    }

    /// Retries left before the attempt is abandoned
    pub fn retries_remaining(&self) -> u32 {
        self.retries_remaining
    }

    /// Rounds started so far
    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    /// Whether the attempt committed
    pub fn is_committed(&self) -> bool {
        self.committed
    }

    /// Whether the attempt reached a terminal state
    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    /// Terminal outcome, once reached
    pub fn outcome(&self) -> Option<AttemptOutcome> {
        self.outcome
    }

    /// Worker running this attempt
    pub fn worker(&self) -> WorkerId {
        self.worker
    }

    /// Variable targeted by this attempt
    pub fn variable(&self) -> VariableId {
        self.variable
    }
}

impl fmt::Debug for SpeculativeAttempt<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpeculativeAttempt")
            .field("worker", &self.worker)
            .field("variable", &self.variable)
            .field("state", &self.state)
            .field("retries_remaining", &self.retries_remaining)
            .field("rounds", &self.rounds)
            .field("committed", &self.committed)
            .finish()
    }
}
