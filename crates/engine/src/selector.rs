//! Target selection for worker cycles
//!
//! Before each cycle a worker asks its [`TargetSelector`] which variable to
//! speculate on. Selection is deterministic per worker: the random policy is
//! driven by a seeded generator, so the same seed replays the same sequence
//! of targets.

use crate::config::{SelectionPolicy, SpeculationConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use specula_core::{VariableId, WorkerId};

/// Chooses the variable a worker targets in its next cycle
pub trait TargetSelector: Send {
    /// Pick a variable from a pool of `pool_len` variables (`pool_len >= 1`)
    fn select(&mut self, pool_len: usize) -> VariableId;
}

/// Uniform pick from a per-worker seeded sequence
#[derive(Debug, Clone)]
pub struct SeededSelector {
    rng: StdRng,
}

impl SeededSelector {
    /// Create a selector replaying the sequence of `seed`
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl TargetSelector for SeededSelector {
    fn select(&mut self, pool_len: usize) -> VariableId {
        if pool_len <= 1 {
            return VariableId::new(0);
        }
        VariableId::new(self.rng.gen_range(0..pool_len))
    }
}

/// Always the same variable
#[derive(Debug, Clone, Copy)]
pub struct FixedSelector {
    id: VariableId,
}

impl FixedSelector {
    /// Pin selection to `id`
    pub fn new(id: VariableId) -> Self {
        Self { id }
    }
}

impl TargetSelector for FixedSelector {
    fn select(&mut self, _pool_len: usize) -> VariableId {
        self.id
    }
}

/// Worker `i` always targets variable `i mod pool_len`
///
/// With at least as many variables as workers, no two workers share a target.
#[derive(Debug, Clone, Copy)]
pub struct PartitionedSelector {
    worker: WorkerId,
}

impl PartitionedSelector {
    /// Create the selector for `worker`
    pub fn new(worker: WorkerId) -> Self {
        Self { worker }
    }
}

impl TargetSelector for PartitionedSelector {
    fn select(&mut self, pool_len: usize) -> VariableId {
        VariableId::new(self.worker.index() as usize % pool_len.max(1))
    }
}

/// Build the selector a worker uses under `config`
pub fn selector_for(config: &SpeculationConfig, worker: WorkerId) -> Box<dyn TargetSelector> {
    match config.selection {
        SelectionPolicy::Random => Box::new(SeededSelector::new(config.worker_seed(worker))),
        SelectionPolicy::Fixed => Box::new(FixedSelector::new(config.fixed_variable_id())),
        SelectionPolicy::Partitioned => Box::new(PartitionedSelector::new(worker)),
    }
}
