//! Pool of shared versioned variables
//!
//! The pool is created once per run, owned by the engine, and lent to every
//! worker by shared reference. No worker owns a variable; all mutation goes
//! through [`VersionedVariable::try_commit`].

use crate::config::MAX_VARIABLES;
use serde::{Deserialize, Serialize};
use specula_concurrency::VersionedVariable;
use specula_core::{SpeculaError, SpeculaResult, VariableId};

/// Fixed-size arena of [`VersionedVariable`]s addressed by [`VariableId`]
#[derive(Debug)]
pub struct VariablePool {
    variables: Vec<VersionedVariable>,
}

impl VariablePool {
    /// Create `count` variables at `value = 0, version = 0`
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if `count` is zero or above [`MAX_VARIABLES`].
    pub fn new(count: usize) -> SpeculaResult<Self> {
        if count == 0 {
            return Err(SpeculaError::invalid_config(
                "variable pool needs at least one variable",
            ));
        }
        if count > MAX_VARIABLES {
            return Err(SpeculaError::invalid_config(format!(
                "variable pool of {} exceeds the maximum of {}",
                count, MAX_VARIABLES
            )));
        }
        Ok(VariablePool {
            variables: (0..count).map(|_| VersionedVariable::new()).collect(),
        })
    }

    /// Number of variables
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Always false: pools hold at least one variable
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Look up a variable
    ///
    /// # Errors
    ///
    /// Returns `VariableOutOfRange` if the id does not belong to this pool.
    pub fn get(&self, id: VariableId) -> SpeculaResult<&VersionedVariable> {
        self.variables
            .get(id.index())
            .ok_or(SpeculaError::VariableOutOfRange {
                id,
                len: self.variables.len(),
            })
    }

    /// Iterate over `(id, variable)` pairs in id order
    pub fn iter(&self) -> impl Iterator<Item = (VariableId, &VersionedVariable)> {
        self.variables
            .iter()
            .enumerate()
            .map(|(i, var)| (VariableId::new(i), var))
    }

    /// Final `(value, version)` of every variable
    pub fn reports(&self) -> Vec<VariableReport> {
        self.iter()
            .map(|(id, var)| {
                let snapshot = var.snapshot();
                VariableReport {
                    id,
                    value: snapshot.value,
                    version: snapshot.version,
                }
            })
            .collect()
    }

    /// Sum of all versions (total commits applied to the pool)
    pub fn total_version(&self) -> u64 {
        self.variables.iter().map(VersionedVariable::version).sum()
    }
}

/// Final state of one variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableReport {
    /// Variable id
    pub id: VariableId,
    /// Final payload
    pub value: i64,
    /// Final version (commits applied)
    pub version: u64,
}
