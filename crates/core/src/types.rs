//! Core identifier types for Specula
//!
//! This module defines the identifiers shared by every layer:
//! - WorkerId: Index of a speculative worker in the worker pool
//! - VariableId: Index of a versioned variable in the variable pool

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a speculative worker
///
/// Workers are numbered densely from 0 in the order the engine spawns them.
/// The id also derives the worker's deterministic seed (`base_seed + id`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkerId(u32);

impl WorkerId {
    /// Create a WorkerId from its index
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Get the raw index
    pub const fn index(&self) -> u32 {
        self.0
    }
}

impl From<u32> for WorkerId {
    fn from(index: u32) -> Self {
        Self(index)
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a versioned variable within a pool
///
/// A VariableId is only meaningful relative to the pool that issued it;
/// pools validate ids on lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableId(usize);

impl VariableId {
    /// Create a VariableId from its position in the pool
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Get the position in the pool
    pub const fn index(&self) -> usize {
        self.0
    }
}

impl From<usize> for VariableId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
