//! Version-stamped shared variable for OCC
//!
//! A [`VersionedVariable`] holds an integer payload and a monotonic version
//! counter. The version is the only synchronisation point between workers:
//! speculation reads a snapshot, computes privately, then calls
//! [`VersionedVariable::try_commit`] with the version it observed. Exactly one
//! committer can win for any given version.
//!
//! # Memory Layout
//!
//! The version lives in a single `AtomicU64` sequence word:
//!
//! ```text
//! sequence = version << 1 | in_flight
//! ```
//!
//! - Even sequence: stable, the value matches `sequence >> 1` commits.
//! - Odd sequence: the winner of a compare-and-swap is publishing its value.
//!
//! The logical version (`sequence >> 1`) therefore advances by exactly one
//! per commit, and it only advances once the new value is visible.
//!
//! # Memory Ordering
//!
//! - `try_commit`: the winning `compare_exchange_weak` is `Acquire` so the
//!   value store cannot move above it; the value is stored `Relaxed`; the
//!   next even sequence is published with `Release`.
//! - `snapshot`: the sequence is loaded `Acquire`, then the value `Relaxed`.
//!   A reader that observes version `v` also observes the value committed at
//!   `v` (or a newer one).
//!
//! # Stale Snapshots
//!
//! The value/version pair is NOT read atomically. A snapshot can carry a
//! value that is newer than its version when it races a commit. Such a
//! snapshot can never validate: its version is already behind the sequence
//! word, so the commit that would publish a result computed from it fails.
//! Correctness comes from the compare at validate time, not from the read.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

/// Bit marking a commit in flight in the sequence word
const IN_FLIGHT: u64 = 1;

/// Largest version whose stable sequence fits in the sequence word
pub const MAX_VERSION: u64 = (u64::MAX >> 1) - 1;

/// Point-in-time observation of a [`VersionedVariable`]
///
/// `value` may be newer than `version` (see module docs); it is never older.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Payload observed
    pub value: i64,
    /// Version observed (number of commits applied at read time)
    pub version: u64,
}

/// Shared integer payload guarded by a monotonic version counter
///
/// Created with `value = 0, version = 0`. Mutated only through
/// [`try_commit`](Self::try_commit). Lock-free: no operation blocks.
pub struct VersionedVariable {
    /// Payload. Written only by the holder of an odd sequence.
    value: AtomicI64,
    /// `version << 1 | in_flight`
    sequence: AtomicU64,
}

impl VersionedVariable {
    /// Create a variable at `value = 0, version = 0`
    pub const fn new() -> Self {
        Self::with_value(0)
    }

    /// Create a variable with an initial payload at version 0
    pub const fn with_value(value: i64) -> Self {
        VersionedVariable {
            value: AtomicI64::new(value),
            sequence: AtomicU64::new(0),
        }
    }

    /// Read the payload and version without blocking
    ///
    /// The version is read with acquire ordering and the value with a plain
    /// load afterwards; the pair may be stale relative to each other.
    pub fn snapshot(&self) -> Snapshot {
        let sequence = self.sequence.load(Ordering::Acquire);
        let value = self.value.load(Ordering::Relaxed);
        Snapshot {
            value,
            version: sequence >> 1,
        }
    }

    /// Attempt to publish `new_value` as the successor of `expected_version`
    ///
    /// Returns `true` if this caller won: the version becomes
    /// `expected_version + 1` and the variable holds `new_value`. Returns
    /// `false` if the version moved, another commit is in flight, or the
    /// compare-and-swap failed spuriously; in that case nothing changed.
    ///
    /// Never retries internally. Callers treat every `false` as a conflict.
    pub fn try_commit(&self, expected_version: u64, new_value: i64) -> bool {
        if expected_version > MAX_VERSION {
            return false;
        }
        let stable = expected_version << 1;

        if self
            .sequence
            .compare_exchange_weak(stable, stable | IN_FLIGHT, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return false;
        }

        // Exclusive until the release store below.
        self.value.store(new_value, Ordering::Relaxed);
        self.sequence.store(stable + 2, Ordering::Release);
        true
    }

    /// Current version (number of commits applied)
    pub fn version(&self) -> u64 {
        self.sequence.load(Ordering::Acquire) >> 1
    }

    /// Current payload
    ///
    /// Equivalent to `snapshot().value`.
    pub fn value(&self) -> i64 {
        self.snapshot().value
    }

    /// Whether a winning committer is publishing its value right now
    pub fn is_committing(&self) -> bool {
        self.sequence.load(Ordering::Acquire) & IN_FLIGHT != 0
    }
}

impl Default for VersionedVariable {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for VersionedVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.snapshot();
        f.debug_struct("VersionedVariable")
            .field("value", &snapshot.value)
            .field("version", &snapshot.version)
            .finish()
    }
}
