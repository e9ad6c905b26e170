//! Shared speculation counters
//!
//! One [`SpeculationMetrics`] is shared by every worker of a run. Attempts
//! record into it as they move through the state machine; the engine reads a
//! [`MetricsSnapshot`] once all workers have joined.
//!
//! # Memory Ordering
//!
//! All counters use Relaxed ordering:
//! 1. They do not synchronize any other memory operations
//! 2. Increments are unordered and commutative
//! 3. Final values are read after the worker threads are joined, which
//!    already establishes happens-before with every increment

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared by all attempts of a run
#[derive(Debug, Default)]
pub struct SpeculationMetrics {
    /// Attempts started (one per worker cycle)
    attempts_started: AtomicU64,
    /// Attempts that reached COMMIT
    commits: AtomicU64,
    /// Attempts abandoned with the retry budget exhausted
    exhausted: AtomicU64,
    /// Failed validations (each one leads to RETRY)
    conflicts: AtomicU64,
    /// READ→EXECUTE→VALIDATE rounds across all attempts
    rounds: AtomicU64,
}

impl SpeculationMetrics {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the start of an attempt
    pub fn record_start(&self) {
        self.attempts_started.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful commit
    pub fn record_commit(&self) {
        self.commits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an attempt abandoned after exhausting its retries
    pub fn record_exhausted(&self) {
        self.exhausted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed validation
    pub fn record_conflict(&self) {
        self.conflicts.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one READ→EXECUTE→VALIDATE round
    pub fn record_round(&self) {
        self.rounds.fetch_add(1, Ordering::Relaxed);
    }

    /// Total successful commits so far
    pub fn commits(&self) -> u64 {
        self.commits.load(Ordering::Relaxed)
    }

    /// Read all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            attempts_started: self.attempts_started.load(Ordering::Relaxed),
            commits: self.commits.load(Ordering::Relaxed),
            exhausted: self.exhausted.load(Ordering::Relaxed),
            conflicts: self.conflicts.load(Ordering::Relaxed),
            rounds: self.rounds.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`SpeculationMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Attempts started
    pub attempts_started: u64,
    /// Attempts committed
    pub commits: u64,
    /// Attempts abandoned with retries exhausted
    pub exhausted: u64,
    /// Failed validations
    pub conflicts: u64,
    /// READ→EXECUTE→VALIDATE rounds
    pub rounds: u64,
}

impl MetricsSnapshot {
    /// Attempts that reached a terminal state
    pub fn completed(&self) -> u64 {
        self.commits + self.exhausted
    }

    /// Fraction of started attempts that committed
    pub fn commit_rate(&self) -> f64 {
        if self.attempts_started > 0 {
            self.commits as f64 / self.attempts_started as f64
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_new_metrics_are_zero() {
        let metrics = SpeculationMetrics::new();
        assert_eq!(metrics.snapshot(), MetricsSnapshot::default());
        assert_eq!(metrics.snapshot().commit_rate(), 0.0);
    }

    #[test]
    fn test_record_updates_snapshot() {
        let metrics = SpeculationMetrics::new();
        metrics.record_start();
        metrics.record_round();
        metrics.record_conflict();
        metrics.record_round();
        metrics.record_commit();

        metrics.record_start();
        metrics.record_round();
        metrics.record_exhausted();

        let snap = metrics.snapshot();
        assert_eq!(snap.attempts_started, 2);
        assert_eq!(snap.commits, 1);
        assert_eq!(snap.exhausted, 1);
        assert_eq!(snap.conflicts, 1);
        assert_eq!(snap.rounds, 3);
        assert_eq!(snap.completed(), 2);
        assert_eq!(snap.commit_rate(), 0.5);
        assert_eq!(metrics.commits(), 1);
    }

    #[test]
    fn test_concurrent_increments_are_not_lost() {
        let metrics = Arc::new(SpeculationMetrics::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let metrics = Arc::clone(&metrics);
                thread::spawn(move || {
                    for _ in 0..1000 {
                        metrics.record_commit();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(metrics.commits(), 8000);
    }
}
