//! Concurrent/Multi-threaded Tests for specula-concurrency
//!
//! These tests verify correct behavior under actual concurrent execution:
//!
//! 1. **First-Committer-Wins** - Two commits against one version never both succeed
//! 2. **Version Monotonicity** - Versions never go backwards and never skip
//! 3. **Commit Accounting** - Final version equals the number of commits
//! 4. **No Torn Reads** - Every observed value was produced by a real commit
//! 5. **Attempt Stress** - Many attempts on one variable terminate within budget
//!
//! ## Running These Tests
//!
//! ```bash
//! cargo test --test concurrent_tests
//! cargo test --test concurrent_tests -- --nocapture --test-threads=1  # sequential for debugging
//! ```

use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use specula_concurrency::{
    AttemptOutcome, SpeculationMetrics, SpeculativeAttempt, VersionedVariable,
    DEFAULT_RETRY_BUDGET,
};
use specula_core::{VariableId, WorkerId};

// ============================================================================
// Test Helpers
// ============================================================================

static_assertions::assert_impl_all!(VersionedVariable: Send, Sync);
static_assertions::assert_impl_all!(SpeculationMetrics: Send, Sync);

/// Increment computation with a short pause to widen the contention window
fn slow_increment(value: i64) -> i64 {
    thread::sleep(Duration::from_micros(200));
    value + 1
}

// ============================================================================
// SECTION 1: First-Committer-Wins
// ============================================================================

mod first_committer_wins {
    use super::*;

    /// Two threads snapshot the same version, then race to commit.
    /// Exactly one may win; a spurious failure may make both lose, never both win.
    #[test]
    fn test_same_version_commits_at_most_once() {
        for _ in 0..200 {
            let var = Arc::new(VersionedVariable::new());
            let barrier = Arc::new(Barrier::new(2));
            let winners = Arc::new(AtomicUsize::new(0));

            let handles: Vec<_> = (0..2)
                .map(|i| {
                    let var = Arc::clone(&var);
                    let barrier = Arc::clone(&barrier);
                    let winners = Arc::clone(&winners);
                    thread::spawn(move || {
                        let snap = var.snapshot();
                        barrier.wait();
                        if var.try_commit(snap.version, 100 + i) {
                            winners.fetch_add(1, Ordering::SeqCst);
                        }
                    })
                })
                .collect();

            for handle in handles {
                handle.join().unwrap();
            }

            let winners = winners.load(Ordering::SeqCst);
            assert!(winners <= 1, "two commits succeeded against one version");
            assert_eq!(var.version(), winners as u64);
        }
    }

    /// Many threads each commit once against the version they observed.
    /// Every successful commit must produce a distinct version.
    #[test]
    fn test_committed_versions_are_unique() {
        let var = Arc::new(VersionedVariable::new());
        let num_threads = 16;
        let barrier = Arc::new(Barrier::new(num_threads));
        let produced = Arc::new(Mutex::new(Vec::new()));

        let handles: Vec<_> = (0..num_threads)
            .map(|_| {
                let var = Arc::clone(&var);
                let barrier = Arc::clone(&barrier);
                let produced = Arc::clone(&produced);
                thread::spawn(move || {
                    barrier.wait();
                    for _ in 0..200 {
                        let snap = var.snapshot();
                        if var.try_commit(snap.version, snap.value + 1) {
                            produced.lock().push(snap.version + 1);
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let produced = produced.lock();
        let unique: HashSet<_> = produced.iter().copied().collect();
        assert_eq!(unique.len(), produced.len(), "versions must be unique");
        assert_eq!(var.version(), produced.len() as u64);
        // Versions 1..=n, no gaps
        assert_eq!(unique, (1..=produced.len() as u64).collect());
    }
}

// ============================================================================
// SECTION 2: Version Monotonicity
// ============================================================================

mod version_monotonicity {
    use super::*;

    /// A reader sampling the version while writers commit never sees it go back
    #[test]
    fn test_version_never_decreases_under_load() {
        let var = Arc::new(VersionedVariable::new());
        let done = Arc::new(AtomicBool::new(false));
        let num_writers = 8;

        let sampler = {
            let var = Arc::clone(&var);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let mut last = 0;
                while !done.load(Ordering::Acquire) {
                    let version = var.version();
                    assert!(version >= last, "version went from {} to {}", last, version);
                    last = version;
                }
                last
            })
        };

        let writers: Vec<_> = (0..num_writers)
            .map(|_| {
                let var = Arc::clone(&var);
                thread::spawn(move || {
                    for _ in 0..500 {
                        let snap = var.snapshot();
                        let _ = var.try_commit(snap.version, snap.value + 1);
                    }
                })
            })
            .collect();

        for writer in writers {
            writer.join().unwrap();
        }
        done.store(true, Ordering::Release);
        let last_seen = sampler.join().unwrap();

        assert!(last_seen <= var.version());
        assert!(!var.is_committing());
    }
}

// ============================================================================
// SECTION 3: Commit Accounting
// ============================================================================

mod commit_accounting {
    use super::*;

    /// Full attempts from many workers against one variable: the version delta
    /// equals the number of committed attempts, and the shared counter agrees.
    #[test]
    fn test_version_delta_matches_committed_attempts() {
        let var = VersionedVariable::new();
        let metrics = SpeculationMetrics::new();
        let num_workers = 8u32;
        let cycles = 10;

        let committed_by_workers: usize = thread::scope(|scope| {
            let handles: Vec<_> = (0..num_workers)
                .map(|w| {
                    let var = &var;
                    let metrics = &metrics;
                    scope.spawn(move || {
                        let mut committed = 0usize;
                        for _ in 0..cycles {
                            let mut attempt = SpeculativeAttempt::new(
                                WorkerId::new(w),
                                VariableId::new(0),
                                var,
                                metrics,
                                DEFAULT_RETRY_BUDGET,
                            );
                            if attempt.run(&mut slow_increment).is_committed() {
                                committed += 1;
                            }
                        }
                        committed
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).sum()
        });

        let snap = metrics.snapshot();
        assert_eq!(snap.attempts_started, (num_workers as u64) * cycles);
        assert_eq!(snap.completed(), snap.attempts_started);
        assert_eq!(snap.commits, committed_by_workers as u64);
        assert_eq!(var.version(), snap.commits);
        assert!(snap.commits <= (num_workers as u64) * cycles);
        assert!(snap.rounds <= snap.attempts_started * (DEFAULT_RETRY_BUDGET as u64 + 1));
    }
}

// ============================================================================
// SECTION 4: No Torn Reads / No Lost Updates
// ============================================================================

mod no_torn_reads {
    use super::*;

    /// With the increment computation, every published value equals its
    /// version. Any value a reader observes must therefore lie within the
    /// versions that were ever committed, and the final pair must match.
    #[test]
    fn test_observed_values_come_from_real_commits() {
        let var = VersionedVariable::new();
        let metrics = SpeculationMetrics::new();
        let done = AtomicBool::new(false);
        let observed = Mutex::new(Vec::new());

        thread::scope(|scope| {
            scope.spawn(|| {
                let mut local = Vec::new();
                while !done.load(Ordering::Acquire) {
                    local.push(var.snapshot());
                }
                observed.lock().extend(local);
            });

            let workers: Vec<_> = (0..6u32)
                .map(|w| {
                    let var = &var;
                    let metrics = &metrics;
                    scope.spawn(move || {
                        for _ in 0..20 {
                            let mut attempt = SpeculativeAttempt::new(
                                WorkerId::new(w),
                                VariableId::new(0),
                                var,
                                metrics,
                                DEFAULT_RETRY_BUDGET,
                            );
                            attempt.run(&mut slow_increment);
                        }
                    })
                })
                .collect();

            for worker in workers {
                worker.join().unwrap();
            }
            done.store(true, Ordering::Release);
        });

        let final_snap = var.snapshot();
        assert_eq!(final_snap.value as u64, final_snap.version);
        assert_eq!(final_snap.version, metrics.commits());

        for snap in observed.lock().iter() {
            assert!(snap.value >= 0);
            assert!(snap.version <= final_snap.version);
            assert!(
                (snap.value as u64) <= final_snap.version,
                "observed value {} was never committed",
                snap.value
            );
            // Values are never older than the version they are paired with
            assert!((snap.value as u64) >= snap.version);
        }
    }
}

// ============================================================================
// SECTION 5: Attempt Stress
// ============================================================================

mod attempt_stress {
    use super::*;

    /// Heavy contention on one variable: every attempt terminates, each within
    /// the round bound, and exhausted attempts leave no trace in the variable.
    #[test]
    fn test_attempts_terminate_within_round_bound() {
        let var = VersionedVariable::new();
        let metrics = SpeculationMetrics::new();
        let outcomes = Mutex::new(Vec::new());

        thread::scope(|scope| {
            for w in 0..12u32 {
                let var = &var;
                let metrics = &metrics;
                let outcomes = &outcomes;
                scope.spawn(move || {
                    for _ in 0..5 {
                        let mut attempt = SpeculativeAttempt::new(
                            WorkerId::new(w),
                            VariableId::new(0),
                            var,
                            metrics,
                            DEFAULT_RETRY_BUDGET,
                        );
                        let outcome = attempt.run(&mut slow_increment);
                        outcomes.lock().push(outcome);
                    }
                });
            }
        });

        let outcomes = outcomes.lock();
        assert_eq!(outcomes.len(), 60);

        let mut committed_versions = HashSet::new();
        for outcome in outcomes.iter() {
            assert!(outcome.rounds() >= 1);
            assert!(outcome.rounds() <= DEFAULT_RETRY_BUDGET + 1);
            match outcome {
                AttemptOutcome::Committed { version, value, .. } => {
                    assert_eq!(*value as u64, *version);
                    assert!(committed_versions.insert(*version));
                }
                AttemptOutcome::Exhausted { rounds } => {
                    assert_eq!(*rounds, DEFAULT_RETRY_BUDGET + 1);
                }
            }
        }

        assert_eq!(var.version(), committed_versions.len() as u64);
        assert_eq!(metrics.snapshot().exhausted as usize, 60 - committed_versions.len());
    }
}
