//! Seeded selection replays the same targets.

use crate::common::*;
use specula::{SeededSelector, TargetSelector, VariableId};

/// With one worker nothing conflicts, so the final versions are exactly the
/// histogram of the seeded target sequence.
#[test]
fn test_single_worker_follows_seeded_targets() {
    let config = quick_config()
        .with_workers(1)
        .with_variables(5)
        .with_cycles_per_worker(40)
        .with_base_seed(1234);
    let report = run(config.clone());
    assert_run_invariants(&config, &report);

    let mut selector = SeededSelector::new(1234);
    let mut expected = vec![0u64; 5];
    for _ in 0..40 {
        expected[selector.select(5).index()] += 1;
    }

    let versions: Vec<u64> = report.variables.iter().map(|v| v.version).collect();
    assert_eq!(versions, expected);
    for (index, &count) in expected.iter().enumerate() {
        assert_eq!(report.workers[0].commits_on(VariableId::new(index)), count);
    }
}

#[test]
fn test_same_seed_same_result_without_contention() {
    let config = quick_config()
        .with_workers(1)
        .with_variables(3)
        .with_cycles_per_worker(12)
        .with_base_seed(99);

    let first = run(config.clone());
    let second = run(config);
    assert_eq!(first.variables, second.variables);
}
