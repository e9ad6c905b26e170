//! The reference layouts: shared target vs. one target per worker.

use crate::common::*;
use specula::SelectionPolicy;

#[test]
fn test_shared_variable_commits_match_version() {
    let config = quick_config();
    let report = run(config.clone());

    assert_run_invariants(&config, &report);
    assert_eq!(report.variables.len(), 1);
    assert_eq!(report.variables[0].version, report.total_commits);
    assert!(report.total_commits <= 20);
    assert!(report.success_rate() <= 100.0);
}

#[test]
fn test_partitioned_variables_all_commit() {
    let config = quick_config()
        .with_variables(4)
        .with_selection(SelectionPolicy::Partitioned);
    let report = run(config.clone());

    assert_run_invariants(&config, &report);
    assert_eq!(report.total_commits, 20);
    assert_eq!(report.success_rate(), 100.0);
    let versions: Vec<u64> = report.variables.iter().map(|v| v.version).collect();
    assert_eq!(versions, vec![5, 5, 5, 5]);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["total_commits"], 20);
    assert_eq!(json["variables"][3]["version"], 5);
}

#[test]
fn test_more_variables_than_workers() {
    let config = quick_config()
        .with_workers(2)
        .with_variables(6)
        .with_selection(SelectionPolicy::Partitioned);
    let report = run(config.clone());

    assert_run_invariants(&config, &report);
    assert_eq!(report.total_commits, 10);
    // Workers 0 and 1 only touch their own slot
    assert_eq!(report.variables[0].version, 5);
    assert_eq!(report.variables[1].version, 5);
    assert!(report.variables[2..].iter().all(|v| v.version == 0));
}

#[test]
fn test_heavy_contention_stays_consistent() {
    let config = quick_config()
        .with_workers(12)
        .with_cycles_per_worker(4)
        .with_execute_delay_ms(1, 3);
    let report = run(config.clone());

    assert_run_invariants(&config, &report);
    assert!(report.total_commits >= 1);
    assert_eq!(report.workers.len(), 12);
}
