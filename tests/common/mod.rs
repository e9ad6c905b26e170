//! Shared test utilities for the integration suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's main.rs.

#![allow(dead_code)]

use specula::{RunReport, SpeculationConfig, Speculator};

/// Default shape with latency small enough for CI
pub fn quick_config() -> SpeculationConfig {
    SpeculationConfig::new().with_execute_delay_ms(0, 2)
}

/// Validate and run, panicking on error
pub fn run(config: SpeculationConfig) -> RunReport {
    Speculator::new(config)
        .expect("config should be valid")
        .run()
        .expect("run should succeed")
}

/// Checks that hold for every run regardless of interleaving
pub fn assert_run_invariants(config: &SpeculationConfig, report: &RunReport) {
    let attempts = config.theoretical_max_commits();
    assert_eq!(report.theoretical_max, attempts);
    assert_eq!(report.total_commits + report.exhausted_attempts, attempts);
    assert_eq!(report.total_commits, report.total_version());
    assert!(report.rounds <= attempts * (u64::from(config.retry_budget) + 1));
    for variable in &report.variables {
        assert_eq!(
            variable.value as u64, variable.version,
            "increment work keeps value == version"
        );
    }
}
