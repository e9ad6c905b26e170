//! Runs configured from TOML files.

use crate::common::*;
use specula::{SelectionPolicy, SpeculationConfig, Speculator};
use tempfile::TempDir;

#[test]
fn test_run_from_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("specula.toml");
    std::fs::write(
        &path,
        r#"
workers = 3
variables = 3
cycles_per_worker = 2
selection = "partitioned"
execute_delay_min_ms = 0
execute_delay_max_ms = 1
"#,
    )
    .unwrap();

    let config = SpeculationConfig::from_file(&path).unwrap();
    assert_eq!(config.selection, SelectionPolicy::Partitioned);
    assert_eq!(config.retry_budget, 3);

    let report = run(config.clone());
    assert_run_invariants(&config, &report);
    assert_eq!(report.total_commits, 6);
}

#[test]
fn test_written_default_round_trips_into_a_run() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("specula.toml");
    SpeculationConfig::write_default_if_missing(&path).unwrap();

    let config = SpeculationConfig::from_file(&path).unwrap();
    assert_eq!(config, SpeculationConfig::default());
    assert!(Speculator::new(config).is_ok());
}

#[test]
fn test_invalid_file_is_rejected_before_running() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("specula.toml");
    std::fs::write(&path, "workers = 2\nvariables = 2\nselection = \"fixed\"\nfixed_variable = 5\n")
        .unwrap();

    let err = SpeculationConfig::from_file(&path).unwrap_err();
    assert!(err.is_config_error());
    assert!(err.to_string().contains("specula.toml"));
}
