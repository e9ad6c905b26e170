//! Scenario Tests
//!
//! Whole-system runs through the `specula` facade: the reference worker and
//! variable layouts, determinism of seeded selection, and config files.

#[path = "../common/mod.rs"]
mod common;

mod config_files;
mod determinism;
mod reference_runs;
