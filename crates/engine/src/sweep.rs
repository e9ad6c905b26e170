//! Worker-count sweep
//!
//! Runs the engine once per worker count with everything else held fixed,
//! to show how contention grows with parallelism.

use crate::config::SpeculationConfig;
use crate::speculator::{RunReport, Speculator};
use serde::{Deserialize, Serialize};
use specula_core::SpeculaResult;
use tracing::info;

/// One run of a sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    /// Worker count for this run
    pub workers: u32,
    /// Variable count for this run
    pub variables: usize,
    /// Successful commits
    pub total_commits: u64,
    /// `workers * cycles_per_worker`
    pub theoretical_max: u64,
    /// `total_commits` as a percentage of `theoretical_max`
    pub success_rate: f64,
}

impl SweepPoint {
    fn from_report(workers: u32, variables: usize, report: &RunReport) -> Self {
        Self {
            workers,
            variables,
            total_commits: report.total_commits,
            theoretical_max: report.theoretical_max,
            success_rate: report.success_rate(),
        }
    }
}

/// Run `base` once for each worker count
///
/// # Errors
///
/// Fails on the first worker count whose configuration is invalid or whose
/// run fails. Points gathered before it are discarded.
pub fn sweep<I>(base: &SpeculationConfig, worker_counts: I) -> SpeculaResult<Vec<SweepPoint>>
where
    I: IntoIterator<Item = u32>,
{
    let mut points = Vec::new();
    for workers in worker_counts {
        let config = base.clone().with_workers(workers);
        let report = Speculator::new(config)?.run()?;
        let point = SweepPoint::from_report(workers, base.variables, &report);
        info!(
            target: "specula::engine",
            workers,
            variables = base.variables,
            success_rate = point.success_rate,
            "Sweep point complete"
        );
        points.push(point);
    }
    Ok(points)
}
