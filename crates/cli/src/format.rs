//! Report → human/json string formatting.
//!
//! Two modes:
//! - **Human** (default): one line per variable, then the totals
//! - **JSON** (`--json`): `serde_json::to_string_pretty`

use serde::Serialize;
use specula_core::SpeculaError;
use specula_engine::{RunReport, SweepPoint};

/// Output formatting mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

/// Format the result of a single run.
pub fn format_run_report(report: &RunReport, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => to_json(report),
        OutputMode::Human => {
            let mut lines: Vec<String> = report
                .variables
                .iter()
                .map(|v| format!("Final value of shared_data[{}]: {}", v.id, v.value))
                .collect();
            lines.push(format!("Successful Commits: {}", report.total_commits));
            lines.push(format!("Theoretical maximum: {}", report.theoretical_max));
            lines.push(format!("Success rate: {:.2}%", report.success_rate()));
            lines.push(format!(
                "Exhausted attempts: {} (conflicts: {}, rounds: {})",
                report.exhausted_attempts, report.conflicts, report.rounds
            ));
            lines.push(format!("Elapsed: {} ms", report.elapsed_ms));
            lines.join("\n")
        }
    }
}

/// Format the points of a sweep.
pub fn format_sweep(points: &[SweepPoint], mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => to_json(points),
        OutputMode::Human => points
            .iter()
            .map(|p| {
                format!(
                    "Threads: {:>3}  Variables: {:>3}  Commits: {:>5}/{:<5}  Success: {:.2}%",
                    p.workers, p.variables, p.total_commits, p.theoretical_max, p.success_rate
                )
            })
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// Format an error.
pub fn format_error(err: &SpeculaError, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => serde_json::to_string_pretty(&serde_json::json!({
            "error": format!("{}", err)
        }))
        .unwrap_or_else(|_| format!("{{\"error\": \"{}\"}}", err)),
        OutputMode::Human => format!("(error) {}", err),
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize output: {}\"}}", e))
}
