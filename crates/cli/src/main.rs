//! Specula CLI: run speculative workers against shared versioned variables.
//!
//! - `specula [flags]` / `specula run [flags]`: one run, final values and totals
//! - `specula sweep --max-workers N`: one run per worker count
//! - `specula init [PATH]`: write a default `specula.toml`
//!
//! Logs go to stderr; reports go to stdout.

mod commands;
mod format;
mod parse;

use std::process;

use specula_core::SpeculaResult;
use specula_engine::{sweep, SpeculationConfig, Speculator};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use commands::build_cli;
use format::{format_error, format_run_report, format_sweep, OutputMode};
use parse::{matches_to_action, CliAction};

fn main() {
    let matches = build_cli().get_matches();

    let output_mode = if matches.get_flag("json") {
        OutputMode::Json
    } else {
        OutputMode::Human
    };
    init_tracing(matches.get_count("verbose"));

    let result = matches_to_action(&matches).and_then(|action| execute(action, output_mode));
    match result {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("{}", format_error(&e, output_mode));
            process::exit(1);
        }
    }
}

fn execute(action: CliAction, mode: OutputMode) -> SpeculaResult<String> {
    debug!(target: "specula::cli", ?action, "Dispatching");
    match action {
        CliAction::Run(config) => {
            let report = Speculator::new(config)?.run()?;
            Ok(format_run_report(&report, mode))
        }
        CliAction::Sweep {
            base,
            worker_counts,
        } => {
            let points = sweep(&base, worker_counts)?;
            Ok(format_sweep(&points, mode))
        }
        CliAction::Init { path } => {
            SpeculationConfig::write_default_if_missing(&path)?;
            Ok(format!("Config file at {}", path.display()))
        }
    }
}

/// Install the stderr subscriber. `RUST_LOG` wins over `-v`.
fn init_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
