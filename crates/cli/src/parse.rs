//! ArgMatches → CliAction conversion.
//!
//! Config precedence, lowest first: built-in defaults, the config file
//! (`--config`, or `./specula.toml` when present), then command-line flags.

use std::path::{Path, PathBuf};

use clap::ArgMatches;
use specula_core::{SpeculaError, SpeculaResult};
use specula_engine::{SelectionPolicy, SpeculationConfig, CONFIG_FILE_NAME};

/// The result of parsing the command line.
#[derive(Debug, Clone, PartialEq)]
pub enum CliAction {
    /// One run with the given config.
    Run(SpeculationConfig),
    /// One run per worker count.
    Sweep {
        base: SpeculationConfig,
        worker_counts: Vec<u32>,
    },
    /// Write a default config file.
    Init { path: PathBuf },
}

/// Convert parsed arguments into an action, loading and validating config.
pub fn matches_to_action(matches: &ArgMatches) -> SpeculaResult<CliAction> {
    match matches.subcommand() {
        Some(("init", sub)) => Ok(CliAction::Init {
            path: sub
                .get_one::<String>("path")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME)),
        }),
        Some(("sweep", sub)) => {
            let base = build_config(sub)?;
            let min = sub.get_one::<u32>("min-workers").copied().unwrap_or(1);
            let max = sub.get_one::<u32>("max-workers").copied().unwrap_or(11);
            if min == 0 || min > max {
                return Err(SpeculaError::invalid_config(format!(
                    "sweep range {}..={} must start at 1 or more and not be empty",
                    min, max
                )));
            }
            Ok(CliAction::Sweep {
                base,
                worker_counts: (min..=max).collect(),
            })
        }
        Some(("run", sub)) => Ok(CliAction::Run(build_config(sub)?)),
        _ => Ok(CliAction::Run(build_config(matches)?)),
    }
}

/// Load the config file (if any) and apply flag overrides.
///
/// The file is only parsed here; the merged result is validated once at the
/// end, so a flag can repair a value the file got wrong.
fn build_config(matches: &ArgMatches) -> SpeculaResult<SpeculationConfig> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => SpeculationConfig::parse_file(Path::new(path))?,
        None if Path::new(CONFIG_FILE_NAME).is_file() => {
            SpeculationConfig::parse_file(Path::new(CONFIG_FILE_NAME))?
        }
        None => SpeculationConfig::default(),
    };

    if let Some(&workers) = matches.get_one::<u32>("workers") {
        config = config.with_workers(workers);
    }
    if let Some(&variables) = matches.get_one::<usize>("variables") {
        config = config.with_variables(variables);
    }
    if let Some(&cycles) = matches.get_one::<u32>("cycles") {
        config = config.with_cycles_per_worker(cycles);
    }
    if let Some(&retries) = matches.get_one::<u32>("retries") {
        config = config.with_retry_budget(retries);
    }
    if let Some(&seed) = matches.get_one::<u64>("seed") {
        config = config.with_base_seed(seed);
    }
    if let Some(selection) = matches.get_one::<String>("selection") {
        config = config.with_selection(selection.parse::<SelectionPolicy>()?);
    }
    if let Some(&variable) = matches.get_one::<usize>("fixed-variable") {
        config = config.with_fixed_variable(variable);
    }

    let min = matches.get_one::<u64>("delay-min").copied();
    let max = matches.get_one::<u64>("delay-max").copied();
    if min.is_some() || max.is_some() {
        let min_ms = min.unwrap_or(config.execute_delay_min_ms);
        let max_ms = max.unwrap_or(config.execute_delay_max_ms);
        config = config.with_execute_delay_ms(min_ms, max_ms);
    }

    config.validate()?;
    Ok(config)
}
