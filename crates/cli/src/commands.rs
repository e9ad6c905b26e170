//! Clap command tree definition.
//!
//! The run flags are global so they apply both to the implicit default run
//! (`specula --workers 8`) and to every subcommand that builds a config.

use clap::{value_parser, Arg, ArgAction, Command};

/// Build the complete CLI command tree.
pub fn build_cli() -> Command {
    Command::new("specula")
        .about("Thread-level speculative execution over shared versioned variables")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(false)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("PATH")
                .help("Config file (default: ./specula.toml if present)")
                .global(true),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("JSON output mode")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Raise log level (-v debug, -vv trace); RUST_LOG overrides")
                .action(ArgAction::Count)
                .global(true),
        )
        .args(run_args())
        .subcommand(Command::new("run").about("Run the workers once and report (default)"))
        .subcommand(build_sweep())
        .subcommand(build_init())
}

/// Flags that override fields of the loaded config.
fn run_args() -> Vec<Arg> {
    vec![
        Arg::new("workers")
            .long("workers")
            .short('w')
            .value_name("N")
            .help("Number of worker threads (default: 4)")
            .value_parser(value_parser!(u32))
            .global(true),
        Arg::new("variables")
            .long("variables")
            .short('n')
            .value_name("M")
            .help("Number of shared variables (default: 1)")
            .value_parser(value_parser!(usize))
            .global(true),
        Arg::new("cycles")
            .long("cycles")
            .value_name("C")
            .help("Cycles per worker (default: 5)")
            .value_parser(value_parser!(u32))
            .global(true),
        Arg::new("retries")
            .long("retries")
            .value_name("R")
            .help("Retry budget per attempt (default: 3)")
            .value_parser(value_parser!(u32))
            .global(true),
        Arg::new("seed")
            .long("seed")
            .value_name("S")
            .help("Base seed; worker i uses seed + i (default: 42)")
            .value_parser(value_parser!(u64))
            .global(true),
        Arg::new("selection")
            .long("selection")
            .value_name("POLICY")
            .help("Target selection policy")
            .value_parser(["random", "fixed", "partitioned"])
            .global(true),
        Arg::new("fixed-variable")
            .long("fixed-variable")
            .value_name("INDEX")
            .help("Variable every worker targets (implies --selection fixed)")
            .value_parser(value_parser!(usize))
            .global(true),
        Arg::new("delay-min")
            .long("delay-min")
            .value_name("MS")
            .help("Minimum simulated EXECUTE latency (default: 10)")
            .value_parser(value_parser!(u64))
            .global(true),
        Arg::new("delay-max")
            .long("delay-max")
            .value_name("MS")
            .help("Maximum simulated EXECUTE latency (default: 29)")
            .value_parser(value_parser!(u64))
            .global(true),
    ]
}

fn build_sweep() -> Command {
    Command::new("sweep")
        .about("Run once per worker count and compare success rates")
        .arg(
            Arg::new("max-workers")
                .long("max-workers")
                .value_name("N")
                .help("Largest worker count (default: 11)")
                .value_parser(value_parser!(u32))
                .default_value("11"),
        )
        .arg(
            Arg::new("min-workers")
                .long("min-workers")
                .value_name("N")
                .help("Smallest worker count")
                .value_parser(value_parser!(u32))
                .default_value("1"),
        )
}

fn build_init() -> Command {
    Command::new("init")
        .about("Write a default config file if none exists")
        .arg(
            Arg::new("path")
                .value_name("PATH")
                .help("Where to write it (default: ./specula.toml)"),
        )
}
