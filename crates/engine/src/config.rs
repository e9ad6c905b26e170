//! Run configuration via `specula.toml`
//!
//! A run is fully described by a [`SpeculationConfig`]: how many workers,
//! how many shared variables, how many cycles each worker performs, the retry
//! budget of every attempt, how workers pick their target, and how long the
//! simulated EXECUTE phase takes. Configurations can be built in code with
//! the `with_*` methods or loaded from a TOML file; the CLI layers its flags
//! on top of the file.
//!
//! Validation is eager: [`SpeculationConfig::validate`] is the only fatal
//! error path of the engine and runs before any worker starts.

use serde::{Deserialize, Serialize};
use specula_concurrency::DEFAULT_RETRY_BUDGET;
use specula_core::{SpeculaError, SpeculaResult, VariableId, WorkerId};
use std::fmt;
use std::io;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Config file name looked up by the CLI.
pub const CONFIG_FILE_NAME: &str = "specula.toml";

/// Cycles each worker performs unless configured otherwise
pub const DEFAULT_CYCLES_PER_WORKER: u32 = 5;

/// Seed of worker 0; worker `i` uses `base_seed + i`
pub const DEFAULT_BASE_SEED: u64 = 42;

/// Largest variable pool a run accepts
pub const MAX_VARIABLES: usize = 1 << 20;

/// How a worker chooses the variable for each cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionPolicy {
    /// Uniform pseudo-random pick from the worker's seeded sequence
    #[default]
    Random,
    /// Every worker always targets `fixed_variable`
    Fixed,
    /// Worker `i` always targets variable `i mod variables`
    Partitioned,
}

impl SelectionPolicy {
    /// Lower-case name, as accepted by the config file and CLI
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionPolicy::Random => "random",
            SelectionPolicy::Fixed => "fixed",
            SelectionPolicy::Partitioned => "partitioned",
        }
    }
}

impl fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SelectionPolicy {
    type Err = SpeculaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "random" => Ok(SelectionPolicy::Random),
            "fixed" => Ok(SelectionPolicy::Fixed),
            "partitioned" => Ok(SelectionPolicy::Partitioned),
            other => Err(SpeculaError::invalid_config(format!(
                "Invalid selection policy '{}'. Expected \"random\", \"fixed\" or \"partitioned\".",
                other
            ))),
        }
    }
}

/// Configuration of one speculative run
///
/// # Example
///
/// ```toml
/// workers = 4
/// variables = 1
/// cycles_per_worker = 5
/// retry_budget = 3
/// base_seed = 42
/// selection = "random"
/// execute_delay_min_ms = 10
/// execute_delay_max_ms = 29
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeculationConfig {
    /// Number of parallel workers
    pub workers: u32,
    /// Number of shared variables in the pool
    pub variables: usize,
    /// Attempts each worker performs, one after another
    pub cycles_per_worker: u32,
    /// Retries granted to each attempt after its first round
    pub retry_budget: u32,
    /// Seed of worker 0
    pub base_seed: u64,
    /// Target selection policy
    pub selection: SelectionPolicy,
    /// Variable used by [`SelectionPolicy::Fixed`]
    pub fixed_variable: usize,
    /// Lower bound of the simulated EXECUTE latency
    pub execute_delay_min_ms: u64,
    /// Upper bound (inclusive) of the simulated EXECUTE latency
    pub execute_delay_max_ms: u64,
}

impl Default for SpeculationConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            variables: 1,
            cycles_per_worker: DEFAULT_CYCLES_PER_WORKER,
            retry_budget: DEFAULT_RETRY_BUDGET,
            base_seed: DEFAULT_BASE_SEED,
            selection: SelectionPolicy::Random,
            fixed_variable: 0,
            execute_delay_min_ms: 10,
            execute_delay_max_ms: 29,
        }
    }
}

impl SpeculationConfig {
    /// Create a config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of workers
    pub fn with_workers(mut self, workers: u32) -> Self {
        self.workers = workers;
        self
    }

    /// Set the number of shared variables
    pub fn with_variables(mut self, variables: usize) -> Self {
        self.variables = variables;
        self
    }

    /// Set the number of cycles per worker
    pub fn with_cycles_per_worker(mut self, cycles: u32) -> Self {
        self.cycles_per_worker = cycles;
        self
    }

    /// Set the retry budget of every attempt
    pub fn with_retry_budget(mut self, retry_budget: u32) -> Self {
        self.retry_budget = retry_budget;
        self
    }

    /// Set the seed of worker 0
    pub fn with_base_seed(mut self, base_seed: u64) -> Self {
        self.base_seed = base_seed;
        self
    }

    /// Set the selection policy
    pub fn with_selection(mut self, selection: SelectionPolicy) -> Self {
        self.selection = selection;
        self
    }

    /// Pin every worker to one variable
    pub fn with_fixed_variable(mut self, variable: usize) -> Self {
        self.selection = SelectionPolicy::Fixed;
        self.fixed_variable = variable;
        self
    }

    /// Set the simulated EXECUTE latency range in milliseconds (inclusive)
    pub fn with_execute_delay_ms(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.execute_delay_min_ms = min_ms;
        self.execute_delay_max_ms = max_ms;
        self
    }

    /// Reject configurations the engine cannot run
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if a count is zero, the pool exceeds
    /// [`MAX_VARIABLES`], the delay range is inverted, or the fixed variable
    /// lies outside the pool.
    pub fn validate(&self) -> SpeculaResult<()> {
        if self.workers == 0 {
            return Err(SpeculaError::invalid_config("workers must be at least 1"));
        }
        if self.variables == 0 {
            return Err(SpeculaError::invalid_config("variables must be at least 1"));
        }
        if self.variables > MAX_VARIABLES {
            return Err(SpeculaError::invalid_config(format!(
                "variables must be at most {}, got {}",
                MAX_VARIABLES, self.variables
            )));
        }
        if self.cycles_per_worker == 0 {
            return Err(SpeculaError::invalid_config(
                "cycles_per_worker must be at least 1",
            ));
        }
        if self.execute_delay_min_ms > self.execute_delay_max_ms {
            return Err(SpeculaError::invalid_config(format!(
                "execute delay range is empty: min {}ms > max {}ms",
                self.execute_delay_min_ms, self.execute_delay_max_ms
            )));
        }
        if self.selection == SelectionPolicy::Fixed && self.fixed_variable >= self.variables {
            return Err(SpeculaError::invalid_config(format!(
                "fixed_variable {} out of range for {} variable(s)",
                self.fixed_variable, self.variables
            )));
        }
        Ok(())
    }

    /// Deterministic seed of a worker
    pub fn worker_seed(&self, worker: WorkerId) -> u64 {
        self.base_seed.wrapping_add(u64::from(worker.index()))
    }

    /// Variable pinned by the fixed policy
    pub fn fixed_variable_id(&self) -> VariableId {
        VariableId::new(self.fixed_variable)
    }

    /// Simulated EXECUTE latency range
    pub fn execute_delay(&self) -> (Duration, Duration) {
        (
            Duration::from_millis(self.execute_delay_min_ms),
            Duration::from_millis(self.execute_delay_max_ms),
        )
    }

    /// Most commits a run can produce (`workers * cycles_per_worker`)
    pub fn theoretical_max_commits(&self) -> u64 {
        u64::from(self.workers) * u64::from(self.cycles_per_worker)
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Specula run configuration

# Number of parallel speculative workers
workers = 4

# Number of shared versioned variables
variables = 1

# Attempts per worker, run one after another
cycles_per_worker = 5

# Retries per attempt after the first round (0 = single round)
retry_budget = 3

# Seed of worker 0; worker i uses base_seed + i
base_seed = 42

# Target selection: "random" (seeded), "fixed" or "partitioned"
selection = "random"
# fixed_variable = 0

# Simulated EXECUTE latency in milliseconds (inclusive range)
execute_delay_min_ms = 10
execute_delay_max_ms = 29
"#
    }

    /// Read, parse and validate config from a file path.
    ///
    /// Missing fields take their default values.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read and `InvalidConfig` if it
    /// cannot be parsed or fails validation.
    pub fn from_file(path: &Path) -> SpeculaResult<Self> {
        let config = Self::parse_file(path)?;
        config.validate().map_err(|e| in_file(path, e))?;
        Ok(config)
    }

    /// Read and parse config from a file path without validating it.
    ///
    /// For callers that layer overrides on top of the file and validate the
    /// merged result once.
    pub fn parse_file(path: &Path) -> SpeculaResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            io::Error::new(
                e.kind(),
                format!("failed to read config file '{}': {}", path.display(), e),
            )
        })?;
        Self::parse_toml_str(&content).map_err(|e| in_file(path, e))
    }

    /// Parse and validate config from TOML text.
    pub fn from_toml_str(content: &str) -> SpeculaResult<Self> {
        let config = Self::parse_toml_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn parse_toml_str(content: &str) -> SpeculaResult<Self> {
        toml::from_str(content).map_err(|e| SpeculaError::invalid_config(e.to_string()))
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> SpeculaResult<()> {
        if !path.exists() {
            write_file(path, Self::default_toml())?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> SpeculaResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SpeculaError::internal(format!("Failed to serialize config: {}", e)))?;
        write_file(path, &content)
    }
}

fn write_file(path: &Path, content: &str) -> SpeculaResult<()> {
    std::fs::write(path, content).map_err(|e| {
        SpeculaError::Io(io::Error::new(
            e.kind(),
            format!("failed to write config file '{}': {}", path.display(), e),
        ))
    })
}

/// Prefix a config error with the file it came from
fn in_file(path: &Path, err: SpeculaError) -> SpeculaError {
    match err {
        SpeculaError::InvalidConfig(message) => SpeculaError::invalid_config(format!(
            "config file '{}': {}",
            path.display(),
            message
        )),
        other => other,
    }
}
