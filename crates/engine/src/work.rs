//! Simulated EXECUTE computation
//!
//! [`SimulatedWork`] models a computation with real latency: it sleeps for a
//! seeded random duration inside the configured range, then returns the
//! private copy plus one. It never touches shared memory, so every other
//! worker can interleave freely while it runs.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use specula_concurrency::Execute;
use std::thread;
use std::time::Duration;

/// Mixed into a worker seed so delays and target picks use separate streams
const DELAY_STREAM: u64 = 0x9E37_79B9_7F4A_7C15;

/// Increment with a seeded, bounded, random latency
#[derive(Debug, Clone)]
pub struct SimulatedWork {
    rng: StdRng,
    min_ms: u64,
    max_ms: u64,
    executions: u64,
}

impl SimulatedWork {
    /// Create work with latency in `[min, max]` (inclusive), seeded by `seed`
    ///
    /// An inverted range is treated as the single value `min`.
    pub fn new(seed: u64, min: Duration, max: Duration) -> Self {
        let min_ms = min.as_millis() as u64;
        let max_ms = (max.as_millis() as u64).max(min_ms);
        Self {
            rng: StdRng::seed_from_u64(seed ^ DELAY_STREAM),
            min_ms,
            max_ms,
            executions: 0,
        }
    }

    /// Work with no latency
    pub fn instant() -> Self {
        Self::new(0, Duration::ZERO, Duration::ZERO)
    }

    /// Draw the next simulated latency
    pub fn next_delay(&mut self) -> Duration {
        if self.min_ms == self.max_ms {
            return Duration::from_millis(self.min_ms);
        }
        Duration::from_millis(self.rng.gen_range(self.min_ms..=self.max_ms))
    }

    /// Number of EXECUTE phases performed
    pub fn executions(&self) -> u64 {
        self.executions
    }
}

impl Execute for SimulatedWork {
    fn execute(&mut self, local_value: i64) -> i64 {
        let delay = self.next_delay();
        if !delay.is_zero() {
            thread::sleep(delay);
        }
        self.executions += 1;
        local_value.wrapping_add(1)
    }
}
