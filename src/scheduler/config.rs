//! Pool scheduler configuration.
//!
//! # Configuration Precedence
//!
//! Settings are resolved in this order (highest priority first):
//!
//! 1. **Programmatic**: values set via builder methods (`worker_threads(4)`)
//! 2. **Environment variables**: `PUSHFLOW_POOL_*`
//! 3. **Defaults**: [`PoolConfig::default()`]
//!
//! # Supported Environment Variables
//!
//! | Variable | Type | Maps to |
//! |----------|------|---------|
//! | `PUSHFLOW_POOL_WORKERS` | `usize` | `worker_threads` |
//! | `PUSHFLOW_POOL_THREAD_NAME_PREFIX` | `String` | `thread_name_prefix` |
//! | `PUSHFLOW_POOL_IDLE_TIMEOUT_MS` | `u64` | `idle_timeout` |

use crate::error::{Error, Result};
use std::time::Duration;

/// Environment variable name for worker thread count.
pub const ENV_POOL_WORKERS: &str = "PUSHFLOW_POOL_WORKERS";
/// Environment variable name for worker thread name prefix.
pub const ENV_POOL_THREAD_NAME_PREFIX: &str = "PUSHFLOW_POOL_THREAD_NAME_PREFIX";
/// Environment variable name for the idle wait between timer checks.
pub const ENV_POOL_IDLE_TIMEOUT_MS: &str = "PUSHFLOW_POOL_IDLE_TIMEOUT_MS";

/// Configuration for [`PoolScheduler`](super::PoolScheduler).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Number of worker threads.
    pub worker_threads: usize,
    /// Prefix for worker thread names.
    pub thread_name_prefix: String,
    /// Upper bound on how long an idle worker parks before rechecking.
    pub idle_timeout: Duration,
    env_allowed: [bool; 3],
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            worker_threads: std::thread::available_parallelism()
                .map_or(4, std::num::NonZeroUsize::get),
            thread_name_prefix: "pushflow".to_string(),
            idle_timeout: Duration::from_millis(100),
            env_allowed: [true; 3],
        }
    }
}

impl PoolConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the worker count. Programmatic values win over the environment.
    #[must_use]
    pub fn worker_threads(mut self, count: usize) -> Self {
        self.worker_threads = count;
        self.env_allowed[0] = false;
        self
    }

    /// Sets the worker thread name prefix.
    #[must_use]
    pub fn thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self.env_allowed[1] = false;
        self
    }

    /// Sets the idle park timeout.
    #[must_use]
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self.env_allowed[2] = false;
        self
    }

    /// Applies `PUSHFLOW_POOL_*` overrides to fields not set programmatically.
    ///
    /// Unset variables are ignored; a set but unparseable variable is an
    /// `InvalidConfig` error.
    pub fn apply_env_overrides(mut self) -> Result<Self> {
        self.apply_overrides(read_env)?;
        Ok(self)
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if self.env_allowed[0] {
            if let Some(val) = lookup(ENV_POOL_WORKERS) {
                self.worker_threads = parse_usize(ENV_POOL_WORKERS, &val)?;
            }
        }
        if self.env_allowed[1] {
            if let Some(val) = lookup(ENV_POOL_THREAD_NAME_PREFIX) {
                self.thread_name_prefix = val;
            }
        }
        if self.env_allowed[2] {
            if let Some(val) = lookup(ENV_POOL_IDLE_TIMEOUT_MS) {
                self.idle_timeout = Duration::from_millis(parse_u64(ENV_POOL_IDLE_TIMEOUT_MS, &val)?);
            }
        }
        Ok(())
    }

    /// Checks the configuration for values the pool cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.worker_threads == 0 {
            return Err(Error::invalid_config("worker_threads must be at least 1"));
        }
        if self.idle_timeout.is_zero() {
            return Err(Error::invalid_config("idle_timeout must be non-zero"));
        }
        Ok(())
    }
}

/// Read an environment variable, returning `None` if unset.
fn read_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn parse_usize(var_name: &str, val: &str) -> Result<usize> {
    val.trim().parse::<usize>().map_err(|e| {
        Error::invalid_config(format!(
            "invalid value for {var_name}: expected unsigned integer, got {val:?} ({e})"
        ))
    })
}

fn parse_u64(var_name: &str, val: &str) -> Result<u64> {
    val.trim().parse::<u64>().map_err(|e| {
        Error::invalid_config(format!(
            "invalid value for {var_name}: expected u64, got {val:?} ({e})"
        ))
    })
}
