//! Dispatcher pool configuration.

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How queued jobs are paired with idle workers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum HandoffPolicy {
    /// A single handoff loop: jobs are paired with workers in submission order.
    #[default]
    Fifo,
    /// A bounded pool of handoff loops: lower latency, unordered pairing.
    Concurrent {
        /// Number of handoff loops.
        handoffs: usize,
    },
}

impl HandoffPolicy {
    /// Number of handoff threads this policy runs.
    #[must_use]
    pub const fn handoff_threads(&self) -> usize {
        match self {
            Self::Fifo => 1,
            Self::Concurrent { handoffs } => *handoffs,
        }
    }
}

/// Dispatcher configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Number of workers (pool size).
    pub worker_count: usize,
    /// Capacity of the job queue; submissions block once it is full.
    pub max_queue_depth: usize,
    /// Job-to-worker pairing policy.
    pub handoff: HandoffPolicy,
    /// Stack size for worker threads, in bytes.
    pub thread_stack_size: usize,
    /// Upper bound on each shutdown phase, in seconds.
    pub shutdown_timeout_secs: u64,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            worker_count: 4,
            max_queue_depth: 20,
            handoff: HandoffPolicy::Fifo,
            thread_stack_size: 2 * 1024 * 1024,
            shutdown_timeout_secs: 30,
        }
    }
}

impl DispatcherConfig {
    /// Default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Default configuration with one worker per logical CPU.
    #[must_use]
    pub fn for_host() -> Self {
        Self::default().with_worker_count(num_cpus::get().max(1))
    }

    /// Set the number of workers.
    #[must_use]
    pub const fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    /// Set the job queue capacity.
    #[must_use]
    pub const fn with_max_queue_depth(mut self, max_queue_depth: usize) -> Self {
        self.max_queue_depth = max_queue_depth;
        self
    }

    /// Set the handoff policy.
    #[must_use]
    pub const fn with_handoff(mut self, handoff: HandoffPolicy) -> Self {
        self.handoff = handoff;
        self
    }

    /// Set the worker thread stack size.
    #[must_use]
    pub const fn with_thread_stack_size(mut self, thread_stack_size: usize) -> Self {
        self.thread_stack_size = thread_stack_size;
        self
    }

    /// Set the shutdown timeout in seconds.
    #[must_use]
    pub const fn with_shutdown_timeout_secs(mut self, secs: u64) -> Self {
        self.shutdown_timeout_secs = secs;
        self
    }

    /// Shutdown timeout as a [`Duration`].
    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.worker_count == 0 {
            return Err("worker_count must be greater than 0".into());
        }
        if self.max_queue_depth == 0 {
            return Err("max_queue_depth must be greater than 0".into());
        }
        if self.handoff.handoff_threads() == 0 {
            return Err("handoffs must be greater than 0".into());
        }
        if self.thread_stack_size == 0 {
            return Err("thread_stack_size must be greater than 0".into());
        }
        if self.shutdown_timeout_secs == 0 {
            return Err("shutdown_timeout_secs must be greater than 0".into());
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// Returns a message if the JSON is malformed or the values are invalid.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Build configuration from `DISPATCH_*` environment variables, falling
    /// back to defaults for unset ones.
    ///
    /// `DISPATCH_HANDOFFS` greater than one selects [`HandoffPolicy::Concurrent`].
    ///
    /// # Errors
    ///
    /// Returns a message if a variable does not parse or the result is invalid.
    pub fn from_env() -> Result<Self, String> {
        let mut cfg = Self::default();
        if let Some(workers) = env_parse("DISPATCH_WORKERS")? {
            cfg.worker_count = workers;
        }
        if let Some(depth) = env_parse("DISPATCH_QUEUE_DEPTH")? {
            cfg.max_queue_depth = depth;
        }
        if let Some(handoffs) = env_parse::<usize>("DISPATCH_HANDOFFS")? {
            cfg.handoff = if handoffs > 1 {
                HandoffPolicy::Concurrent { handoffs }
            } else {
                HandoffPolicy::Fifo
            };
        }
        if let Some(secs) = env_parse("DISPATCH_SHUTDOWN_TIMEOUT_SECS")? {
            cfg.shutdown_timeout_secs = secs;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

/// Read and parse an environment variable; `Ok(None)` when it is unset.
pub(crate) fn env_parse<T: FromStr>(key: &str) -> Result<Option<T>, String> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| format!("{key} has invalid value `{raw}`")),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(format!("{key}: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handoff_threads() {
        assert_eq!(HandoffPolicy::Fifo.handoff_threads(), 1);
        assert_eq!(HandoffPolicy::Concurrent { handoffs: 3 }.handoff_threads(), 3);
    }

    #[test]
    fn test_for_host_has_workers() {
        assert!(DispatcherConfig::for_host().worker_count >= 1);
    }

    #[test]
    fn test_env_parse_unset_variable() {
        let value: Option<usize> = env_parse("PROMETHEUS_DISPATCHER_SURELY_UNSET_VAR").unwrap();
        assert!(value.is_none());
    }
}
