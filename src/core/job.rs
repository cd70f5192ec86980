//! The unit of work handed from the queue to a worker.

use std::time::Duration;

use serde::Serialize;

use super::JobError;

/// One submitted unit of work. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Job {
    name: String,
    delay: Duration,
    argument: i64,
}

impl Job {
    /// Build a job.
    ///
    /// `delay` is applied by the worker after the task finishes, pacing how
    /// soon the worker becomes available again.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::EmptyName`] if `name` is empty.
    pub fn new(name: impl Into<String>, delay: Duration, argument: i64) -> Result<Self, JobError> {
        let name = name.into();
        if name.is_empty() {
            return Err(JobError::EmptyName);
        }
        Ok(Self {
            name,
            delay,
            argument,
        })
    }

    /// Identifying name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Pacing delay applied after execution.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Argument passed to the task.
    #[must_use]
    pub const fn argument(&self) -> i64 {
        self.argument
    }
}
