//! Turning raw submission fields into jobs.

use serde::Deserialize;
use thiserror::Error;

use crate::core::Job;
use crate::util::duration::parse_duration;

/// Reasons a submission is refused before anything is enqueued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmissionError {
    /// `delay` is missing or not a non-negative duration.
    #[error("Invalid delay")]
    InvalidDelay,
    /// `value` is missing or not an integer.
    #[error("Invalid value")]
    InvalidValue,
    /// `name` is missing or empty.
    #[error("Invalid name")]
    InvalidName,
}

/// Raw submission fields as received from a form body or query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SubmissionForm {
    /// Job name.
    pub name: Option<String>,
    /// Delay as a duration string, e.g. `"10ms"`.
    pub delay: Option<String>,
    /// Integer argument.
    pub value: Option<String>,
}

impl SubmissionForm {
    /// Fill fields missing from `self` with those of `fallback`.
    #[must_use]
    pub fn or(self, fallback: Self) -> Self {
        Self {
            name: self.name.or(fallback.name),
            delay: self.delay.or(fallback.delay),
            value: self.value.or(fallback.value),
        }
    }

    /// Validate the fields and build a job.
    ///
    /// Fields are checked in the order `delay`, `value`, `name`; the first
    /// failure is reported.
    ///
    /// # Errors
    ///
    /// Returns the [`SubmissionError`] for the first invalid field.
    pub fn into_job(self) -> Result<Job, SubmissionError> {
        let delay = parse_duration(self.delay.as_deref().unwrap_or_default())
            .map_err(|_| SubmissionError::InvalidDelay)?;
        let value: i64 = self
            .value
            .as_deref()
            .unwrap_or_default()
            .parse()
            .map_err(|_| SubmissionError::InvalidValue)?;
        let name = self.name.unwrap_or_default();
        Job::new(name, delay, value).map_err(|_| SubmissionError::InvalidName)
    }
}
