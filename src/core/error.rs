//! Error types for dispatcher operations.

use thiserror::Error;

/// Errors produced by the dispatcher, its workers and its registry.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The job queue is full (only from non-blocking submission).
    #[error("job queue is full")]
    QueueFull,
    /// A bounded wait expired.
    #[error("operation timed out")]
    Timeout,
    /// The dispatcher no longer accepts jobs.
    #[error("dispatcher is shutting down")]
    ShuttingDown,
    /// `run` was called on a dispatcher that is already running.
    #[error("dispatcher is already running")]
    AlreadyRunning,
    /// Configuration validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A worker or handoff thread could not be spawned.
    #[error("failed to spawn thread: {0}")]
    Spawn(#[from] std::io::Error),
    /// Internal channel failure with context.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Errors raised when constructing a [`Job`](crate::core::Job).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobError {
    /// Jobs must carry a non-empty name.
    #[error("job name must not be empty")]
    EmptyName,
}

/// Errors reported by a [`Task`](crate::core::Task) implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    /// The argument is below the task's domain.
    #[error("argument {0} is negative")]
    NegativeArgument(i64),
    /// The argument exceeds the task's configured ceiling.
    #[error("argument {argument} exceeds maximum {max}")]
    ArgumentTooLarge {
        /// Submitted argument.
        argument: i64,
        /// Largest accepted argument.
        max: i64,
    },
    /// Task-specific failure.
    #[error("task failed: {0}")]
    Failed(String),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
