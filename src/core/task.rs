//! The pluggable computation a worker runs for each job.

use std::fmt;

use async_trait::async_trait;

use super::TaskError;

/// Computation executed by a worker with a job's argument.
///
/// The task is injected when the dispatcher is built and cloned into every
/// worker, so it must be cheap to clone (share heavy state behind an `Arc`).
///
/// # Example
///
/// ```rust,ignore
/// use async_trait::async_trait;
/// use prometheus_dispatcher::core::{Task, TaskError};
///
/// #[derive(Clone)]
/// struct Square;
///
/// #[async_trait]
/// impl Task for Square {
///     type Output = i64;
///
///     async fn run(&self, argument: i64) -> Result<i64, TaskError> {
///         argument
///             .checked_mul(argument)
///             .ok_or_else(|| TaskError::Failed("overflow".into()))
///     }
/// }
/// ```
///
/// # Threading
///
/// `run` is driven by the worker thread's own single-threaded tokio runtime,
/// so CPU-bound work here never stalls the runtime serving submissions.
#[async_trait]
pub trait Task: Send + Sync + Clone + 'static {
    /// Value produced on success.
    type Output: Send + fmt::Debug + 'static;

    /// Run the computation for one job argument.
    async fn run(&self, argument: i64) -> Result<Self::Output, TaskError>;
}

/// Fibonacci number task.
///
/// Computed iteratively with an explicit input ceiling, so a single job costs
/// at most [`Fibonacci::MAX_ARGUMENT`] additions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fibonacci {
    max_argument: i64,
}

impl Fibonacci {
    /// Largest `n` for which `fib(n)` fits in a `u64`.
    pub const MAX_ARGUMENT: i64 = 93;

    /// Task accepting every argument up to [`Self::MAX_ARGUMENT`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_argument: Self::MAX_ARGUMENT,
        }
    }

    /// Task with a lower ceiling; values above [`Self::MAX_ARGUMENT`] are clamped.
    #[must_use]
    pub const fn with_max_argument(max_argument: i64) -> Self {
        let max_argument = if max_argument > Self::MAX_ARGUMENT {
            Self::MAX_ARGUMENT
        } else {
            max_argument
        };
        Self { max_argument }
    }

    /// Configured ceiling.
    #[must_use]
    pub const fn max_argument(&self) -> i64 {
        self.max_argument
    }
}

impl Default for Fibonacci {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterative `fib(n)` with `fib(0) = 0`, `fib(1) = 1`.
///
/// Callers must keep `n <= 93`; larger values wrap.
#[must_use]
pub const fn fibonacci(n: u32) -> u64 {
    let mut previous: u64 = 0;
    let mut current: u64 = 1;
    if n == 0 {
        return 0;
    }
    let mut i = 1;
    while i < n {
        let next = previous.wrapping_add(current);
        previous = current;
        current = next;
        i += 1;
    }
    current
}

#[async_trait]
impl Task for Fibonacci {
    type Output = u64;

    async fn run(&self, argument: i64) -> Result<u64, TaskError> {
        if argument < 0 {
            return Err(TaskError::NegativeArgument(argument));
        }
        if argument > self.max_argument {
            return Err(TaskError::ArgumentTooLarge {
                argument,
                max: self.max_argument,
            });
        }
        let n = u32::try_from(argument).map_err(|e| TaskError::Failed(e.to_string()))?;
        Ok(fibonacci(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fibonacci_sequence() {
        let expected = [0, 1, 1, 2, 3, 5, 8, 13, 21, 34, 55];
        for (n, want) in expected.iter().enumerate() {
            assert_eq!(fibonacci(n as u32), *want);
        }
        assert_eq!(fibonacci(93), 12_200_160_415_121_876_738);
    }

    #[tokio::test]
    async fn test_fibonacci_task_bounds() {
        let task = Fibonacci::new();
        assert_eq!(task.run(10).await, Ok(55));
        assert_eq!(task.run(-1).await, Err(TaskError::NegativeArgument(-1)));
        assert_eq!(
            task.run(94).await,
            Err(TaskError::ArgumentTooLarge {
                argument: 94,
                max: 93
            })
        );
    }

    #[tokio::test]
    async fn test_fibonacci_custom_ceiling() {
        let task = Fibonacci::with_max_argument(20);
        assert_eq!(task.max_argument(), 20);
        assert!(task.run(21).await.is_err());
        assert_eq!(Fibonacci::with_max_argument(500).max_argument(), 93);
    }
}
