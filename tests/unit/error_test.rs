//! Tests for error types

use prometheus_dispatcher::core::{DispatchError, JobError, TaskError};

#[test]
fn test_queue_full_error() {
    let err = DispatchError::QueueFull;
    assert_eq!(format!("{}", err), "job queue is full");
}

#[test]
fn test_shutting_down_error() {
    let err = DispatchError::ShuttingDown;
    assert_eq!(format!("{}", err), "dispatcher is shutting down");
}

#[test]
fn test_invalid_config_error() {
    let err = DispatchError::InvalidConfig("worker_count must be greater than 0".to_string());
    assert_eq!(
        format!("{}", err),
        "invalid configuration: worker_count must be greater than 0"
    );
}

#[test]
fn test_spawn_error_from_io() {
    let io = std::io::Error::other("no threads left");
    let err: DispatchError = io.into();
    assert_eq!(format!("{}", err), "failed to spawn thread: no threads left");
}

#[test]
fn test_job_error() {
    assert_eq!(format!("{}", JobError::EmptyName), "job name must not be empty");
}

#[test]
fn test_task_errors() {
    assert_eq!(
        format!("{}", TaskError::NegativeArgument(-3)),
        "argument -3 is negative"
    );
    assert_eq!(
        format!(
            "{}",
            TaskError::ArgumentTooLarge {
                argument: 100,
                max: 93
            }
        ),
        "argument 100 exceeds maximum 93"
    );
}
