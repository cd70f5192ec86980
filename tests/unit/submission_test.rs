//! Tests for submission parsing

use prometheus_dispatcher::runtime::{SubmissionError, SubmissionForm};

fn form(name: &str, delay: &str, value: &str) -> SubmissionForm {
    SubmissionForm {
        name: Some(name.to_string()),
        delay: Some(delay.to_string()),
        value: Some(value.to_string()),
    }
}

#[test]
fn test_invalid_delay() {
    assert_eq!(
        form("a", "notaduration", "10").into_job(),
        Err(SubmissionError::InvalidDelay)
    );
}

#[test]
fn test_overflowing_delay_is_invalid() {
    assert_eq!(
        form("a", "94522879700260684295381835.9h", "10").into_job(),
        Err(SubmissionError::InvalidDelay)
    );
}

#[test]
fn test_invalid_value() {
    assert_eq!(
        form("a", "10ms", "abc").into_job(),
        Err(SubmissionError::InvalidValue)
    );
}

#[test]
fn test_empty_name() {
    assert_eq!(
        form("", "10ms", "10").into_job(),
        Err(SubmissionError::InvalidName)
    );
}

#[test]
fn test_negative_value_is_accepted_at_the_boundary() {
    let job = form("neg", "0", "-7").into_job().unwrap();
    assert_eq!(job.argument(), -7);
}

#[test]
fn test_error_messages() {
    assert_eq!(SubmissionError::InvalidDelay.to_string(), "Invalid delay");
    assert_eq!(SubmissionError::InvalidValue.to_string(), "Invalid value");
    assert_eq!(SubmissionError::InvalidName.to_string(), "Invalid name");
}
