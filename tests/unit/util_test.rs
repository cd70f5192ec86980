//! Tests for utility functions

use std::time::Duration;

use prometheus_dispatcher::util::{
    init_tracing, now_ms, parse_duration, DurationParseError, DEFAULT_LOG_FILTER,
};

#[test]
fn test_parse_duration_examples() {
    assert_eq!(parse_duration("10ms"), Ok(Duration::from_millis(10)));
    assert_eq!(parse_duration("2h45m"), Ok(Duration::from_secs(9900)));
    assert_eq!(parse_duration("1.5h"), Ok(Duration::from_secs(5400)));
}

#[test]
fn test_parse_duration_rejects_garbage() {
    assert!(parse_duration("notaduration").is_err());
    assert!(matches!(
        parse_duration("-5ms"),
        Err(DurationParseError::Negative(_))
    ));
}

#[test]
fn test_now_ms_is_monotonic_enough() {
    let a = now_ms();
    let b = now_ms();
    assert!(b >= a);
}

#[test]
fn test_init_tracing_is_idempotent() {
    init_tracing();
    init_tracing();
    assert!(tracing::dispatcher::has_been_set());
}

#[test]
fn test_default_log_filter_names_crate() {
    assert!(DEFAULT_LOG_FILTER.contains("prometheus_dispatcher="));
}
