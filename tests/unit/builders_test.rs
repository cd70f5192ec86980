//! Tests for dispatcher builders

use std::sync::Arc;

use prometheus_dispatcher::builders::build_dispatcher;
use prometheus_dispatcher::config::DispatcherConfig;
use prometheus_dispatcher::core::{DispatchError, Fibonacci, InMemoryAuditSink};

#[test]
fn test_build_dispatcher_starts_pool() {
    let cfg = DispatcherConfig::new().with_worker_count(2);
    let sink = InMemoryAuditSink::new(16);
    let dispatcher = build_dispatcher(&cfg, Fibonacci::new(), Some(Arc::new(sink))).unwrap();

    assert_eq!(dispatcher.pool_size(), 2);
    assert!(matches!(dispatcher.run(), Err(DispatchError::AlreadyRunning)));

    let report = dispatcher.shutdown();
    assert_eq!(report.workers_stopped, 2);
}

#[test]
fn test_build_dispatcher_rejects_invalid_config() {
    let cfg = DispatcherConfig::new().with_max_queue_depth(0);
    let result = build_dispatcher(&cfg, Fibonacci::new(), None);
    assert!(matches!(result, Err(DispatchError::InvalidConfig(_))));
}
