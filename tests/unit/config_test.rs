//! Tests for configuration validation

use prometheus_dispatcher::config::{DispatcherConfig, HandoffPolicy, ServerConfig};

#[test]
fn test_default_config_is_valid() {
    let cfg = DispatcherConfig::new();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.worker_count, 4);
    assert_eq!(cfg.max_queue_depth, 20);
    assert_eq!(cfg.handoff, HandoffPolicy::Fifo);
}

#[test]
fn test_invalid_worker_count() {
    let cfg = DispatcherConfig::new().with_worker_count(0);
    assert!(cfg.validate().is_err());
}

#[test]
fn test_invalid_queue_depth() {
    let cfg = DispatcherConfig::new().with_max_queue_depth(0);
    assert!(cfg.validate().is_err());
}

#[test]
fn test_invalid_handoffs() {
    let cfg = DispatcherConfig::new().with_handoff(HandoffPolicy::Concurrent { handoffs: 0 });
    assert!(cfg.validate().is_err());
}

#[test]
fn test_invalid_shutdown_timeout() {
    let cfg = DispatcherConfig::new().with_shutdown_timeout_secs(0);
    assert!(cfg.validate().is_err());
}

#[test]
fn test_config_from_json() {
    let json = r#"{
        "worker_count": 8,
        "max_queue_depth": 100,
        "handoff": { "mode": "concurrent", "handoffs": 2 },
        "shutdown_timeout_secs": 5
    }"#;

    let cfg = DispatcherConfig::from_json_str(json).unwrap();
    assert_eq!(cfg.worker_count, 8);
    assert_eq!(cfg.max_queue_depth, 100);
    assert_eq!(cfg.handoff, HandoffPolicy::Concurrent { handoffs: 2 });
    assert_eq!(cfg.shutdown_timeout().as_secs(), 5);
    // Omitted fields fall back to defaults.
    assert_eq!(cfg.thread_stack_size, DispatcherConfig::new().thread_stack_size);
}

#[test]
fn test_config_from_json_fifo() {
    let cfg = DispatcherConfig::from_json_str(r#"{ "handoff": { "mode": "fifo" } }"#).unwrap();
    assert_eq!(cfg.handoff, HandoffPolicy::Fifo);
}

#[test]
fn test_config_from_json_rejects_invalid() {
    assert!(DispatcherConfig::from_json_str(r#"{ "worker_count": 0 }"#).is_err());
    assert!(DispatcherConfig::from_json_str("not json").is_err());
}

#[test]
fn test_server_config_default() {
    let cfg = ServerConfig::default();
    assert_eq!(cfg.host, "0.0.0.0");
    assert_eq!(cfg.port, 8081);
}
