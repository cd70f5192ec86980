//! Tests for the audit sink

use prometheus_dispatcher::core::{build_audit_event, AuditAction, AuditSink, InMemoryAuditSink};

#[test]
fn test_in_memory_audit_sink_records_events() {
    let sink = InMemoryAuditSink::new(10);
    assert!(sink.is_empty());

    sink.record(build_audit_event(0, Some("a"), AuditAction::Started, None));
    sink.record(build_audit_event(
        0,
        Some("a"),
        AuditAction::Completed,
        Some("55".into()),
    ));

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].action, AuditAction::Started);
    assert_eq!(events[1].detail.as_deref(), Some("55"));
}

#[test]
fn test_in_memory_audit_sink_is_bounded() {
    let sink = InMemoryAuditSink::new(2);
    for worker_id in 0..3 {
        sink.record(build_audit_event(worker_id, None, AuditAction::WorkerStopped, None));
    }

    let events = sink.events();
    assert_eq!(events.len(), 2);
    // Oldest event evicted first.
    assert_eq!(events[0].worker_id, 1);
    assert_eq!(events[1].worker_id, 2);
}

#[test]
fn test_clones_share_buffer() {
    let sink = InMemoryAuditSink::new(4);
    let handle = sink.clone();
    sink.record(build_audit_event(1, Some("x"), AuditAction::Failed, Some("boom".into())));
    assert_eq!(handle.len(), 1);
    assert_eq!(handle.events_with(AuditAction::Failed).len(), 1);
    assert!(handle.events_with(AuditAction::Completed).is_empty());
}

#[test]
fn test_build_audit_event_fields() {
    let a = build_audit_event(3, Some("job"), AuditAction::Started, None);
    let b = build_audit_event(3, Some("job"), AuditAction::Started, None);
    assert_eq!(a.worker_id, 3);
    assert_eq!(a.job_name.as_deref(), Some("job"));
    assert!(a.created_at_ms > 0);
    assert_ne!(a.event_id, b.event_id);
}

#[test]
fn test_audit_action_serializes_snake_case() {
    let json = serde_json::to_string(&AuditAction::WorkerStopped).unwrap();
    assert_eq!(json, "\"worker_stopped\"");
}
