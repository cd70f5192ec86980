//! Dispatch engine: jobs, tasks, workers, the idle-worker registry and the
//! dispatcher that ties them together.

pub mod audit;
pub mod dispatcher;
pub mod error;
pub mod job;
pub mod registry;
pub mod stats;
pub mod task;
pub mod worker;

pub use audit::{build_audit_event, AuditAction, AuditEvent, AuditSink, InMemoryAuditSink};
pub use dispatcher::{Dispatcher, ShutdownReport};
pub use error::{AppResult, DispatchError, JobError, TaskError};
pub use job::Job;
pub use registry::{Inbox, WorkerRegistry};
pub use stats::DispatcherStats;
pub use task::{fibonacci, Fibonacci, Task};
pub use worker::{Worker, WorkerHandle};
