//! Dispatcher statistics.

use std::sync::atomic::{AtomicU64, Ordering};

/// Statistics about dispatcher utilization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatcherStats {
    /// Number of workers.
    pub worker_count: usize,

    /// Inboxes currently advertised in the registry.
    pub idle_workers: usize,

    /// Workers currently executing a job.
    pub busy_workers: u64,

    /// Jobs waiting in the queue.
    pub queued_jobs: usize,

    /// Total jobs admitted to the queue.
    pub submitted_jobs: u64,

    /// Total jobs delivered to a worker.
    pub dispatched_jobs: u64,

    /// Total jobs whose task succeeded.
    pub completed_jobs: u64,

    /// Total jobs whose task returned an error.
    pub failed_jobs: u64,

    /// Jobs left undelivered when shutdown gave up waiting.
    pub abandoned_jobs: u64,
}

/// Internal counters for dispatcher statistics (thread-safe).
#[derive(Debug, Default)]
pub(crate) struct DispatchCounters {
    pub busy_workers: AtomicU64,
    pub submitted_jobs: AtomicU64,
    pub dispatched_jobs: AtomicU64,
    pub completed_jobs: AtomicU64,
    pub failed_jobs: AtomicU64,
    pub abandoned_jobs: AtomicU64,
}

impl DispatchCounters {
    /// Get a snapshot of the counters; gauges owned by channels are filled in
    /// by the caller.
    pub fn snapshot(&self, worker_count: usize, idle_workers: usize, queued_jobs: usize) -> DispatcherStats {
        DispatcherStats {
            worker_count,
            idle_workers,
            busy_workers: self.busy_workers.load(Ordering::Relaxed),
            queued_jobs,
            submitted_jobs: self.submitted_jobs.load(Ordering::Relaxed),
            dispatched_jobs: self.dispatched_jobs.load(Ordering::Relaxed),
            completed_jobs: self.completed_jobs.load(Ordering::Relaxed),
            failed_jobs: self.failed_jobs.load(Ordering::Relaxed),
            abandoned_jobs: self.abandoned_jobs.load(Ordering::Relaxed),
        }
    }
}
