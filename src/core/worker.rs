//! Worker threads.
//!
//! A worker loops through three states:
//!
//! - **Idle**: its inbox is published in the [`WorkerRegistry`] and it waits
//!   for either a job or a stop request.
//! - **Busy**: it runs the task with the job's argument, then sleeps for the
//!   job's delay. Stop requests are not observed here; the job always finishes.
//! - **Stopped**: it left the loop for good.
//!
//! Each worker runs on a dedicated OS thread with its own single-threaded tokio
//! runtime, so task work never blocks the runtime that accepts submissions.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, select, Receiver, Sender, TryRecvError};
use tracing::{debug, error, info, warn};

use super::audit::{build_audit_event, AuditAction, AuditSink};
use super::registry::{Inbox, WorkerRegistry};
use super::stats::DispatchCounters;
use super::{DispatchError, Job, Task};
use crate::util::join::{join_with_timeout, JoinOutcome};

/// A worker that has not been started yet.
pub struct Worker<T: Task> {
    id: usize,
    inbox: Inbox,
    jobs: Receiver<Job>,
    registry: WorkerRegistry,
    task: T,
    counters: Arc<DispatchCounters>,
    audit: Option<Arc<dyn AuditSink>>,
}

impl<T: Task> Worker<T> {
    /// Create worker `id` that advertises itself in `registry` and runs `task`.
    #[must_use]
    pub fn new(id: usize, registry: WorkerRegistry, task: T) -> Self {
        let (inbox, jobs) = Inbox::new(id);
        Self {
            id,
            inbox,
            jobs,
            registry,
            task,
            counters: Arc::new(DispatchCounters::default()),
            audit: None,
        }
    }

    /// Attach an audit sink.
    #[must_use]
    pub fn with_audit(mut self, audit: Option<Arc<dyn AuditSink>>) -> Self {
        self.audit = audit;
        self
    }

    pub(crate) fn with_counters(mut self, counters: Arc<DispatchCounters>) -> Self {
        self.counters = counters;
        self
    }

    /// Worker identifier.
    #[must_use]
    pub const fn id(&self) -> usize {
        self.id
    }

    /// Start the worker loop on its own thread.
    ///
    /// Consumes the worker, so a loop can only be started once.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Spawn`] if the thread cannot be created.
    pub fn start(self, stack_size: usize) -> Result<WorkerHandle, DispatchError> {
        let id = self.id;
        let (stop_tx, stop_rx) = bounded(1);
        let join = thread::Builder::new()
            .name(format!("pd-worker-{id}"))
            .stack_size(stack_size)
            .spawn(move || self.run(&stop_rx))?;
        Ok(WorkerHandle {
            id,
            stop_tx,
            join: Some(join),
        })
    }

    fn run(self, stop_rx: &Receiver<()>) {
        debug!(worker_id = self.id, "Worker thread started");

        let rt = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => {
                error!(worker_id = self.id, error = %e, "Failed to create worker runtime");
                return;
            }
        };

        loop {
            // Stop requests that arrived while busy are honoured here, before
            // the worker is published again.
            match stop_rx.try_recv() {
                Ok(()) | Err(TryRecvError::Disconnected) => break,
                Err(TryRecvError::Empty) => {}
            }

            if let Err(e) = self.registry.advertise(self.inbox.clone()) {
                error!(worker_id = self.id, error = %e, "Worker could not advertise itself");
                break;
            }

            select! {
                recv(self.jobs) -> msg => match msg {
                    Ok(job) => self.execute(&rt, &job),
                    Err(_) => break,
                },
                recv(stop_rx) -> _ => break,
            }
        }

        info!(worker_id = self.id, "Worker stopped");
        self.record_event(None, AuditAction::WorkerStopped, None);
    }

    fn execute(&self, rt: &tokio::runtime::Runtime, job: &Job) {
        self.counters.busy_workers.fetch_add(1, Ordering::Relaxed);
        info!(
            worker_id = self.id,
            job = job.name(),
            argument = job.argument(),
            "Worker started job"
        );
        self.record_event(Some(job.name()), AuditAction::Started, None);

        let outcome = rt.block_on(async {
            let outcome = self.task.run(job.argument()).await;
            tokio::time::sleep(job.delay()).await;
            outcome
        });

        match outcome {
            Ok(result) => {
                info!(
                    worker_id = self.id,
                    job = job.name(),
                    result = ?result,
                    "Worker finished job"
                );
                self.record_event(
                    Some(job.name()),
                    AuditAction::Completed,
                    Some(format!("{result:?}")),
                );
                self.counters.completed_jobs.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                warn!(worker_id = self.id, job = job.name(), error = %e, "Job failed");
                self.record_event(Some(job.name()), AuditAction::Failed, Some(e.to_string()));
                self.counters.failed_jobs.fetch_add(1, Ordering::Relaxed);
            }
        }

        self.counters.busy_workers.fetch_sub(1, Ordering::Relaxed);
    }

    fn record_event(&self, job_name: Option<&str>, action: AuditAction, detail: Option<String>) {
        if let Some(sink) = &self.audit {
            sink.record(build_audit_event(self.id, job_name, action, detail));
        }
    }
}

/// Control handle of a running worker.
///
/// Dropping the handle also asks the worker to stop, without waiting.
#[derive(Debug)]
pub struct WorkerHandle {
    id: usize,
    stop_tx: Sender<()>,
    join: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    /// Worker identifier.
    #[must_use]
    pub const fn id(&self) -> usize {
        self.id
    }

    /// Ask the worker to stop. Returns immediately; an idle worker stops at
    /// once, a busy one after its current job. Repeated calls are no-ops.
    pub fn stop(&self) {
        let _ = self.stop_tx.try_send(());
    }

    /// Whether the worker thread has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.join.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Wait for the worker thread to exit.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Internal`] if the worker thread panicked.
    pub fn join(mut self) -> Result<(), DispatchError> {
        match self.join.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| DispatchError::Internal(format!("worker {} panicked", self.id))),
            None => Ok(()),
        }
    }

    /// Wait up to `timeout` for the worker thread to exit.
    pub fn join_timeout(mut self, timeout: Duration) -> JoinOutcome {
        match self.join.take() {
            Some(handle) => join_with_timeout(handle, timeout),
            None => JoinOutcome::Joined,
        }
    }
}
