//! The dispatcher: a bounded job queue drained into a fixed pool of workers.
//!
//! # Design
//!
//! - **Backpressure, not rejection**: `submit` blocks while the queue is full.
//! - **No polling**: handoff loops block on the queue, then on the registry.
//! - **Explicit pairing policy**: one handoff loop pairs jobs with workers in
//!   submission order; several loops trade that order for latency.
//! - **Two-phase shutdown**: admission closes first, the queue drains into the
//!   workers, then every worker is stopped and joined.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{
    bounded, select, Receiver, SendError, SendTimeoutError, Sender, TrySendError,
};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::config::DispatcherConfig;
use crate::util::join::{join_with_timeout, JoinOutcome};

use super::audit::AuditSink;
use super::registry::WorkerRegistry;
use super::stats::{DispatchCounters, DispatcherStats};
use super::worker::{Worker, WorkerHandle};
use super::{DispatchError, Job, Task};

/// Summary of a completed [`Dispatcher::shutdown`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Whether every queued job reached a worker before the timeout.
    pub drained: bool,
    /// Workers that reached the stopped state and were joined.
    pub workers_stopped: usize,
    /// Workers that panicked or did not stop in time.
    pub workers_detached: usize,
    /// Jobs that were never delivered to a worker.
    pub jobs_abandoned: u64,
}

/// Bounded-concurrency job dispatcher.
///
/// Jobs enter a bounded FIFO queue; handoff loops take each job, wait for an
/// idle worker in the [`WorkerRegistry`], and deliver the job to that worker.
/// At most `worker_count` jobs execute at any time.
pub struct Dispatcher<T: Task> {
    /// Dispatcher configuration.
    config: DispatcherConfig,

    /// Task cloned into every worker.
    task: T,

    /// Queue sender. `None` once admission has closed.
    job_tx: Mutex<Option<Sender<Job>>>,

    /// Queue receiver, cloned into each handoff loop.
    job_rx: Receiver<Job>,

    /// Idle workers.
    registry: WorkerRegistry,

    /// Dropped to release handoff loops when shutdown gives up waiting.
    abort_tx: Mutex<Option<Sender<()>>>,
    abort_rx: Receiver<()>,

    counters: Arc<DispatchCounters>,
    audit: Option<Arc<dyn AuditSink>>,

    running: AtomicBool,
    shutdown: AtomicBool,

    workers: Mutex<Vec<WorkerHandle>>,
    handoffs: Mutex<Vec<JoinHandle<()>>>,
}

impl<T: Task> Dispatcher<T> {
    /// Create a dispatcher. No threads are started until [`Self::run`].
    ///
    /// Jobs may be submitted before `run`; they wait in the queue.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidConfig`] if the configuration is invalid.
    pub fn new(config: DispatcherConfig, task: T) -> Result<Self, DispatchError> {
        config.validate().map_err(DispatchError::InvalidConfig)?;

        let (job_tx, job_rx) = bounded(config.max_queue_depth);
        let (abort_tx, abort_rx) = bounded(0);
        let registry = WorkerRegistry::new(config.worker_count);

        Ok(Self {
            config,
            task,
            job_tx: Mutex::new(Some(job_tx)),
            job_rx,
            registry,
            abort_tx: Mutex::new(Some(abort_tx)),
            abort_rx,
            counters: Arc::new(DispatchCounters::default()),
            audit: None,
            running: AtomicBool::new(false),
            shutdown: AtomicBool::new(false),
            workers: Mutex::new(Vec::new()),
            handoffs: Mutex::new(Vec::new()),
        })
    }

    /// Attach an audit sink that every worker reports to.
    #[must_use]
    pub fn with_audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Dispatcher configuration.
    #[must_use]
    pub const fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Number of workers.
    #[must_use]
    pub const fn pool_size(&self) -> usize {
        self.config.worker_count
    }

    /// Start the workers and the handoff loop(s).
    ///
    /// # Errors
    ///
    /// - `DispatchError::AlreadyRunning` if called more than once
    /// - `DispatchError::ShuttingDown` if the dispatcher has been shut down
    /// - `DispatchError::Spawn` if a thread cannot be created
    pub fn run(&self) -> Result<(), DispatchError> {
        if self.shutdown.load(Ordering::Acquire) {
            return Err(DispatchError::ShuttingDown);
        }
        if self.running.swap(true, Ordering::AcqRel) {
            return Err(DispatchError::AlreadyRunning);
        }

        {
            let mut workers = self.workers.lock();
            for worker_id in 0..self.config.worker_count {
                let worker = Worker::new(worker_id, self.registry.clone(), self.task.clone())
                    .with_counters(Arc::clone(&self.counters))
                    .with_audit(self.audit.clone());
                workers.push(worker.start(self.config.thread_stack_size)?);
            }
        }

        {
            let mut handoffs = self.handoffs.lock();
            for handoff_id in 0..self.config.handoff.handoff_threads() {
                let handoff = Handoff {
                    id: handoff_id,
                    jobs: self.job_rx.clone(),
                    registry: self.registry.clone(),
                    abort: self.abort_rx.clone(),
                    counters: Arc::clone(&self.counters),
                };
                let handle = thread::Builder::new()
                    .name(format!("pd-handoff-{handoff_id}"))
                    .spawn(move || handoff.run())?;
                handoffs.push(handle);
            }
        }

        info!(
            worker_count = self.config.worker_count,
            max_queue_depth = self.config.max_queue_depth,
            handoff = ?self.config.handoff,
            "Dispatcher running"
        );
        Ok(())
    }

    fn sender(&self) -> Result<Sender<Job>, DispatchError> {
        if self.shutdown.load(Ordering::Acquire) {
            return Err(DispatchError::ShuttingDown);
        }
        self.job_tx
            .lock()
            .as_ref()
            .cloned()
            .ok_or(DispatchError::ShuttingDown)
    }

    fn admitted(&self, name: &str) {
        record_admission(&self.counters, name);
    }

    /// Enqueue a job, blocking while the queue is full.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::ShuttingDown`] once admission has closed.
    pub fn submit(&self, job: Job) -> Result<(), DispatchError> {
        let tx = self.sender()?;
        let name = job.name().to_string();
        tx.send(job).map_err(|_| DispatchError::ShuttingDown)?;
        self.admitted(&name);
        Ok(())
    }

    /// Enqueue a job without blocking.
    ///
    /// # Errors
    ///
    /// - `DispatchError::QueueFull` if the queue is at capacity
    /// - `DispatchError::ShuttingDown` once admission has closed
    pub fn try_submit(&self, job: Job) -> Result<(), DispatchError> {
        let tx = self.sender()?;
        let name = job.name().to_string();
        match tx.try_send(job) {
            Ok(()) => {
                self.admitted(&name);
                Ok(())
            }
            Err(TrySendError::Full(_)) => {
                warn!(job = %name, "Dispatcher queue is full");
                Err(DispatchError::QueueFull)
            }
            Err(TrySendError::Disconnected(_)) => Err(DispatchError::ShuttingDown),
        }
    }

    /// Enqueue a job, blocking at most `timeout` while the queue is full.
    ///
    /// # Errors
    ///
    /// - `DispatchError::Timeout` if no space freed up in time
    /// - `DispatchError::ShuttingDown` once admission has closed
    pub fn submit_timeout(&self, job: Job, timeout: Duration) -> Result<(), DispatchError> {
        let tx = self.sender()?;
        let name = job.name().to_string();
        tx.send_timeout(job, timeout).map_err(|e| match e {
            SendTimeoutError::Timeout(_) => DispatchError::Timeout,
            SendTimeoutError::Disconnected(_) => DispatchError::ShuttingDown,
        })?;
        self.admitted(&name);
        Ok(())
    }

    /// Enqueue a job from async code.
    ///
    /// The blocking send runs on tokio's blocking pool, so a full queue
    /// suspends the caller without stalling the runtime. Dropping the returned
    /// future does not withdraw the job: the send still completes and the job
    /// is admitted and counted.
    ///
    /// # Errors
    ///
    /// - `DispatchError::ShuttingDown` once admission has closed
    /// - `DispatchError::Internal` if the blocking task failed
    pub async fn submit_async(&self, job: Job) -> Result<(), DispatchError> {
        let tx = self.sender()?;
        let counters = Arc::clone(&self.counters);
        tokio::task::spawn_blocking(move || {
            let name = job.name().to_string();
            tx.send(job)?;
            record_admission(&counters, &name);
            Ok::<_, SendError<Job>>(())
        })
        .await
        .map_err(|e| DispatchError::Internal(format!("submit task failed: {e}")))?
        .map_err(|_| DispatchError::ShuttingDown)
    }

    /// Get current dispatcher statistics.
    #[must_use]
    pub fn stats(&self) -> DispatcherStats {
        self.counters.snapshot(
            self.config.worker_count,
            self.registry.idle_count(),
            self.job_rx.len(),
        )
    }

    /// Whether admission is still open.
    #[must_use]
    pub fn is_accepting(&self) -> bool {
        !self.shutdown.load(Ordering::Acquire)
    }

    /// Shut the dispatcher down in two phases.
    ///
    /// 1. Close admission; later submissions fail with `ShuttingDown`.
    /// 2. Wait for the handoff loops to deliver every queued job.
    /// 3. Ask every worker to stop and wait for each to finish its current
    ///    job and exit.
    ///
    /// Phases 2 and 3 are each bounded by the configured shutdown timeout.
    /// Calling this more than once returns an empty report.
    pub fn shutdown(&self) -> ShutdownReport {
        if self.shutdown.swap(true, Ordering::AcqRel) {
            return ShutdownReport::default();
        }

        info!("Shutting down dispatcher");
        let timeout = self.config.shutdown_timeout();

        // Phase 1: the handoff loops see the queue disconnect once it is empty.
        self.job_tx.lock().take();

        // Phase 2: drain.
        let mut drained = true;
        let deadline = Instant::now() + timeout;
        let handoffs: Vec<_> = self.handoffs.lock().drain(..).collect();
        for handle in handoffs {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match join_with_timeout(handle, remaining) {
                JoinOutcome::Joined => {}
                JoinOutcome::Panicked => warn!("Handoff loop panicked"),
                JoinOutcome::TimedOut => drained = false,
            }
        }
        // Without handoff loops (never run, or all aborted) jobs stay queued.
        if !self.job_rx.is_empty() {
            drained = false;
        }
        if !drained {
            warn!("Queue did not drain before the shutdown timeout");
        }
        self.abort_tx.lock().take();

        // Phase 3: stop and join workers.
        let workers: Vec<_> = self.workers.lock().drain(..).collect();
        for worker in &workers {
            worker.stop();
        }
        let mut report = ShutdownReport {
            drained,
            ..ShutdownReport::default()
        };
        let deadline = Instant::now() + timeout;
        for worker in workers {
            let worker_id = worker.id();
            let remaining = deadline.saturating_duration_since(Instant::now());
            match worker.join_timeout(remaining) {
                JoinOutcome::Joined => {
                    report.workers_stopped += 1;
                    debug!(worker_id = worker_id, "Worker joined successfully");
                }
                JoinOutcome::Panicked => {
                    report.workers_detached += 1;
                    warn!(worker_id = worker_id, "Worker panicked");
                }
                JoinOutcome::TimedOut => {
                    report.workers_detached += 1;
                    warn!(worker_id = worker_id, "Worker did not exit within timeout - detaching");
                }
            }
        }

        let queued = u64::try_from(self.job_rx.len()).unwrap_or(u64::MAX);
        self.counters.abandoned_jobs.fetch_add(queued, Ordering::Relaxed);
        report.jobs_abandoned = self.counters.abandoned_jobs.load(Ordering::Relaxed);

        info!(
            drained = report.drained,
            workers_stopped = report.workers_stopped,
            workers_detached = report.workers_detached,
            jobs_abandoned = report.jobs_abandoned,
            "Dispatcher shut down complete"
        );
        report
    }
}

impl<T: Task> Drop for Dispatcher<T> {
    fn drop(&mut self) {
        // Signal everything but don't join; explicit shutdown() drains.
        if !self.shutdown.swap(true, Ordering::AcqRel) {
            self.job_tx.lock().take();
            self.abort_tx.lock().take();
            for worker in self.workers.lock().iter() {
                worker.stop();
            }
            debug!("Dispatcher dropped without explicit shutdown - threads will be detached");
        }
    }
}

fn record_admission(counters: &DispatchCounters, name: &str) {
    counters.submitted_jobs.fetch_add(1, Ordering::Relaxed);
    debug!(job = name, "Job admitted");
}

/// One handoff loop: queue → idle worker.
struct Handoff {
    id: usize,
    jobs: Receiver<Job>,
    registry: WorkerRegistry,
    abort: Receiver<()>,
    counters: Arc<DispatchCounters>,
}

impl Handoff {
    fn run(self) {
        debug!(handoff_id = self.id, "Handoff loop started");
        loop {
            let job = select! {
                recv(self.jobs) -> msg => match msg {
                    Ok(job) => job,
                    // Admission closed and queue empty.
                    Err(_) => break,
                },
                recv(self.abort) -> _ => break,
            };
            if !self.hand_off(job) {
                break;
            }
        }
        debug!(handoff_id = self.id, "Handoff loop exiting");
    }

    /// Deliver `job` to some idle worker. Returns `false` if aborted.
    fn hand_off(&self, mut job: Job) -> bool {
        loop {
            let inbox = select! {
                recv(self.registry.receiver()) -> msg => match msg {
                    Ok(inbox) => inbox,
                    Err(_) => {
                        self.abandon(&job);
                        return false;
                    }
                },
                recv(self.abort) -> _ => {
                    self.abandon(&job);
                    return false;
                }
            };

            let worker_id = inbox.worker_id();
            match inbox.deliver(job) {
                Ok(()) => {
                    self.counters.dispatched_jobs.fetch_add(1, Ordering::Relaxed);
                    debug!(handoff_id = self.id, worker_id = worker_id, "Job handed off");
                    return true;
                }
                Err(returned) => {
                    // The worker stopped after advertising; try another.
                    debug!(worker_id = worker_id, "Skipping stopped worker");
                    job = returned;
                }
            }
        }
    }

    fn abandon(&self, job: &Job) {
        self.counters.abandoned_jobs.fetch_add(1, Ordering::Relaxed);
        warn!(handoff_id = self.id, job = job.name(), "Job abandoned during shutdown");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Fibonacci;

    fn job(name: &str) -> Job {
        Job::new(name, Duration::ZERO, 5).unwrap()
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let cfg = DispatcherConfig::new().with_worker_count(0);
        assert!(matches!(
            Dispatcher::new(cfg, Fibonacci::new()),
            Err(DispatchError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_try_submit_reports_full_queue() {
        let cfg = DispatcherConfig::new().with_max_queue_depth(2);
        let dispatcher = Dispatcher::new(cfg, Fibonacci::new()).unwrap();
        dispatcher.try_submit(job("a")).unwrap();
        dispatcher.try_submit(job("b")).unwrap();
        assert!(matches!(
            dispatcher.try_submit(job("c")),
            Err(DispatchError::QueueFull)
        ));

        let stats = dispatcher.stats();
        assert_eq!(stats.queued_jobs, 2);
        assert_eq!(stats.submitted_jobs, 2);
    }

    #[test]
    fn test_run_twice_is_rejected() {
        let dispatcher = Dispatcher::new(DispatcherConfig::new(), Fibonacci::new()).unwrap();
        dispatcher.run().unwrap();
        assert!(matches!(dispatcher.run(), Err(DispatchError::AlreadyRunning)));
        let report = dispatcher.shutdown();
        assert_eq!(report.workers_stopped, 4);
    }

    #[test]
    fn test_shutdown_without_run_reports_queued_jobs() {
        let dispatcher = Dispatcher::new(DispatcherConfig::new(), Fibonacci::new()).unwrap();
        dispatcher.submit(job("a")).unwrap();
        let report = dispatcher.shutdown();
        assert!(!report.drained);
        assert_eq!(report.workers_stopped, 0);
        assert_eq!(report.jobs_abandoned, 1);
        assert!(matches!(dispatcher.submit(job("b")), Err(DispatchError::ShuttingDown)));
        assert!(matches!(dispatcher.run(), Err(DispatchError::ShuttingDown)));
        assert_eq!(dispatcher.shutdown(), ShutdownReport::default());
    }
}
