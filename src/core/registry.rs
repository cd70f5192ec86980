//! Registry of idle workers.
//!
//! The registry is a bounded channel whose items are worker inboxes. A worker
//! publishes its inbox when it goes idle; the dispatcher takes one out when it
//! has a job to hand over. Taking an inbox removes it, so a worker is either
//! registered (idle) or not (busy), never both.

use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};

use super::{DispatchError, Job};

/// Delivery endpoint of one worker.
///
/// The underlying channel is a rendezvous channel: a delivery completes only
/// when the worker takes the job, and fails if the worker has exited.
#[derive(Debug, Clone)]
pub struct Inbox {
    worker_id: usize,
    tx: Sender<Job>,
}

impl Inbox {
    /// Create an inbox for `worker_id` and the receiving end the worker reads.
    #[must_use]
    pub fn new(worker_id: usize) -> (Self, Receiver<Job>) {
        let (tx, rx) = bounded(0);
        (Self { worker_id, tx }, rx)
    }

    /// Owning worker.
    #[must_use]
    pub const fn worker_id(&self) -> usize {
        self.worker_id
    }

    /// Hand `job` to the worker, blocking until it is taken.
    ///
    /// # Errors
    ///
    /// Returns the job back if the worker has stopped.
    pub fn deliver(&self, job: Job) -> Result<(), Job> {
        self.tx.send(job).map_err(|e| e.into_inner())
    }
}

/// Bounded set of idle workers' inboxes. Clones share the same registry.
#[derive(Debug, Clone)]
pub struct WorkerRegistry {
    tx: Sender<Inbox>,
    rx: Receiver<Inbox>,
    capacity: usize,
}

impl WorkerRegistry {
    /// Create a registry holding at most `capacity` idle workers.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = bounded(capacity);
        Self { tx, rx, capacity }
    }

    /// Publish an idle worker. Blocks while the registry is full, which cannot
    /// happen while capacity equals the pool size.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Internal`] if the registry channel is closed.
    pub fn advertise(&self, inbox: Inbox) -> Result<(), DispatchError> {
        self.tx
            .send(inbox)
            .map_err(|_| DispatchError::Internal("worker registry closed".into()))
    }

    /// Block until an idle worker is published, then remove and return it.
    ///
    /// No ordering is promised between concurrent callers.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Internal`] if the registry channel is closed.
    pub fn acquire(&self) -> Result<Inbox, DispatchError> {
        self.rx
            .recv()
            .map_err(|_| DispatchError::Internal("worker registry closed".into()))
    }

    /// Take an idle worker if one is published right now.
    #[must_use]
    pub fn try_acquire(&self) -> Option<Inbox> {
        self.rx.try_recv().ok()
    }

    /// Wait up to `timeout` for an idle worker.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Timeout`] if no worker became idle in time.
    pub fn acquire_timeout(&self, timeout: Duration) -> Result<Inbox, DispatchError> {
        self.rx.recv_timeout(timeout).map_err(|e| match e {
            RecvTimeoutError::Timeout => DispatchError::Timeout,
            RecvTimeoutError::Disconnected => {
                DispatchError::Internal("worker registry closed".into())
            }
        })
    }

    /// Number of inboxes currently published.
    #[must_use]
    pub fn idle_count(&self) -> usize {
        self.rx.len()
    }

    /// Maximum number of published inboxes.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) const fn receiver(&self) -> &Receiver<Inbox> {
        &self.rx
    }
}
