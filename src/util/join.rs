//! Bounded joining of OS threads.

use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Outcome of joining a thread with a timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// The thread exited normally.
    Joined,
    /// The thread panicked.
    Panicked,
    /// The thread did not exit in time and was detached.
    TimedOut,
}

/// Join `handle`, giving up after `timeout`.
///
/// The join runs on a helper thread so a stuck thread cannot hang the caller;
/// on timeout the helper is left behind and finishes whenever the thread does.
pub fn join_with_timeout(handle: JoinHandle<()>, timeout: Duration) -> JoinOutcome {
    if handle.is_finished() {
        return if handle.join().is_ok() {
            JoinOutcome::Joined
        } else {
            JoinOutcome::Panicked
        };
    }

    let (tx, rx) = crossbeam_channel::bounded(1);
    let spawned = thread::Builder::new()
        .name("pd-joiner".into())
        .spawn(move || {
            let _ = tx.send(handle.join().is_ok());
        });
    if spawned.is_err() {
        return JoinOutcome::TimedOut;
    }

    match rx.recv_timeout(timeout) {
        Ok(true) => JoinOutcome::Joined,
        Ok(false) => JoinOutcome::Panicked,
        Err(_) => JoinOutcome::TimedOut,
    }
}
