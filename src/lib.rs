//! # Prometheus Dispatcher
//!
//! A bounded-concurrency job dispatcher: callers submit discrete jobs, a fixed
//! pool of workers executes them, and admission is limited by a bounded queue.
//!
//! ## Core Problem Solved
//!
//! Slow, CPU-heavy jobs arriving in bursts must not run unbounded in parallel
//! and must not be dropped:
//!
//! - **Bounded Concurrency**: at most `worker_count` jobs execute at once
//! - **Backpressure**: a full queue blocks submitters instead of rejecting them
//! - **No Lost Work**: every admitted job is delivered to exactly one worker
//! - **Clean Shutdown**: admission closes, the queue drains, workers are joined
//!
//! ## Architecture
//!
//! ```text
//! submitter → bounded job queue → handoff loop → WorkerRegistry (idle inboxes)
//!                                              → worker inbox → Task::run
//!                                              → worker re-advertises itself
//! ```
//!
//! Workers are dedicated OS threads, each driving the injected [`core::Task`]
//! on its own single-threaded tokio runtime.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use prometheus_dispatcher::config::DispatcherConfig;
//! use prometheus_dispatcher::core::{Dispatcher, Fibonacci, Job};
//!
//! let dispatcher = Dispatcher::new(
//!     DispatcherConfig::new()
//!         .with_worker_count(4)
//!         .with_max_queue_depth(20),
//!     Fibonacci::new(),
//! )?;
//! dispatcher.run()?;
//!
//! // Blocks while the queue is full.
//! dispatcher.submit(Job::new("a", Duration::from_millis(10), 10)?)?;
//!
//! let report = dispatcher.shutdown();
//! assert_eq!(report.jobs_abandoned, 0);
//! ```
//!
//! With the `http` feature (default), [`runtime::router`] exposes the
//! dispatcher as `POST /fib`.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Dispatch engine: jobs, tasks, workers, registry and dispatcher.
pub mod core;
/// Configuration models for the dispatcher and the HTTP listener.
pub mod config;
/// Builders to construct dispatchers from configuration.
pub mod builders;
/// Submission boundary: request validation and HTTP API surface.
pub mod runtime;
/// Shared utilities.
pub mod util;
