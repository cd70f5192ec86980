//! Submission boundary: request parsing and the HTTP API surface.

#[cfg(feature = "http")]
pub mod api;
pub mod submission;

#[cfg(feature = "http")]
pub use api::{health, router, Health, SUBMIT_PATH};
pub use submission::{SubmissionError, SubmissionForm};
