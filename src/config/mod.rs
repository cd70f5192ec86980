//! Configuration models for the dispatcher and its HTTP front end.

pub mod dispatcher;
pub mod server;

pub use dispatcher::{DispatcherConfig, HandoffPolicy};
pub use server::ServerConfig;
