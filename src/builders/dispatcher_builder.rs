//! Build and start a dispatcher from configuration.

use std::sync::Arc;

use crate::config::DispatcherConfig;
use crate::core::{AuditSink, DispatchError, Dispatcher, Task};

/// Validate `cfg`, build a dispatcher running `task`, attach `audit` if given,
/// and start it.
///
/// # Errors
///
/// - `DispatchError::InvalidConfig` if the configuration is invalid
/// - `DispatchError::Spawn` if worker or handoff threads cannot be created
pub fn build_dispatcher<T: Task>(
    cfg: &DispatcherConfig,
    task: T,
    audit: Option<Arc<dyn AuditSink>>,
) -> Result<Dispatcher<T>, DispatchError> {
    cfg.validate()
        .map_err(|e| DispatchError::InvalidConfig(format!("config invalid: {e}")))?;

    let mut dispatcher = Dispatcher::new(cfg.clone(), task)?;
    if let Some(audit) = audit {
        dispatcher = dispatcher.with_audit(audit);
    }
    dispatcher.run()?;
    Ok(dispatcher)
}
