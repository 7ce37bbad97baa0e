//! The coordinator service of the scraping swarm: hands ID batches to
//! workers, durably records every outcome, and rotates the results log for
//! the external archiver.

use std::sync::Arc;

use common::shutdown::ShutdownSignal;

pub mod api;
pub mod config;
pub mod dispatch;
pub mod durable_log;
pub mod knobs;
pub mod manager;
pub mod rotation;
pub mod router;
pub mod state;

#[cfg(test)]
mod test_helpers;
#[cfg(test)]
mod tests;

use config::CoordinatorConfig;
use manager::WorkManager;

/// Shared state injected into every request handler.
#[derive(Clone)]
pub struct CoordinatorState {
    pub manager: Arc<WorkManager>,
    pub shutdown: ShutdownSignal,
}

/// Recover durable state and start the queue producer. Must be called from
/// within a tokio runtime.
pub fn make_app(
    config: CoordinatorConfig,
    shutdown: ShutdownSignal,
) -> anyhow::Result<CoordinatorState> {
    let manager = Arc::new(WorkManager::open(config)?);
    tokio::spawn(dispatch::run_producer(manager.clone()));
    Ok(CoordinatorState { manager, shutdown })
}
