//! Task executor adapters.

pub mod command;
pub mod logging;
pub mod mock;

use std::sync::Arc;

use crate::domain::models::{ExecutorConfig, ExecutorKind};
use crate::domain::ports::TaskExecutor;

pub use command::CommandExecutor;
pub use logging::LoggingExecutor;
pub use mock::MockExecutor;

/// Build the executor selected by configuration.
///
/// A command executor without a program falls back to logging; configuration
/// validation rejects that combination before it gets here.
pub fn executor_from_config(config: &ExecutorConfig) -> Arc<dyn TaskExecutor> {
    match (config.kind, &config.program) {
        (ExecutorKind::Command, Some(program)) => Arc::new(CommandExecutor::new(
            program.clone(),
            config.args.clone(),
            config.sender.clone(),
            std::time::Duration::from_secs(config.timeout_secs),
        )),
        _ => Arc::new(LoggingExecutor),
    }
}
