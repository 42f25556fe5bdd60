//! Subcommand implementations.

pub mod emit;
pub mod metrics;
pub mod orchestrate;
pub mod queue;
pub mod watch;

use std::path::Path;

use crate::adapters::FileEventQueue;
use crate::domain::models::Config;

/// Queue for the repository, as configured.
pub(crate) fn open_queue(config: &Config, repo: &Path) -> FileEventQueue {
    FileEventQueue::new(config.queue.resolve(repo))
}
