//! Infrastructure adapters for external systems.

pub mod executors;
pub mod git;
pub mod queue;

pub use executors::{executor_from_config, CommandExecutor, LoggingExecutor, MockExecutor};
pub use git::GitCliRepository;
pub use queue::FileEventQueue;
