//! Autopilot - repository-driven automation pipeline
//!
//! A watcher polls a git repository for new commits and branches and turns
//! each into a typed, prioritized event on a file-based queue. An orchestrator
//! drains the queue, routes every event to the handler for its kind, and
//! forwards the derived tasks to named agents.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): event and task models, errors and port traits
//! - **Service Layer** (`services`): classification, watching, dispatch and metrics
//! - **Adapters** (`adapters`): git CLI, filesystem queue and task executors
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use autopilot::adapters::{FileEventQueue, LoggingExecutor};
//! use autopilot::domain::models::OrchestratorConfig;
//! use autopilot::domain::ports::TokioTicker;
//! use autopilot::services::Orchestrator;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let orchestrator = Orchestrator::new(
//!     Arc::new(FileEventQueue::new(".autopilot/queue")),
//!     Arc::new(LoggingExecutor),
//!     Arc::new(TokioTicker),
//!     OrchestratorConfig::default(),
//! );
//! let report = orchestrator.tick().await?;
//! println!("processed {} events", report.handled);
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    AutomationEvent, CommitInfo, Config, EventKind, EventPayload, MetricsSnapshot, Priority, Task,
    TaskKind,
};
pub use domain::ports::{EventQueue, SourceRepository, TaskExecutor, Ticker};
pub use domain::{DomainError, DomainResult};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{Orchestrator, SourceWatcher};
