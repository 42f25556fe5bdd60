//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines async trait interfaces that adapters must implement:
//! - SourceRepository: read access to the watched repository
//! - EventQueue: hand-off between watcher and orchestrator
//! - TaskExecutor: delivery of derived tasks to agents
//! - Ticker: the sleep boundary of the polling loops

pub mod event_queue;
pub mod source_repository;
pub mod task_executor;
pub mod ticker;

pub use event_queue::EventQueue;
pub use source_repository::SourceRepository;
pub use task_executor::TaskExecutor;
pub use ticker::{Ticker, TokioTicker};
