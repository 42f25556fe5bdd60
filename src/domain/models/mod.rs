//! Domain models.

pub mod commit;
pub mod config;
pub mod event;
pub mod metrics;
pub mod task;

pub use commit::{short_hash, CommitInfo};
pub use config::{
    Config, ExecutorConfig, ExecutorKind, LoggingConfig, OrchestratorConfig, QueueConfig,
    WatcherConfig,
};
pub use event::{
    AutomationEvent, BuildPayload, DiffStat, EventKind, EventPayload, GitPayload, PatternPayload,
    PayloadFamily, Priority, WireEvent,
};
pub use metrics::MetricsSnapshot;
pub use task::{agents, Task, TaskKind};
