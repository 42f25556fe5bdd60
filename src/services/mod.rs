//! Application services: watcher, orchestrator and the scoring they share.

pub mod commit_analyzer;
pub mod event_factory;
pub mod event_handlers;
pub mod metrics_tracker;
pub mod orchestrator;
pub mod source_watcher;

pub use commit_analyzer::{commit_priority, complexity_breakdown, complexity_score, detect_patterns, ComplexityBreakdown};
pub use event_factory::{classify, create_event, make_event, Classification};
pub use event_handlers::{EventHandler, HandlerRegistry};
pub use metrics_tracker::{automation_rate, MetricsTracker};
pub use orchestrator::{read_metrics_snapshot, write_metrics_snapshot, BatchReport, Dispatch, Orchestrator};
pub use source_watcher::{SourceWatcher, TickReport, WatcherState};
