//! Event orchestrator.
//!
//! Single consumer of the event queue. Every tick drains the queue, routes each
//! event to the handler registered for its kind, forwards the derived tasks to
//! the task executor and updates the metrics. A tick that fails part way is
//! logged and followed by a longer backoff sleep; the loop itself only ends
//! when [`Orchestrator::stop`] is called.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{watch, RwLock};
use tracing::{debug, error, info, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{AutomationEvent, MetricsSnapshot, OrchestratorConfig, Task};
use crate::domain::ports::{EventQueue, TaskExecutor, Ticker};

use super::event_handlers::HandlerRegistry;
use super::metrics_tracker::MetricsTracker;

/// What happened to a single drained event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// A handler ran; counts of derived tasks by outcome.
    Handled { completed: usize, failed: usize },
    /// No handler is registered for the event's kind.
    Unhandled,
}

/// Totals for one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub drained: usize,
    pub handled: usize,
    pub unhandled: usize,
    pub tasks_completed: usize,
    pub tasks_failed: usize,
}

impl BatchReport {
    fn record(&mut self, dispatch: Dispatch) {
        match dispatch {
            Dispatch::Handled { completed, failed } => {
                self.handled += 1;
                self.tasks_completed += completed;
                self.tasks_failed += failed;
            }
            Dispatch::Unhandled => self.unhandled += 1,
        }
    }
}

/// Single consumer of the event queue.
pub struct Orchestrator {
    queue: Arc<dyn EventQueue>,
    executor: Arc<dyn TaskExecutor>,
    ticker: Arc<dyn Ticker>,
    handlers: HandlerRegistry,
    config: OrchestratorConfig,
    metrics_file: Option<PathBuf>,
    metrics: RwLock<MetricsTracker>,
    /// Never populated; tasks are forwarded synchronously and not tracked.
    active_tasks: Vec<Task>,
    running: Arc<AtomicBool>,
    /// Wakes the loop out of its sleep when stopped.
    shutdown: watch::Sender<bool>,
}

impl Orchestrator {
    /// Orchestrator with the built-in handlers and no metrics file.
    pub fn new(
        queue: Arc<dyn EventQueue>,
        executor: Arc<dyn TaskExecutor>,
        ticker: Arc<dyn Ticker>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            queue,
            executor,
            ticker,
            handlers: HandlerRegistry::with_defaults(),
            config,
            metrics_file: None,
            metrics: RwLock::new(MetricsTracker::new()),
            active_tasks: Vec::new(),
            running: Arc::new(AtomicBool::new(false)),
            shutdown: watch::channel(false).0,
        }
    }

    /// Replace the handler registry.
    pub fn with_handlers(mut self, handlers: HandlerRegistry) -> Self {
        self.handlers = handlers;
        self
    }

    /// Write a metrics snapshot to `path` after every tick.
    pub fn with_metrics_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.metrics_file = Some(path.into());
        self
    }

    /// Run ticks until [`Orchestrator::stop`] is called.
    pub async fn run(&self) {
        self.running.store(true, Ordering::SeqCst);
        self.shutdown.send_replace(false);
        let mut shutdown = self.shutdown.subscribe();

        let tick_interval = Duration::from_millis(self.config.tick_interval_ms);
        let backoff = Duration::from_millis(self.config.error_backoff_ms);
        info!(
            executor = self.executor.name(),
            handlers = ?self.handlers.kinds(),
            tick_interval_ms = self.config.tick_interval_ms,
            "Orchestrator started"
        );

        while self.running.load(Ordering::SeqCst) {
            let pause = match self.tick().await {
                Ok(report) => {
                    if report.drained > 0 {
                        info!(
                            drained = report.drained,
                            handled = report.handled,
                            unhandled = report.unhandled,
                            tasks_completed = report.tasks_completed,
                            tasks_failed = report.tasks_failed,
                            "Batch processed"
                        );
                    }
                    tick_interval
                }
                Err(e) => {
                    error!(error = %e, backoff_ms = self.config.error_backoff_ms, "Batch failed, backing off");
                    backoff
                }
            };

            if !self.running.load(Ordering::SeqCst) {
                break;
            }
            tokio::select! {
                () = self.ticker.sleep(pause) => {}
                _ = shutdown.changed() => {}
            }
        }

        let snapshot = self.metrics().await;
        info!(
            events_processed = snapshot.events_processed,
            tasks_created = snapshot.tasks_created,
            tasks_completed = snapshot.tasks_completed,
            tasks_failed = snapshot.tasks_failed,
            automation_rate = snapshot.automation_rate,
            "Orchestrator stopped"
        );
    }

    /// Stop the loop after the current tick.
    ///
    /// A loop waiting out its pause wakes immediately.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.shutdown.send_replace(true);
    }

    /// Whether the loop is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Drain the queue once and process everything in it.
    ///
    /// Metrics are refreshed and persisted even when the batch fails part way.
    pub async fn tick(&self) -> DomainResult<BatchReport> {
        let result = self.process_batch().await;

        self.metrics.write().await.refresh_automation_rate();
        if let Some(path) = &self.metrics_file {
            let snapshot = self.metrics().await;
            if let Err(e) = write_metrics_snapshot(path, &snapshot).await {
                warn!(path = %path.display(), error = %e, "Failed to write metrics snapshot");
            }
        }

        result
    }

    async fn process_batch(&self) -> DomainResult<BatchReport> {
        let events = self.queue.drain().await?;
        let mut report = BatchReport {
            drained: events.len(),
            ..Default::default()
        };

        for event in &events {
            report.record(self.dispatch(event).await?);
        }

        Ok(report)
    }

    /// Route one event to its handler and forward the derived tasks.
    ///
    /// An error here means the handler itself failed; task forward failures
    /// are counted, not returned.
    pub async fn dispatch(&self, event: &AutomationEvent) -> DomainResult<Dispatch> {
        let Some(handler) = self.handlers.get(event.kind) else {
            info!(event_id = %event.id, kind = %event.kind, "No handler registered, dropping event");
            return Ok(Dispatch::Unhandled);
        };

        let started = Instant::now();
        debug!(
            event_id = %event.id,
            kind = %event.kind,
            priority = %event.priority,
            handler = handler.name(),
            "Dispatching event"
        );

        let tasks = handler.derive_tasks(event)?;
        let mut completed = 0;
        let mut failed = 0;
        for task in &tasks {
            if self.forward(event, task).await {
                completed += 1;
            } else {
                failed += 1;
            }
        }

        let elapsed = started.elapsed();
        self.metrics.write().await.record_event_processed(elapsed);
        info!(
            event_id = %event.id,
            kind = %event.kind,
            tasks = tasks.len(),
            elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            "Event processed"
        );

        Ok(Dispatch::Handled { completed, failed })
    }

    async fn forward(&self, event: &AutomationEvent, task: &Task) -> bool {
        self.metrics.write().await.record_task_created();

        match self.executor.forward(task).await {
            Ok(()) => {
                self.metrics.write().await.record_task_completed();
                debug!(
                    event_id = %event.id,
                    task_id = %task.id,
                    task_kind = %task.kind,
                    agent = %task.agent,
                    "Task forwarded"
                );
                true
            }
            Err(e) => {
                self.metrics.write().await.record_task_failed();
                warn!(
                    event_id = %event.id,
                    task_id = %task.id,
                    task_kind = %task.kind,
                    agent = %task.agent,
                    error = %e,
                    "Task forward failed"
                );
                false
            }
        }
    }

    /// Snapshot of the current metrics.
    pub async fn metrics(&self) -> MetricsSnapshot {
        self.metrics.read().await.snapshot()
    }

    /// Tasks currently in flight. Always empty.
    pub fn active_tasks(&self) -> &[Task] {
        &self.active_tasks
    }
}

/// Persist a snapshot as pretty JSON, replacing the file atomically.
pub async fn write_metrics_snapshot(path: &Path, snapshot: &MetricsSnapshot) -> DomainResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DomainError::queue_io(parent, e))?;
        }
    }

    let body = serde_json::to_vec_pretty(snapshot)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, body)
        .await
        .map_err(|e| DomainError::queue_io(&tmp, e))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| DomainError::queue_io(path, e))
}

/// Load a snapshot written by [`write_metrics_snapshot`].
pub async fn read_metrics_snapshot(path: &Path) -> DomainResult<MetricsSnapshot> {
    let body = tokio::fs::read(path)
        .await
        .map_err(|e| DomainError::queue_io(path, e))?;
    Ok(serde_json::from_slice(&body)?)
}
