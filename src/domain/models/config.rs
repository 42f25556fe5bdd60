//! Configuration tree.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Main configuration structure for autopilot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Shared event queue configuration
    #[serde(default)]
    pub queue: QueueConfig,

    /// Repository watcher configuration
    #[serde(default)]
    pub watcher: WatcherConfig,

    /// Orchestrator loop configuration
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,

    /// Task executor configuration
    #[serde(default)]
    pub executor: ExecutorConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files (stderr only when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
        }
    }
}

/// Event queue configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct QueueConfig {
    /// Directory holding one file per pending event.
    /// Relative paths are resolved against the repository path.
    #[serde(default = "default_queue_directory")]
    pub directory: PathBuf,
}

fn default_queue_directory() -> PathBuf {
    PathBuf::from(".autopilot/queue")
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            directory: default_queue_directory(),
        }
    }
}

impl QueueConfig {
    /// Queue directory for the given repository.
    pub fn resolve(&self, repo_path: &Path) -> PathBuf {
        if self.directory.is_absolute() {
            self.directory.clone()
        } else {
            repo_path.join(&self.directory)
        }
    }
}

/// Repository watcher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct WatcherConfig {
    /// Seconds between repository polls
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Producer name stamped on emitted events
    #[serde(default = "default_watcher_source")]
    pub source: String,
}

const fn default_poll_interval_secs() -> u64 {
    10
}

fn default_watcher_source() -> String {
    "git-watcher".to_string()
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            source: default_watcher_source(),
        }
    }
}

/// Orchestrator loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct OrchestratorConfig {
    /// Pause between ticks in milliseconds
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Pause after a failed tick in milliseconds
    #[serde(default = "default_error_backoff_ms")]
    pub error_backoff_ms: u64,

    /// Where to write the metrics snapshot after each tick.
    /// Relative paths are resolved against the repository path; `null` disables it.
    #[serde(default = "default_metrics_file")]
    pub metrics_file: Option<PathBuf>,
}

const fn default_tick_interval_ms() -> u64 {
    5000
}

const fn default_error_backoff_ms() -> u64 {
    10000
}

#[allow(clippy::unnecessary_wraps)]
fn default_metrics_file() -> Option<PathBuf> {
    Some(PathBuf::from(".autopilot/metrics.json"))
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            error_backoff_ms: default_error_backoff_ms(),
            metrics_file: default_metrics_file(),
        }
    }
}

impl OrchestratorConfig {
    /// Metrics file for the given repository, if one is configured.
    pub fn resolve_metrics_file(&self, repo_path: &Path) -> Option<PathBuf> {
        self.metrics_file.as_ref().map(|path| {
            if path.is_absolute() {
                path.clone()
            } else {
                repo_path.join(path)
            }
        })
    }
}

/// Which task executor to forward derived tasks to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutorKind {
    /// Log the task and report success
    #[default]
    Log,
    /// Hand the task to an external messaging command
    Command,
}

/// Task executor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ExecutorConfig {
    #[serde(default)]
    pub kind: ExecutorKind,

    /// Program invoked by the command executor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,

    /// Arguments placed before the message arguments
    #[serde(default)]
    pub args: Vec<String>,

    /// Sender name passed to the messaging command
    #[serde(default = "default_sender")]
    pub sender: String,

    /// Timeout for a single forward in seconds
    #[serde(default = "default_executor_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_sender() -> String {
    "automation-orchestrator".to_string()
}

const fn default_executor_timeout_secs() -> u64 {
    30
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            kind: ExecutorKind::default(),
            program: None,
            args: vec![],
            sender: default_sender(),
            timeout_secs: default_executor_timeout_secs(),
        }
    }
}
