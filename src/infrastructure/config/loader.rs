//! Layered configuration loading.

use std::path::Path;

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::{Config, ExecutorKind};

/// Directory under the repository holding autopilot's own files.
pub const PROJECT_DIR: &str = ".autopilot";

/// Configuration error types
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid poll_interval_secs: {0}. Must be at least 1")]
    InvalidPollInterval(u64),

    #[error("Invalid tick_interval_ms: {0}. Must be positive")]
    InvalidTickInterval(u64),

    #[error(
        "Invalid backoff configuration: error_backoff_ms ({0}) must be at least tick_interval_ms ({1})"
    )]
    InvalidBackoff(u64, u64),

    #[error("Command executor requires executor.program")]
    MissingExecutorProgram,

    #[error("Invalid executor timeout_secs: {0}. Must be positive")]
    InvalidExecutorTimeout(u64),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a repository
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. `<repo>/.autopilot/config.yaml`
    /// 3. `<repo>/.autopilot/local.yaml` (optional local overrides)
    /// 4. Environment variables (`AUTOPILOT_*`, `__` separates nested keys)
    pub fn load(repo_path: impl AsRef<Path>) -> Result<Config> {
        let project_dir = repo_path.as_ref().join(PROJECT_DIR);
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(project_dir.join("config.yaml")))
            .merge(Yaml::file(project_dir.join("local.yaml")))
            .merge(Env::prefixed("AUTOPILOT_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        if config.watcher.poll_interval_secs == 0 {
            return Err(ConfigError::InvalidPollInterval(config.watcher.poll_interval_secs));
        }

        if config.watcher.source.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "watcher.source cannot be empty".to_string(),
            ));
        }

        let orchestrator = &config.orchestrator;
        if orchestrator.tick_interval_ms == 0 {
            return Err(ConfigError::InvalidTickInterval(orchestrator.tick_interval_ms));
        }

        if orchestrator.error_backoff_ms < orchestrator.tick_interval_ms {
            return Err(ConfigError::InvalidBackoff(
                orchestrator.error_backoff_ms,
                orchestrator.tick_interval_ms,
            ));
        }

        if config.queue.directory.as_os_str().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "queue.directory cannot be empty".to_string(),
            ));
        }

        let executor = &config.executor;
        if executor.kind == ExecutorKind::Command
            && executor.program.as_deref().map_or(true, |p| p.trim().is_empty())
        {
            return Err(ConfigError::MissingExecutorProgram);
        }

        if executor.timeout_secs == 0 {
            return Err(ConfigError::InvalidExecutorTimeout(executor.timeout_secs));
        }

        Ok(())
    }
}
