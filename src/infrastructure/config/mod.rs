//! Configuration management infrastructure
//!
//! Hierarchical configuration using figment:
//! - YAML file loading from the repository's `.autopilot/` directory
//! - Environment variable overrides
//! - Configuration validation

pub mod loader;

pub use loader::{ConfigError, ConfigLoader, PROJECT_DIR};
