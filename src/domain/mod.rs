//! Domain layer for the autopilot pipeline
//!
//! Event taxonomy, task model, configuration model and the port traits the
//! services depend on.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
