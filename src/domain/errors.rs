//! Domain errors for the autopilot pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Domain-level errors that can occur while watching, queueing or dispatching.
///
/// None of these terminate a running loop: the watcher swallows
/// `TransientSource`, the queue drops `MalformedEvent` entries, the
/// orchestrator drops `UnknownKind` events and counts `TaskForward` failures.
/// Anything else escaping a tick is handled as a batch failure with backoff.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Repository query failed ({operation}): {message}")]
    TransientSource { operation: String, message: String },

    #[error("Malformed queue entry {}: {reason}", path.display())]
    MalformedEvent { path: PathBuf, reason: String },

    #[error("Unknown event kind: {0}")]
    UnknownKind(String),

    #[error("Unknown priority: {0}")]
    UnknownPriority(String),

    #[error("Failed to forward {task_kind} task to {agent}: {message}")]
    TaskForward {
        task_kind: String,
        agent: String,
        message: String,
    },

    #[error("Queue entry already exists: {}", .0.display())]
    QueueEntryExists(PathBuf),

    #[error("Queue I/O error on {}: {source}", path.display())]
    QueueIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Handler failed for event {event_id}: {message}")]
    HandlerFailed { event_id: String, message: String },
}

/// Result alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}

impl DomainError {
    /// Build a queue I/O error for the given path.
    pub fn queue_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DomainError::QueueIo {
            path: path.into(),
            source,
        }
    }

    /// Build a transient repository error.
    pub fn transient(operation: impl Into<String>, message: impl Into<String>) -> Self {
        DomainError::TransientSource {
            operation: operation.into(),
            message: message.into(),
        }
    }
}
