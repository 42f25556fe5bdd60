//! Durable event hand-off port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::AutomationEvent;

/// Hand-off port between the event producer and the orchestrator
///
/// Single reader only: `drain` removes what it returns, and an entry that
/// cannot be decoded is discarded rather than retried.
#[async_trait]
pub trait EventQueue: Send + Sync {
    /// Durably enqueue one event. Fails if an entry with the same id exists.
    async fn put(&self, event: &AutomationEvent) -> DomainResult<()>;

    /// Remove and return every pending event that decodes cleanly.
    ///
    /// Errors only when the pending entries cannot be listed; a single bad
    /// entry never fails the drain.
    async fn drain(&self) -> DomainResult<Vec<AutomationEvent>>;

    /// Ids of pending entries, without consuming them.
    async fn pending(&self) -> DomainResult<Vec<String>>;
}
