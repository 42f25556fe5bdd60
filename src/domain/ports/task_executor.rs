//! Port for handing tasks to agents.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::Task;

/// Port for handing derived tasks to the agents that execute them.
///
/// A forward either succeeds or returns `DomainError::TaskForward`; the
/// orchestrator never retries.
#[async_trait]
pub trait TaskExecutor: Send + Sync {
    /// Executor name for logs
    fn name(&self) -> &'static str;

    /// Forward a task to its agent
    async fn forward(&self, task: &Task) -> DomainResult<()>;
}
