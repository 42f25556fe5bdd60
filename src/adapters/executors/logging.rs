//! Executor that only logs.

use async_trait::async_trait;
use tracing::info;

use crate::domain::errors::DomainResult;
use crate::domain::models::Task;
use crate::domain::ports::TaskExecutor;

/// Logs each task and reports it as delivered.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingExecutor;

#[async_trait]
impl TaskExecutor for LoggingExecutor {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn forward(&self, task: &Task) -> DomainResult<()> {
        info!(
            task_id = %task.id,
            task_kind = %task.kind,
            agent = %task.agent,
            priority = %task.priority,
            description = %task.description,
            "Task queued for agent"
        );
        Ok(())
    }
}
