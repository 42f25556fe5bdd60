//! Recording executor for testing.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Task, TaskKind};
use crate::domain::ports::TaskExecutor;

/// Records every forwarded task; can be told to fail chosen task kinds.
#[derive(Debug, Clone, Default)]
pub struct MockExecutor {
    forwarded: Arc<RwLock<Vec<Task>>>,
    failing_kinds: Arc<RwLock<HashSet<TaskKind>>>,
}

impl MockExecutor {
    /// Executor that accepts every task.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every forward of `kind` fail.
    pub async fn fail_kind(&self, kind: TaskKind) {
        self.failing_kinds.write().await.insert(kind);
    }

    /// Tasks forwarded successfully, in order.
    pub async fn forwarded(&self) -> Vec<Task> {
        self.forwarded.read().await.clone()
    }

    /// Forget recorded tasks.
    pub async fn clear(&self) {
        self.forwarded.write().await.clear();
    }
}

#[async_trait]
impl TaskExecutor for MockExecutor {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn forward(&self, task: &Task) -> DomainResult<()> {
        if self.failing_kinds.read().await.contains(&task.kind) {
            return Err(DomainError::TaskForward {
                task_kind: task.kind.to_string(),
                agent: task.agent.clone(),
                message: "mock failure".to_string(),
            });
        }
        self.forwarded.write().await.push(task.clone());
        Ok(())
    }
}
