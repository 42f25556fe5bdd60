//! Executor that hands tasks to an external messaging command.
//!
//! The command is invoked as
//! `<program> <args..> send <sender> <agent> REQUEST <PRIORITY> <description> <payload-json>`
//! from the current directory and must exit zero within the timeout.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::Task;
use crate::domain::ports::TaskExecutor;

/// Forwards tasks by running an external messaging command.
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    program: String,
    args: Vec<String>,
    sender: String,
    timeout: Duration,
}

impl CommandExecutor {
    /// Executor running `program` with `args` before the message arguments.
    pub fn new(program: String, args: Vec<String>, sender: String, timeout: Duration) -> Self {
        Self {
            program,
            args,
            sender,
            timeout,
        }
    }

    /// Full argument list for one task, excluding the program.
    pub fn message_args(&self, task: &Task) -> DomainResult<Vec<String>> {
        let payload = serde_json::to_string_pretty(&task.payload)?;
        let mut args = self.args.clone();
        args.extend([
            "send".to_string(),
            self.sender.clone(),
            task.agent.clone(),
            "REQUEST".to_string(),
            task.priority.as_str().to_uppercase(),
            task.description.clone(),
            payload,
        ]);
        Ok(args)
    }

    fn failure(task: &Task, message: impl Into<String>) -> DomainError {
        DomainError::TaskForward {
            task_kind: task.kind.to_string(),
            agent: task.agent.clone(),
            message: message.into(),
        }
    }
}

#[async_trait]
impl TaskExecutor for CommandExecutor {
    fn name(&self) -> &'static str {
        "command"
    }

    async fn forward(&self, task: &Task) -> DomainResult<()> {
        let args = self.message_args(task)?;
        debug!(program = %self.program, task_id = %task.id, agent = %task.agent, "Invoking messaging command");

        let child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, child)
            .await
            .map_err(|_| Self::failure(task, format!("timed out after {}s", self.timeout.as_secs())))?
            .map_err(|e| Self::failure(task, format!("failed to spawn {}: {e}", self.program)))?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(Self::failure(
                task,
                format!("{} exited with {}: {}", self.program, output.status, stderr.trim()),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Priority, TaskKind};

    fn task() -> Task {
        Task::new(TaskKind::EnvironmentSetup, "cto", Priority::Medium, "Setup branch x")
            .with_field("branch", "x")
    }

    #[test]
    fn test_message_args_layout() {
        let executor = CommandExecutor::new(
            "a2a".to_string(),
            vec!["--quiet".to_string()],
            "automation-orchestrator".to_string(),
            Duration::from_secs(5),
        );
        let args = executor.message_args(&task()).unwrap();
        assert_eq!(
            &args[..7],
            &[
                "--quiet",
                "send",
                "automation-orchestrator",
                "cto",
                "REQUEST",
                "MEDIUM",
                "Setup branch x"
            ]
        );
        let payload: serde_json::Value = serde_json::from_str(&args[7]).unwrap();
        assert_eq!(payload["branch"], "x");
    }

    #[tokio::test]
    async fn test_missing_program_is_forward_error() {
        let executor = CommandExecutor::new(
            "/nonexistent/autopilot-messaging".to_string(),
            vec![],
            "automation-orchestrator".to_string(),
            Duration::from_secs(5),
        );
        let err = executor.forward(&task()).await.unwrap_err();
        assert!(matches!(err, DomainError::TaskForward { .. }));
    }
}
