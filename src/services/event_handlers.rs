//! Per-kind routing rules.
//!
//! Each handler turns one event kind into zero or more tasks. Handlers are
//! pure: they never forward anything themselves, the orchestrator does.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Value};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    agents, short_hash, AutomationEvent, EventKind, GitPayload, Priority, Task, TaskKind,
};

/// Complexity above which a commit gets a code review.
pub const CODE_REVIEW_THRESHOLD: f64 = 30.0;

/// Planned length of a development session, in minutes.
pub const SESSION_DURATION_MINUTES: u64 = 90;

/// Derives tasks for one event kind.
pub trait EventHandler: Send + Sync {
    /// Handler name for logs
    fn name(&self) -> &'static str;

    /// Event kind this handler is registered for
    fn kind(&self) -> EventKind;

    /// Tasks to forward for this event, possibly none.
    fn derive_tasks(&self, event: &AutomationEvent) -> DomainResult<Vec<Task>>;
}

fn git_payload<'a>(event: &'a AutomationEvent) -> DomainResult<&'a GitPayload> {
    event.git().ok_or_else(|| DomainError::HandlerFailed {
        event_id: event.id.to_string(),
        message: format!("{} event carries no git payload", event.kind),
    })
}

/// `new_commit`: pattern extraction, code review and documentation updates.
#[derive(Debug, Default)]
pub struct NewCommitHandler;

impl EventHandler for NewCommitHandler {
    fn name(&self) -> &'static str {
        "new-commit"
    }

    fn kind(&self) -> EventKind {
        EventKind::NewCommit
    }

    fn derive_tasks(&self, event: &AutomationEvent) -> DomainResult<Vec<Task>> {
        let git = git_payload(event)?;
        let commit = short_hash(&git.commit_hash).to_string();
        let mut tasks = Vec::new();

        if !git.files_changed.is_empty() {
            tasks.push(
                Task::new(
                    TaskKind::PatternExtraction,
                    agents::PATTERN_SPECIALIST,
                    Priority::High,
                    format!("Extract patterns from commit {commit}"),
                )
                .with_field("commitHash", commit.clone())
                .with_field("files", git.files_changed.clone()),
            );
        }

        let complexity = event.estimated_complexity.unwrap_or(0.0);
        if complexity > CODE_REVIEW_THRESHOLD {
            tasks.push(
                Task::new(
                    TaskKind::CodeReview,
                    agents::LEAD_REVIEWER,
                    Priority::High,
                    format!("Review commit {commit} by {}", git.author),
                )
                .with_field("commitHash", commit.clone())
                .with_field("complexity", complexity),
            );
        }

        let docs: Vec<String> = git
            .files_changed
            .iter()
            .filter(|f| f.ends_with(".md"))
            .cloned()
            .collect();
        if !docs.is_empty() {
            tasks.push(
                Task::new(
                    TaskKind::DocumentationUpdate,
                    agents::PATTERN_SPECIALIST,
                    Priority::Medium,
                    "Update documentation index",
                )
                .with_field("files", docs),
            );
        }

        Ok(tasks)
    }
}

/// `new_branch`: environment setup for the branch.
#[derive(Debug, Default)]
pub struct NewBranchHandler;

impl EventHandler for NewBranchHandler {
    fn name(&self) -> &'static str {
        "new-branch"
    }

    fn kind(&self) -> EventKind {
        EventKind::NewBranch
    }

    fn derive_tasks(&self, event: &AutomationEvent) -> DomainResult<Vec<Task>> {
        let git = git_payload(event)?;
        Ok(vec![Task::new(
            TaskKind::EnvironmentSetup,
            agents::LEAD_REVIEWER,
            Priority::Medium,
            format!("Setup development environment for branch {}", git.branch),
        )
        .with_field("branch", git.branch.clone())])
    }
}

/// `build_failure`: a critical diagnostic carrying the build payload.
#[derive(Debug, Default)]
pub struct BuildFailureHandler;

impl EventHandler for BuildFailureHandler {
    fn name(&self) -> &'static str {
        "build-failure"
    }

    fn kind(&self) -> EventKind {
        EventKind::BuildFailure
    }

    fn derive_tasks(&self, event: &AutomationEvent) -> DomainResult<Vec<Task>> {
        Ok(vec![Task::new(
            TaskKind::Diagnostic,
            agents::LEAD_REVIEWER,
            Priority::Critical,
            "Diagnose and fix build failure",
        )
        .with_payload(event.payload.to_map()?)])
    }
}

/// `session_start`: plan the session's objectives.
#[derive(Debug, Default)]
pub struct SessionStartHandler;

impl EventHandler for SessionStartHandler {
    fn name(&self) -> &'static str {
        "session-start"
    }

    fn kind(&self) -> EventKind {
        EventKind::SessionStart
    }

    fn derive_tasks(&self, _event: &AutomationEvent) -> DomainResult<Vec<Task>> {
        Ok(vec![Task::new(
            TaskKind::SessionPlanning,
            agents::STRATEGIC_PLANNER,
            Priority::High,
            "Plan objectives for development session",
        )
        .with_field("sessionDurationMinutes", SESSION_DURATION_MINUTES)
        .with_field(
            "availableAgents",
            json!([agents::LEAD_REVIEWER, agents::PATTERN_SPECIALIST]),
        )])
    }
}

/// `pattern_discovered`: document and validate the pattern.
#[derive(Debug, Default)]
pub struct PatternDiscoveredHandler;

impl EventHandler for PatternDiscoveredHandler {
    fn name(&self) -> &'static str {
        "pattern-discovered"
    }

    fn kind(&self) -> EventKind {
        EventKind::PatternDiscovered
    }

    fn derive_tasks(&self, event: &AutomationEvent) -> DomainResult<Vec<Task>> {
        let payload = event.payload.to_map()?;
        let name = match payload.get("patternName") {
            Some(Value::String(name)) => name.clone(),
            _ => String::new(),
        };
        Ok(vec![Task::new(
            TaskKind::PatternDocumentation,
            agents::PATTERN_SPECIALIST,
            Priority::Medium,
            format!("Document and validate pattern: {name}"),
        )
        .with_payload(payload)])
    }
}

/// Kind → handler lookup. At most one handler per kind.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<EventKind, Arc<dyn EventHandler>>,
}

impl HandlerRegistry {
    /// Registry with no handlers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in routing rules.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(NewCommitHandler));
        registry.register(Arc::new(NewBranchHandler));
        registry.register(Arc::new(BuildFailureHandler));
        registry.register(Arc::new(SessionStartHandler));
        registry.register(Arc::new(PatternDiscoveredHandler));
        registry
    }

    /// Register a handler, replacing any previous one for the same kind.
    pub fn register(&mut self, handler: Arc<dyn EventHandler>) {
        self.handlers.insert(handler.kind(), handler);
    }

    /// Handler registered for `kind`.
    pub fn get(&self, kind: EventKind) -> Option<&Arc<dyn EventHandler>> {
        self.handlers.get(&kind)
    }

    /// Kinds with a registered handler, in wire-name order.
    pub fn kinds(&self) -> Vec<EventKind> {
        let mut kinds: Vec<EventKind> = self.handlers.keys().copied().collect();
        kinds.sort_by_key(EventKind::as_str);
        kinds
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{BuildPayload, EventPayload, PatternPayload};
    use crate::services::event_factory::make_event;

    fn commit_event(files: &[&str], complexity: Option<f64>) -> AutomationEvent {
        let payload = GitPayload {
            repository: "/repo".to_string(),
            branch: "main".to_string(),
            commit_hash: "0123456789abcdef0123".to_string(),
            author: "Ada".to_string(),
            files_changed: files.iter().map(|f| (*f).to_string()).collect(),
            ..Default::default()
        };
        let mut event = make_event(EventKind::NewCommit, EventPayload::Git(payload), "test");
        event.estimated_complexity = complexity;
        event
    }

    #[test]
    fn test_commit_with_docs_and_high_complexity_yields_three_tasks() {
        let tasks = NewCommitHandler
            .derive_tasks(&commit_event(&["a.md", "b.py"], Some(45.0)))
            .unwrap();

        let kinds: Vec<TaskKind> = tasks.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TaskKind::PatternExtraction,
                TaskKind::CodeReview,
                TaskKind::DocumentationUpdate
            ]
        );
        assert_eq!(tasks[0].payload["commitHash"], json!("01234567"));
        assert_eq!(tasks[0].payload["files"], json!(["a.md", "b.py"]));
        assert_eq!(tasks[1].agent, "cto");
        assert_eq!(tasks[1].payload["complexity"], json!(45.0));
        assert_eq!(tasks[1].description, "Review commit 01234567 by Ada");
        assert_eq!(tasks[2].payload["files"], json!(["a.md"]));
        assert_eq!(tasks[2].priority, Priority::Medium);
    }

    #[test]
    fn test_simple_commit_yields_pattern_extraction_only() {
        let tasks = NewCommitHandler
            .derive_tasks(&commit_event(&["b.py"], Some(10.0)))
            .unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].kind, TaskKind::PatternExtraction);
        assert_eq!(tasks[0].agent, "framework-architect");
    }

    #[test]
    fn test_review_threshold_is_exclusive() {
        let tasks = NewCommitHandler
            .derive_tasks(&commit_event(&["b.py"], Some(30.0)))
            .unwrap();
        assert!(tasks.iter().all(|t| t.kind != TaskKind::CodeReview));

        let none = NewCommitHandler.derive_tasks(&commit_event(&[], None)).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_branch_handler() {
        let payload = GitPayload {
            branch: "feature-x".to_string(),
            created_from: Some("main".to_string()),
            ..Default::default()
        };
        let event = make_event(EventKind::NewBranch, EventPayload::Git(payload), "test");
        let tasks = NewBranchHandler.derive_tasks(&event).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].kind, TaskKind::EnvironmentSetup);
        assert_eq!(tasks[0].payload["branch"], json!("feature-x"));
    }

    #[test]
    fn test_build_failure_carries_build_payload() {
        let payload = BuildPayload {
            build_id: "ci-42".to_string(),
            error_message: "linker error".to_string(),
            ..Default::default()
        };
        let event = make_event(EventKind::BuildFailure, EventPayload::Build(payload), "ci");
        let tasks = BuildFailureHandler.derive_tasks(&event).unwrap();
        assert_eq!(tasks[0].priority, Priority::Critical);
        assert_eq!(tasks[0].payload["buildId"], json!("ci-42"));
        assert_eq!(tasks[0].payload["errorMessage"], json!("linker error"));
    }

    #[test]
    fn test_session_and_pattern_handlers() {
        let session = make_event(
            EventKind::SessionStart,
            EventPayload::Generic(Default::default()),
            "cli",
        );
        let tasks = SessionStartHandler.derive_tasks(&session).unwrap();
        assert_eq!(tasks[0].agent, "strategic-advisor");
        assert_eq!(tasks[0].payload["sessionDurationMinutes"], json!(90));
        assert_eq!(
            tasks[0].payload["availableAgents"],
            json!(["cto", "framework-architect"])
        );

        let pattern = PatternPayload {
            pattern_name: "retry-with-jitter".to_string(),
            ..Default::default()
        };
        let event = make_event(
            EventKind::PatternDiscovered,
            EventPayload::Pattern(pattern),
            "cli",
        );
        let tasks = PatternDiscoveredHandler.derive_tasks(&event).unwrap();
        assert_eq!(
            tasks[0].description,
            "Document and validate pattern: retry-with-jitter"
        );
        assert_eq!(tasks[0].payload["patternName"], json!("retry-with-jitter"));
    }

    #[test]
    fn test_registry_defaults() {
        let registry = HandlerRegistry::with_defaults();
        assert_eq!(registry.kinds().len(), 5);
        assert!(registry.get(EventKind::NewCommit).is_some());
        assert!(registry.get(EventKind::LintError).is_none());
    }
}
