//! Task domain model.
//!
//! Tasks are derived from events by the orchestrator's handlers and forwarded
//! to an agent through the task executor. They are not persisted.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::event::Priority;

/// Well-known agent names tasks are addressed to.
pub mod agents {
    /// Extracts and documents reusable patterns.
    pub const PATTERN_SPECIALIST: &str = "framework-architect";
    /// Reviews significant changes and handles failures.
    pub const LEAD_REVIEWER: &str = "cto";
    /// Plans development sessions.
    pub const STRATEGIC_PLANNER: &str = "strategic-advisor";
}

/// Kind of derived work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    PatternExtraction,
    CodeReview,
    DocumentationUpdate,
    EnvironmentSetup,
    Diagnostic,
    SessionPlanning,
    PatternDocumentation,
}

impl TaskKind {
    /// Wire name of the task kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PatternExtraction => "pattern_extraction",
            Self::CodeReview => "code_review",
            Self::DocumentationUpdate => "documentation_update",
            Self::EnvironmentSetup => "environment_setup",
            Self::Diagnostic => "diagnostic",
            Self::SessionPlanning => "session_planning",
            Self::PatternDocumentation => "pattern_documentation",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit of work addressed to a named agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub kind: TaskKind,
    pub agent: String,
    pub priority: Priority,
    pub description: String,
    pub payload: Map<String, Value>,
}

impl Task {
    /// Task with a fresh id and an empty payload.
    pub fn new(
        kind: TaskKind,
        agent: impl Into<String>,
        priority: Priority,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            agent: agent.into(),
            priority,
            description: description.into(),
            payload: Map::new(),
        }
    }

    /// Attach a payload field.
    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.payload.insert(key.to_string(), value.into());
        self
    }

    /// Replace the payload wholesale.
    pub fn with_payload(mut self, payload: Map<String, Value>) -> Self {
        self.payload = payload;
        self
    }
}
