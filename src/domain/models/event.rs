//! Automation event domain model.
//!
//! An `AutomationEvent` is a typed, prioritized record of something observed in
//! the repository (or injected manually). Events are built by a producer,
//! serialized once into the queue and decoded once by the orchestrator.
//!
//! The payload is a tagged union keyed by the kind family; the wire record keeps
//! it as an open JSON object so that the queue format stays a flat map.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};

/// Every kind of event the pipeline knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    // Git events
    NewCommit,
    NewBranch,
    PrCreated,
    PrMerged,

    // Time-based events
    SessionStart,
    SessionEnd,
    DailyStandup,
    WeeklyReview,

    // Build/test events
    BuildFailure,
    TestFailure,
    LintError,
    TypeError,

    // Pattern events
    PatternDiscovered,
    PatternApplied,
    AccelerationMilestone,

    // Business events
    IssueCreated,
    RequirementAdded,
    StakeholderFeedback,
}

impl EventKind {
    /// All kinds, in declaration order.
    pub const ALL: [EventKind; 18] = [
        Self::NewCommit,
        Self::NewBranch,
        Self::PrCreated,
        Self::PrMerged,
        Self::SessionStart,
        Self::SessionEnd,
        Self::DailyStandup,
        Self::WeeklyReview,
        Self::BuildFailure,
        Self::TestFailure,
        Self::LintError,
        Self::TypeError,
        Self::PatternDiscovered,
        Self::PatternApplied,
        Self::AccelerationMilestone,
        Self::IssueCreated,
        Self::RequirementAdded,
        Self::StakeholderFeedback,
    ];

    /// Wire name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NewCommit => "new_commit",
            Self::NewBranch => "new_branch",
            Self::PrCreated => "pr_created",
            Self::PrMerged => "pr_merged",
            Self::SessionStart => "session_start",
            Self::SessionEnd => "session_end",
            Self::DailyStandup => "daily_standup",
            Self::WeeklyReview => "weekly_review",
            Self::BuildFailure => "build_failure",
            Self::TestFailure => "test_failure",
            Self::LintError => "lint_error",
            Self::TypeError => "type_error",
            Self::PatternDiscovered => "pattern_discovered",
            Self::PatternApplied => "pattern_applied",
            Self::AccelerationMilestone => "acceleration_milestone",
            Self::IssueCreated => "issue_created",
            Self::RequirementAdded => "requirement_added",
            Self::StakeholderFeedback => "stakeholder_feedback",
        }
    }

    /// Which payload family this kind carries.
    ///
    /// Only the kinds with dedicated fields map to a typed family; lint and
    /// type errors, for instance, keep their raw payload.
    pub fn payload_family(&self) -> PayloadFamily {
        match self {
            Self::NewCommit | Self::NewBranch | Self::PrCreated | Self::PrMerged => {
                PayloadFamily::Git
            }
            Self::BuildFailure | Self::TestFailure => PayloadFamily::Build,
            Self::PatternDiscovered | Self::PatternApplied => PayloadFamily::Pattern,
            _ => PayloadFamily::Generic,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| DomainError::UnknownKind(s.to_string()))
    }
}

/// Payload family of an event kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadFamily {
    /// Commits, branches and pull requests
    Git,
    /// Build, test, lint and type failures
    Build,
    /// Pattern discovery and application
    Pattern,
    /// Free-form fields
    Generic,
}

/// Event priority. Ordering follows urgency: `Critical > High > Medium > Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Process when convenient
    Low,
    /// Process within 30 minutes
    Medium,
    /// Process within 5 minutes
    High,
    /// Requires immediate action
    Critical,
}

impl Priority {
    /// Wire name of the priority.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(DomainError::UnknownPriority(s.to_string())),
        }
    }
}

/// Added/deleted line counts for one file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffStat {
    /// Lines added
    pub additions: u64,
    /// Lines deleted
    pub deletions: u64,
}

impl DiffStat {
    /// Lines added plus lines deleted.
    pub fn total(&self) -> u64 {
        self.additions + self.deletions
    }
}

/// Fields carried by git-family events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GitPayload {
    pub repository: String,
    pub branch: String,
    pub commit_hash: String,
    pub author: String,
    pub files_changed: Vec<String>,
    pub diff_stats: BTreeMap<String, DiffStat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Branch that was checked out when a new branch was observed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_from: Option<String>,
}

/// Fields carried by build/test failure events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuildPayload {
    pub build_id: String,
    pub build_url: String,
    pub error_message: String,
    pub failed_tests: Vec<String>,
    pub log_excerpt: String,
}

/// Fields carried by pattern events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatternPayload {
    pub pattern_name: String,
    pub category: String,
    pub acceleration_factor: f64,
    pub confidence_score: f64,
    pub context: Map<String, Value>,
}

/// Kind-specific payload of an event.
#[derive(Debug, Clone, PartialEq)]
pub enum EventPayload {
    /// See [`PayloadFamily::Git`]
    Git(GitPayload),
    /// See [`PayloadFamily::Build`]
    Build(BuildPayload),
    /// See [`PayloadFamily::Pattern`]
    Pattern(PatternPayload),
    /// Fields kept as given
    Generic(Map<String, Value>),
}

impl EventPayload {
    /// Build a payload from a loose field map.
    ///
    /// Missing or wrongly-typed fields fall back to empty strings, empty lists
    /// and zero. This never fails; it is what producers use.
    pub fn from_map_lenient(kind: EventKind, data: &Map<String, Value>) -> Self {
        match kind.payload_family() {
            PayloadFamily::Git => Self::Git(GitPayload {
                repository: str_field(data, "repository"),
                branch: str_field(data, "branch"),
                commit_hash: str_field(data, "commitHash"),
                author: str_field(data, "author"),
                files_changed: str_list_field(data, "filesChanged"),
                diff_stats: diff_stats_field(data, "diffStats"),
                subject: data.get("subject").and_then(Value::as_str).map(str::to_string),
                created_from: data
                    .get("createdFrom")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            }),
            PayloadFamily::Build => Self::Build(BuildPayload {
                build_id: str_field(data, "buildId"),
                build_url: str_field(data, "buildUrl"),
                error_message: str_field(data, "errorMessage"),
                failed_tests: str_list_field(data, "failedTests"),
                log_excerpt: str_field(data, "logExcerpt"),
            }),
            PayloadFamily::Pattern => Self::Pattern(PatternPayload {
                pattern_name: str_field(data, "patternName"),
                category: str_field(data, "category"),
                acceleration_factor: data
                    .get("accelerationFactor")
                    .and_then(Value::as_f64)
                    .unwrap_or_default(),
                confidence_score: data
                    .get("confidenceScore")
                    .and_then(Value::as_f64)
                    .unwrap_or_default(),
                context: data
                    .get("context")
                    .and_then(Value::as_object)
                    .cloned()
                    .unwrap_or_default(),
            }),
            PayloadFamily::Generic => Self::Generic(data.clone()),
        }
    }

    /// Decode a payload received over the wire.
    ///
    /// Unlike [`EventPayload::from_map_lenient`], fields present with the wrong
    /// type are rejected. Missing fields still take their defaults.
    pub fn from_wire(kind: EventKind, data: Map<String, Value>) -> DomainResult<Self> {
        let value = Value::Object(data);
        let payload = match kind.payload_family() {
            PayloadFamily::Git => Self::Git(serde_json::from_value(value)?),
            PayloadFamily::Build => Self::Build(serde_json::from_value(value)?),
            PayloadFamily::Pattern => Self::Pattern(serde_json::from_value(value)?),
            PayloadFamily::Generic => match value {
                Value::Object(map) => Self::Generic(map),
                _ => Self::Generic(Map::new()),
            },
        };
        Ok(payload)
    }

    /// Flatten the payload into an open field map.
    pub fn to_map(&self) -> DomainResult<Map<String, Value>> {
        let value = match self {
            Self::Git(p) => serde_json::to_value(p)?,
            Self::Build(p) => serde_json::to_value(p)?,
            Self::Pattern(p) => serde_json::to_value(p)?,
            Self::Generic(map) => return Ok(map.clone()),
        };
        match value {
            Value::Object(map) => Ok(map),
            other => Err(DomainError::SerializationError(format!(
                "payload did not serialize to an object: {other}"
            ))),
        }
    }
}

fn str_field(data: &Map<String, Value>, key: &str) -> String {
    data.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn str_list_field(data: &Map<String, Value>, key: &str) -> Vec<String> {
    data.get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn diff_stats_field(data: &Map<String, Value>, key: &str) -> BTreeMap<String, DiffStat> {
    let Some(stats) = data.get(key).and_then(Value::as_object) else {
        return BTreeMap::new();
    };
    stats
        .iter()
        .map(|(path, stat)| {
            let count = |field: &str| stat.get(field).and_then(Value::as_u64).unwrap_or_default();
            (
                path.clone(),
                DiffStat {
                    additions: count("additions"),
                    deletions: count("deletions"),
                },
            )
        })
        .collect()
}

/// A typed, prioritized record of an observed condition.
#[derive(Debug, Clone, PartialEq)]
pub struct AutomationEvent {
    pub id: Uuid,
    pub kind: EventKind,
    pub timestamp: DateTime<Utc>,
    /// Name of the producer that detected the event.
    pub source: String,
    pub priority: Priority,
    pub payload: EventPayload,
    pub requires_human_approval: bool,
    /// Heuristic 0-100 significance score, if the producer computed one.
    pub estimated_complexity: Option<f64>,
    pub suggested_agents: Vec<String>,
    pub related_patterns: Vec<String>,
}

impl AutomationEvent {
    /// Git payload, for git-family kinds.
    pub fn git(&self) -> Option<&GitPayload> {
        match &self.payload {
            EventPayload::Git(p) => Some(p),
            _ => None,
        }
    }

    /// Build payload, for build and test failures.
    pub fn build(&self) -> Option<&BuildPayload> {
        match &self.payload {
            EventPayload::Build(p) => Some(p),
            _ => None,
        }
    }

    /// Pattern payload, for pattern kinds.
    pub fn pattern(&self) -> Option<&PatternPayload> {
        match &self.payload {
            EventPayload::Pattern(p) => Some(p),
            _ => None,
        }
    }

    /// Flatten into the canonical wire record.
    pub fn to_wire(&self) -> DomainResult<WireEvent> {
        Ok(WireEvent {
            id: self.id.to_string(),
            kind: self.kind.as_str().to_string(),
            timestamp: self.timestamp,
            source: self.source.clone(),
            priority: self.priority.as_str().to_string(),
            payload: self.payload.to_map()?,
            requires_human_approval: self.requires_human_approval,
            estimated_complexity: self.estimated_complexity,
            suggested_agents: self.suggested_agents.clone(),
            related_patterns: self.related_patterns.clone(),
        })
    }
}

/// Canonical serialized shape of an event, as stored in the queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireEvent {
    pub id: String,
    pub kind: String,
    pub timestamp: DateTime<Utc>,
    pub source: String,
    pub priority: String,
    #[serde(default)]
    pub payload: Map<String, Value>,
    #[serde(default)]
    pub requires_human_approval: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_complexity: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggested_agents: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_patterns: Vec<String>,
}

impl TryFrom<WireEvent> for AutomationEvent {
    type Error = DomainError;

    fn try_from(wire: WireEvent) -> Result<Self, Self::Error> {
        let kind: EventKind = wire.kind.parse()?;
        let priority: Priority = wire.priority.parse()?;
        let id = Uuid::parse_str(&wire.id).map_err(|e| {
            DomainError::SerializationError(format!("invalid event id '{}': {e}", wire.id))
        })?;

        if let Some(score) = wire.estimated_complexity {
            if !(0.0..=100.0).contains(&score) {
                return Err(DomainError::SerializationError(format!(
                    "estimatedComplexity {score} outside 0-100"
                )));
            }
        }

        Ok(Self {
            id,
            kind,
            timestamp: wire.timestamp,
            source: wire.source,
            priority,
            payload: EventPayload::from_wire(kind, wire.payload)?,
            requires_human_approval: wire.requires_human_approval,
            estimated_complexity: wire.estimated_complexity,
            suggested_agents: wire.suggested_agents,
            related_patterns: wire.related_patterns,
        })
    }
}
