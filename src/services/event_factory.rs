//! Centralized event construction helpers.
//!
//! Holds the static kind → defaults registry and builds `AutomationEvent`s
//! with a fresh id, the current timestamp and the registry defaults. Producers
//! may override priority, complexity and patterns afterwards, before enqueue.

use chrono::Utc;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::domain::models::{agents, AutomationEvent, EventKind, EventPayload, Priority};

/// Registry defaults for one event kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub priority: Priority,
    pub suggested_agents: Vec<String>,
    pub related_patterns: Vec<String>,
}

struct RegistryEntry {
    kind: EventKind,
    priority: Priority,
    agents: &'static [&'static str],
    patterns: &'static [&'static str],
}

const REGISTRY: &[RegistryEntry] = &[
    RegistryEntry {
        kind: EventKind::NewCommit,
        priority: Priority::High,
        agents: &[agents::PATTERN_SPECIALIST, agents::LEAD_REVIEWER],
        patterns: &["pattern-extraction", "code-review"],
    },
    RegistryEntry {
        kind: EventKind::SessionStart,
        priority: Priority::High,
        agents: &[agents::LEAD_REVIEWER, agents::STRATEGIC_PLANNER],
        patterns: &["session-planning", "task-prioritization"],
    },
    RegistryEntry {
        kind: EventKind::BuildFailure,
        priority: Priority::Critical,
        agents: &[agents::LEAD_REVIEWER],
        patterns: &["error-diagnosis", "quick-fix"],
    },
    RegistryEntry {
        kind: EventKind::PatternDiscovered,
        priority: Priority::Medium,
        agents: &[agents::PATTERN_SPECIALIST],
        patterns: &["pattern-documentation", "pattern-validation"],
    },
];

/// Look up the registry defaults for a kind.
///
/// Kinds without an entry get `Medium` priority and no agents or patterns.
pub fn classify(kind: EventKind) -> Classification {
    let to_owned = |items: &[&str]| items.iter().map(|s| (*s).to_string()).collect();

    REGISTRY
        .iter()
        .find(|entry| entry.kind == kind)
        .map_or_else(
            || Classification {
                priority: Priority::Medium,
                suggested_agents: vec![],
                related_patterns: vec![],
            },
            |entry| Classification {
                priority: entry.priority,
                suggested_agents: to_owned(entry.agents),
                related_patterns: to_owned(entry.patterns),
            },
        )
}

/// Build an event from a loose field map.
///
/// Family-specific fields are extracted permissively; see
/// [`EventPayload::from_map_lenient`].
pub fn create_event(
    kind: EventKind,
    data: &Map<String, Value>,
    source: impl Into<String>,
) -> AutomationEvent {
    make_event(kind, EventPayload::from_map_lenient(kind, data), source)
}

/// Build an event from an already-typed payload.
///
/// The payload must belong to `kind`'s family.
pub fn make_event(
    kind: EventKind,
    payload: EventPayload,
    source: impl Into<String>,
) -> AutomationEvent {
    let defaults = classify(kind);
    AutomationEvent {
        id: Uuid::new_v4(),
        kind,
        timestamp: Utc::now(),
        source: source.into(),
        priority: defaults.priority,
        payload,
        requires_human_approval: false,
        estimated_complexity: None,
        suggested_agents: defaults.suggested_agents,
        related_patterns: defaults.related_patterns,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::PayloadFamily;
    use serde_json::json;

    #[test]
    fn test_classify_registered_kinds() {
        let commit = classify(EventKind::NewCommit);
        assert_eq!(commit.priority, Priority::High);
        assert_eq!(commit.suggested_agents, vec!["framework-architect", "cto"]);
        assert_eq!(commit.related_patterns, vec!["pattern-extraction", "code-review"]);

        let build = classify(EventKind::BuildFailure);
        assert_eq!(build.priority, Priority::Critical);
        assert_eq!(build.suggested_agents, vec!["cto"]);

        let session = classify(EventKind::SessionStart);
        assert_eq!(session.suggested_agents, vec!["cto", "strategic-advisor"]);

        let pattern = classify(EventKind::PatternDiscovered);
        assert_eq!(pattern.priority, Priority::Medium);
    }

    #[test]
    fn test_classify_unregistered_kind_defaults() {
        for kind in [EventKind::NewBranch, EventKind::LintError, EventKind::WeeklyReview] {
            let defaults = classify(kind);
            assert_eq!(defaults.priority, Priority::Medium);
            assert!(defaults.suggested_agents.is_empty());
            assert!(defaults.related_patterns.is_empty());
        }
    }

    #[test]
    fn test_create_event_assigns_unique_ids() {
        let data = Map::new();
        let a = create_event(EventKind::SessionStart, &data, "cli");
        let b = create_event(EventKind::SessionStart, &data, "cli");
        assert_ne!(a.id, b.id);
        assert_eq!(a.source, "cli");
        assert_eq!(a.priority, Priority::High);
        assert!(!a.requires_human_approval);
        assert!(a.estimated_complexity.is_none());
    }

    #[test]
    fn test_create_event_extracts_family_fields() {
        let data = match json!({
            "buildId": "ci-881",
            "buildUrl": "https://ci.example/881",
            "failedTests": ["queue::drain", "watcher::tick"]
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };

        let event = create_event(EventKind::TestFailure, &data, "ci");
        assert_eq!(event.kind.payload_family(), PayloadFamily::Build);
        let build = event.build().expect("build payload");
        assert_eq!(build.build_id, "ci-881");
        assert_eq!(build.failed_tests.len(), 2);
        assert_eq!(build.error_message, "");
        assert_eq!(event.priority, Priority::Medium);
    }
}
