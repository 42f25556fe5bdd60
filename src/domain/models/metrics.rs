//! Automation metrics snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point-in-time view of the orchestrator's counters.
///
/// This is what the orchestrator writes to its metrics file and what the
/// `metrics` command reads back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub events_processed: u64,
    pub tasks_created: u64,
    pub tasks_completed: u64,
    pub tasks_failed: u64,
    /// Completed tasks as a percentage of created tasks
    pub automation_rate: f64,
    /// Running mean of per-event processing time
    pub average_response_time_secs: f64,
    pub started_at: DateTime<Utc>,
    pub captured_at: DateTime<Utc>,
}

impl MetricsSnapshot {
    /// Time since the tracker started, at capture time.
    pub fn uptime(&self) -> chrono::Duration {
        self.captured_at.signed_duration_since(self.started_at)
    }
}
