//! `autopilot queue`: list pending events.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::output::{output, table, truncate, CommandOutput};
use crate::domain::models::{AutomationEvent, Config};
use crate::domain::ports::EventQueue;

use super::open_queue;

/// One decodable pending event.
#[derive(Debug, Serialize)]
pub struct QueueEntry {
    pub id: String,
    pub kind: String,
    pub priority: String,
    pub source: String,
    pub timestamp: String,
}

impl From<&AutomationEvent> for QueueEntry {
    fn from(event: &AutomationEvent) -> Self {
        Self {
            id: event.id.to_string(),
            kind: event.kind.to_string(),
            priority: event.priority.to_string(),
            source: event.source.clone(),
            timestamp: event.timestamp.to_rfc3339(),
        }
    }
}

/// Result of `autopilot queue`.
#[derive(Debug, Serialize)]
pub struct QueueOutput {
    pub directory: String,
    /// Entry files present, including ones that will be dropped as malformed
    pub pending: usize,
    pub events: Vec<QueueEntry>,
}

impl CommandOutput for QueueOutput {
    fn to_human(&self) -> String {
        if self.pending == 0 {
            return format!("Queue {} is empty.", self.directory);
        }

        let mut t = table(&["ID", "Kind", "Priority", "Source", "Timestamp"]);
        for entry in &self.events {
            t.add_row(vec![
                truncate(&entry.id, 11),
                entry.kind.clone(),
                entry.priority.clone(),
                entry.source.clone(),
                entry.timestamp.clone(),
            ]);
        }

        let mut lines = vec![format!("{} pending in {}", self.pending, self.directory)];
        let unreadable = self.pending.saturating_sub(self.events.len());
        if unreadable > 0 {
            lines.push(format!("{unreadable} unreadable entries will be dropped on the next drain"));
        }
        lines.push(t.to_string());
        lines.join("\n")
    }
}

/// List pending queue entries without consuming them.
pub async fn execute(config: &Config, repo: &Path, json_mode: bool) -> Result<()> {
    let queue = open_queue(config, repo);
    let pending = queue.pending().await.context("Failed to list queue entries")?;
    let events = queue.peek().await.context("Failed to read queue entries")?;

    output(
        &QueueOutput {
            directory: queue.directory().display().to_string(),
            pending: pending.len(),
            events: events.iter().map(QueueEntry::from).collect(),
        },
        json_mode,
    );
    Ok(())
}
