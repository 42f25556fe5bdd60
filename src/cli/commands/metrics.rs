//! `autopilot metrics`: show the last metrics snapshot.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::output::{output, table, CommandOutput};
use crate::domain::models::{Config, MetricsSnapshot};
use crate::services::read_metrics_snapshot;

/// Metrics snapshot plus derived uptime.
#[derive(Debug, Serialize)]
pub struct MetricsOutput {
    #[serde(flatten)]
    pub snapshot: MetricsSnapshot,
    pub uptime_secs: i64,
}

impl From<MetricsSnapshot> for MetricsOutput {
    fn from(snapshot: MetricsSnapshot) -> Self {
        Self {
            uptime_secs: snapshot.uptime().num_seconds(),
            snapshot,
        }
    }
}

impl CommandOutput for MetricsOutput {
    fn to_human(&self) -> String {
        let s = &self.snapshot;
        let mut t = table(&["Metric", "Value"]);
        t.add_row(vec!["Events processed".to_string(), s.events_processed.to_string()]);
        t.add_row(vec!["Tasks created".to_string(), s.tasks_created.to_string()]);
        t.add_row(vec!["Tasks completed".to_string(), s.tasks_completed.to_string()]);
        t.add_row(vec!["Tasks failed".to_string(), s.tasks_failed.to_string()]);
        t.add_row(vec!["Automation rate".to_string(), format!("{:.1}%", s.automation_rate)]);
        t.add_row(vec![
            "Avg response time".to_string(),
            format!("{:.3}s", s.average_response_time_secs),
        ]);
        t.add_row(vec!["Uptime".to_string(), format!("{}s", self.uptime_secs)]);
        t.add_row(vec!["Captured at".to_string(), s.captured_at.to_rfc3339()]);
        t.to_string()
    }
}

/// Print the last snapshot written by the orchestrator.
pub async fn execute(config: &Config, repo: &Path, json_mode: bool) -> Result<()> {
    let path = config
        .orchestrator
        .resolve_metrics_file(repo)
        .context("orchestrator.metrics_file is not configured")?;
    let snapshot = read_metrics_snapshot(&path)
        .await
        .with_context(|| format!("No metrics snapshot at {} (has the orchestrator run?)", path.display()))?;

    output(&MetricsOutput::from(snapshot), json_mode);
    Ok(())
}
