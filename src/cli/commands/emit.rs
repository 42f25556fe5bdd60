//! `autopilot emit`: put a hand-built event on the queue.

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::info;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Config, EventKind, Priority};
use crate::domain::ports::EventQueue;
use crate::services::create_event;

use super::open_queue;

/// Arguments for `autopilot emit`.
#[derive(Args, Debug)]
pub struct EmitArgs {
    /// Event kind, e.g. session_start or build_failure
    pub kind: String,

    /// Payload fields as a JSON object
    #[arg(short, long)]
    pub data: Option<String>,

    /// Producer name recorded on the event
    #[arg(short, long, default_value = "cli")]
    pub source: String,

    /// Override the kind's default priority
    #[arg(short, long)]
    pub priority: Option<String>,

    /// Mark the event as requiring human approval
    #[arg(long)]
    pub requires_approval: bool,
}

/// Result of `autopilot emit`.
#[derive(Debug, Serialize)]
pub struct EmitOutput {
    pub id: String,
    pub kind: String,
    pub priority: String,
    pub path: String,
}

impl CommandOutput for EmitOutput {
    fn to_human(&self) -> String {
        format!(
            "Enqueued {} event {} ({} priority)\n  {}",
            self.kind, self.id, self.priority, self.path
        )
    }
}

/// Parse `--data` into a field map; absent data is an empty map.
pub fn parse_data(data: Option<&str>) -> Result<Map<String, Value>> {
    let Some(raw) = data else {
        return Ok(Map::new());
    };
    match serde_json::from_str(raw).context("--data is not valid JSON")? {
        Value::Object(map) => Ok(map),
        other => bail!("--data must be a JSON object, got {other}"),
    }
}

/// Build one event and put it on the queue.
pub async fn execute(args: EmitArgs, config: &Config, repo: &Path, json_mode: bool) -> Result<()> {
    let kind: EventKind = args.kind.parse()?;
    let data = parse_data(args.data.as_deref())?;

    let mut event = create_event(kind, &data, args.source);
    if let Some(priority) = args.priority {
        event.priority = priority.parse::<Priority>()?;
    }
    event.requires_human_approval = args.requires_approval;

    let queue = open_queue(config, repo);
    queue.put(&event).await.context("Failed to enqueue event")?;
    info!(event_id = %event.id, kind = %event.kind, "Event emitted");

    output(
        &EmitOutput {
            id: event.id.to_string(),
            kind: event.kind.to_string(),
            priority: event.priority.to_string(),
            path: queue.entry_path(&event.id.to_string()).display().to_string(),
        },
        json_mode,
    );
    Ok(())
}
