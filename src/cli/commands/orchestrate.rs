//! `autopilot orchestrate`: run the event loop.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use crate::adapters::executor_from_config;
use crate::domain::models::Config;
use crate::domain::ports::TokioTicker;
use crate::services::Orchestrator;

use super::metrics::MetricsOutput;
use super::open_queue;
use crate::cli::output::output;

/// Run the orchestrator until interrupted, then print its metrics.
pub async fn execute(config: &Config, repo: &Path, json_mode: bool) -> Result<()> {
    let queue = open_queue(config, repo);
    let executor = executor_from_config(&config.executor);
    info!(
        queue = %queue.directory().display(),
        executor = executor.name(),
        "Starting orchestrator"
    );

    let mut orchestrator = Orchestrator::new(
        Arc::new(queue),
        executor,
        Arc::new(TokioTicker),
        config.orchestrator.clone(),
    );
    if let Some(path) = config.orchestrator.resolve_metrics_file(repo) {
        orchestrator = orchestrator.with_metrics_file(path);
    }

    // The interrupt only asks the loop to stop; the current tick always
    // runs to completion.
    let run = orchestrator.run();
    tokio::pin!(run);
    tokio::select! {
        () = &mut run => {}
        signal = tokio::signal::ctrl_c() => {
            match signal {
                Ok(()) => info!("Interrupt received, stopping orchestrator"),
                Err(e) => warn!(error = %e, "Failed to listen for Ctrl-C, stopping orchestrator"),
            }
            orchestrator.stop();
            run.as_mut().await;
        }
    }

    output(&MetricsOutput::from(orchestrator.metrics().await), json_mode);
    Ok(())
}
