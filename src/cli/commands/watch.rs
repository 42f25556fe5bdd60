//! `autopilot watch`: run the repository watcher.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use tracing::{info, warn};

use crate::adapters::GitCliRepository;
use crate::domain::models::Config;
use crate::domain::ports::TokioTicker;
use crate::services::SourceWatcher;

use super::open_queue;

/// Arguments for `autopilot watch`.
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Seconds between polls (overrides watcher.poll_interval_secs)
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: Option<u64>,
}

/// Run the source watcher until interrupted.
pub async fn execute(args: WatchArgs, config: &Config, repo: &Path) -> Result<()> {
    let mut watcher_config = config.watcher.clone();
    if let Some(interval) = args.interval {
        watcher_config.poll_interval_secs = interval;
    }

    let queue = open_queue(config, repo);
    info!(
        repository = %repo.display(),
        queue = %queue.directory().display(),
        poll_interval_secs = watcher_config.poll_interval_secs,
        "Starting source watcher"
    );

    let watcher = SourceWatcher::new(
        Arc::new(GitCliRepository::new(repo)),
        Arc::new(queue),
        Arc::new(TokioTicker),
        watcher_config,
    );

    // The interrupt only asks the loop to stop; the current tick always
    // runs to completion.
    let run = watcher.run();
    tokio::pin!(run);
    tokio::select! {
        () = &mut run => {}
        signal = tokio::signal::ctrl_c() => {
            match signal {
                Ok(()) => info!("Interrupt received, stopping watcher"),
                Err(e) => warn!(error = %e, "Failed to listen for Ctrl-C, stopping watcher"),
            }
            watcher.stop();
            run.as_mut().await;
        }
    }

    Ok(())
}
