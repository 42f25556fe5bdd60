//! Command-line surface for the `autopilot` binary.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::emit::EmitArgs;
use commands::watch::WatchArgs;

/// Top-level command line.
#[derive(Parser, Debug)]
#[command(name = "autopilot", version, about = "Turn repository activity into agent tasks")]
pub struct Cli {
    /// Repository to watch and keep autopilot state in
    #[arg(long, global = true, default_value = ".")]
    pub repo: PathBuf,

    /// Print command results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Poll the repository and enqueue events for new commits and branches
    Watch(WatchArgs),
    /// Drain the queue and forward derived tasks until interrupted
    Orchestrate,
    /// Enqueue a single event by hand
    Emit(EmitArgs),
    /// List pending queue entries
    Queue,
    /// Show the last metrics snapshot written by the orchestrator
    Metrics,
}

/// Report a command failure and exit non-zero.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let body = serde_json::json!({
            "error": err.to_string(),
            "causes": err.chain().skip(1).map(ToString::to_string).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("Error: {err}");
        for cause in err.chain().skip(1) {
            eprintln!("  caused by: {cause}");
        }
    }
    std::process::exit(1);
}
