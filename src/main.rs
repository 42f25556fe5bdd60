//! Autopilot CLI entry point.

use anyhow::Result;
use clap::Parser;

use autopilot::cli::commands::{emit, metrics, orchestrate, queue, watch};
use autopilot::cli::{handle_error, Cli, Commands};
use autopilot::infrastructure::{ConfigLoader, LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json_mode = cli.json;

    if let Err(err) = run(cli).await {
        handle_error(err, json_mode);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = ConfigLoader::load(&cli.repo)?;
    let _logger = LoggerImpl::init(&LogConfig::from(&config.logging))?;

    match cli.command {
        Commands::Watch(args) => watch::execute(args, &config, &cli.repo).await,
        Commands::Orchestrate => orchestrate::execute(&config, &cli.repo, cli.json).await,
        Commands::Emit(args) => emit::execute(args, &config, &cli.repo, cli.json).await,
        Commands::Queue => queue::execute(&config, &cli.repo, cli.json).await,
        Commands::Metrics => metrics::execute(&config, &cli.repo, cli.json).await,
    }
}
