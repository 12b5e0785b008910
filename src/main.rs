//! Large file handler CLI entry point.

use anyhow::Result;
use clap::Parser;

use largefile::cli::{commands, handle_error, Cli, Commands};
use largefile::infrastructure::config::ConfigLoader;
use largefile::infrastructure::logging::{LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json = cli.json;
    if let Err(err) = run(cli).await {
        handle_error(err, json);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };

    let _guard = LoggerImpl::init(&LogConfig::from_settings(&config.logging)?)?;
    tracing::debug!(max_lines = config.max_lines, "configuration loaded");

    match cli.command {
        Commands::Edit(args) => commands::edit::execute(args, config, cli.json).await,
        Commands::Analyze(args) => commands::analyze::execute(args, &config, cli.json).await,
        Commands::Stats(args) => commands::stats::execute(args, cli.json).await,
    }
}
