//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::commands::{analyze::AnalyzeArgs, edit::EditArgs, stats::StatsArgs};

#[derive(Parser, Debug)]
#[command(name = "largefile")]
#[command(about = "Large File Handler - graceful degradation for edits to large files", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to .largefile/config.yaml and .largefile/local.yaml)
    #[arg(long, global = true, env = "LARGEFILE_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Edit a file with graceful degradation
    Edit(EditArgs),

    /// Show size statistics and whether degradation would activate
    Analyze(AnalyzeArgs),

    /// Show strategy success rates from saved results
    Stats(StatsArgs),
}
