//! Implementation of the `largefile analyze` command.

use anyhow::{Context, Result};
use clap::Args;
use comfy_table::{presets, Cell, CellAlignment, ContentArrangement, Table};
use console::style;
use serde::Serialize;
use std::path::PathBuf;
use tokio::fs;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;
use crate::services::FileStats;

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Path to file to analyze
    #[arg(short, long)]
    pub file: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeOutput {
    pub file: PathBuf,
    #[serde(flatten)]
    pub stats: FileStats,
    pub threshold: usize,
    pub degradation_active: bool,
}

impl CommandOutput for AnalyzeOutput {
    fn to_human(&self) -> String {
        let mut table = Table::new();
        table
            .load_preset(presets::NOTHING)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(["METRIC", "VALUE"].map(|h| Cell::new(h).set_alignment(CellAlignment::Left)));
        table.add_row(["Total lines".to_string(), self.stats.total_lines.to_string()]);
        table.add_row(["Non-empty lines".to_string(), self.stats.non_empty_lines.to_string()]);
        table.add_row(["Total characters".to_string(), self.stats.total_chars.to_string()]);
        table.add_row(["Estimated tokens".to_string(), self.stats.estimated_tokens.to_string()]);
        table.add_row(["Threshold".to_string(), format!("{} lines", self.threshold)]);

        let verdict = if self.degradation_active {
            style("Graceful degradation ACTIVE for this file").yellow().bold()
        } else {
            style("Normal operation (under threshold)").green()
        };

        format!(
            "\nFile Analysis: {}\n{}\n\n{verdict}",
            self.file.display(),
            table
        )
    }
}

pub async fn execute(args: AnalyzeArgs, config: &Config, json_mode: bool) -> Result<()> {
    if !fs::try_exists(&args.file).await.unwrap_or(false) {
        anyhow::bail!("File not found: {}", args.file.display());
    }
    let content = fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    let stats = FileStats::from_content(&content);
    let output_data = AnalyzeOutput {
        degradation_active: stats.total_lines > config.max_lines,
        threshold: config.max_lines,
        file: args.file,
        stats,
    };
    output(&output_data, json_mode);
    Ok(())
}
