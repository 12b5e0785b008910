//! Implementation of the `largefile edit` command.

use anyhow::{Context, Result};
use clap::{ArgGroup, Args};
use console::style;
use serde::Serialize;
use std::path::PathBuf;
use tokio::fs;

use crate::cli::output::{output, rule, CommandOutput};
use crate::domain::models::{Config, OutcomeDetails, StrategyOutcome};
use crate::services::backup_store::suffixed_path;
use crate::services::DegradationController;

pub const RESULT_SUFFIX: &str = ".result.json";

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("source").required(true).args(["new_content", "content"])))]
pub struct EditArgs {
    /// Path to file to edit
    #[arg(short, long)]
    pub file: PathBuf,

    /// Path to file containing new content
    #[arg(short, long)]
    pub new_content: Option<PathBuf>,

    /// New content as string
    #[arg(short, long)]
    pub content: Option<String>,

    /// Operation name; only high-risk operations engage the fallback chain
    #[arg(long, default_value = "edit")]
    pub operation: String,
}

#[derive(Debug, Serialize)]
pub struct EditOutput {
    pub result_path: PathBuf,
    #[serde(flatten)]
    pub outcome: StrategyOutcome,
}

impl CommandOutput for EditOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![String::new(), rule()];
        if self.outcome.success {
            lines.push(format!(
                "{} Strategy used - {}",
                style("SUCCESS:").green().bold(),
                self.outcome.strategy
            ));
        } else {
            lines.push(format!(
                "{} {}",
                style("FAILED:").red().bold(),
                self.outcome.error_message()
            ));
            match &self.outcome.details {
                Some(OutcomeDetails::ManualReport { report_path, .. }) => {
                    lines.push(String::new());
                    lines.push("Manual modification guide generated.".to_string());
                    if let Some(path) = report_path {
                        lines.push(format!("Report saved to: {}", path.display()));
                    }
                }
                Some(OutcomeDetails::Script { script_path, .. }) => {
                    lines.push(format!("Review and run: {}", script_path.display()));
                }
                _ => {}
            }
        }
        lines.push(rule());
        lines.push(format!("Result saved to: {}", self.result_path.display()));
        lines.join("\n")
    }
}

pub async fn execute(args: EditArgs, config: Config, json_mode: bool) -> Result<()> {
    let new_content = match (&args.new_content, args.content) {
        (Some(source), _) => fs::read_to_string(source)
            .await
            .with_context(|| format!("Failed to read new content from {}", source.display()))?,
        (None, Some(content)) => content,
        (None, None) => anyhow::bail!("Must provide --new-content or --content"),
    };

    let controller = DegradationController::new(config);
    let outcome = controller
        .execute(&args.operation, &args.file, Some(new_content))
        .await;

    let result_path = suffixed_path(&args.file, RESULT_SUFFIX);
    let serialized = serde_json::to_string_pretty(&outcome).context("Failed to serialize result")?;
    fs::write(&result_path, serialized)
        .await
        .with_context(|| format!("Failed to write {}", result_path.display()))?;

    output(
        &EditOutput {
            result_path,
            outcome,
        },
        json_mode,
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::StrategyKind;

    #[test]
    fn test_human_output_on_success() {
        let out = EditOutput {
            result_path: PathBuf::from("a.txt.result.json"),
            outcome: StrategyOutcome::success(StrategyKind::FourPhase),
        };
        let text = console::strip_ansi_codes(&out.to_human()).to_string();
        assert!(text.contains("SUCCESS: Strategy used - four_phase"));
        assert!(text.ends_with("Result saved to: a.txt.result.json"));
    }

    #[test]
    fn test_json_output_flattens_outcome() {
        let out = EditOutput {
            result_path: PathBuf::from("a.txt.result.json"),
            outcome: StrategyOutcome::failure(StrategyKind::FinalFallback, "stuck"),
        };
        let json = out.to_json();
        assert_eq!(json["success"], false);
        assert_eq!(json["strategy"], "final_fallback");
        assert_eq!(json["error"], "stuck");
        assert_eq!(json["result_path"], "a.txt.result.json");
    }
}
