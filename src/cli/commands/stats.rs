//! Implementation of the `largefile stats` command.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::cli::output::{output, CommandOutput};
use crate::services::{OutcomeRecord, PerformanceMonitor, PerformanceSummary};

const USAGE_HINT: &str = "No results file found. Outcomes are not persisted between runs; \
     `edit` saves each one as <file>.result.json.\n\
     Pass --results-file with one of those files (or a JSON array of them).";

#[derive(Args, Debug)]
pub struct StatsArgs {
    /// JSON file holding one saved result or an array of them
    #[arg(long)]
    pub results_file: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct SummaryOutput {
    #[serde(skip)]
    pub report: String,
    #[serde(flatten)]
    pub summary: PerformanceSummary,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum StatsOutput {
    Summary(SummaryOutput),
    Hint { message: String },
}

impl CommandOutput for StatsOutput {
    fn to_human(&self) -> String {
        match self {
            Self::Summary(summary) => summary.report.clone(),
            Self::Hint { message } => message.clone(),
        }
    }
}

/// Parses either a single saved outcome or an array of them.
pub fn parse_records(raw: &str) -> Result<Vec<OutcomeRecord>> {
    let value: serde_json::Value = serde_json::from_str(raw).context("Results file is not valid JSON")?;
    let records = if value.is_array() {
        serde_json::from_value(value)?
    } else {
        vec![serde_json::from_value(value)?]
    };
    Ok(records)
}

async fn load_records(path: &Path) -> Result<Vec<OutcomeRecord>> {
    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_records(&raw)
}

pub async fn execute(args: StatsArgs, json_mode: bool) -> Result<()> {
    let result = match args.results_file {
        Some(path) if fs::try_exists(&path).await.unwrap_or(false) => {
            let records = load_records(&path).await?;
            StatsOutput::Summary(SummaryOutput {
                report: PerformanceMonitor::generate_report(&records),
                summary: PerformanceMonitor::summarize(&records),
            })
        }
        _ => StatsOutput::Hint {
            message: USAGE_HINT.to_string(),
        },
    };
    output(&result, json_mode);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_result_document() {
        let raw = r#"{"success": true, "strategy": "four_phase", "details": {"kind": "direct", "bytes_written": 3}}"#;
        let records = parse_records(raw).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].success);
        assert_eq!(records[0].strategy.as_deref(), Some("four_phase"));
    }

    #[test]
    fn test_parse_array_with_missing_fields() {
        let raw = r#"[{"success": false}, {"strategy": "chunked_application"}]"#;
        let records = parse_records(raw).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].strategy, None);
        assert!(!records[1].success);
    }

    #[tokio::test]
    async fn test_missing_results_file_yields_guidance() {
        let args = StatsArgs {
            results_file: Some(PathBuf::from("/nonexistent/results.json")),
        };
        assert!(execute(args, true).await.is_ok());
        assert!(USAGE_HINT.contains("not persisted"));
        assert!(USAGE_HINT.contains("--results-file"));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_records("not json").is_err());
    }

    #[test]
    fn test_summary_json_omits_rendered_report() {
        let records = parse_records(r#"[{"success": true, "strategy": "four_phase"}]"#).unwrap();
        let out = StatsOutput::Summary(SummaryOutput {
            report: PerformanceMonitor::generate_report(&records),
            summary: PerformanceMonitor::summarize(&records),
        });
        let json = out.to_json();
        assert_eq!(json["total"], 1);
        assert_eq!(json["strategies"]["four_phase"]["successes"], 1);
        assert!(json.get("report").is_none());
    }
}
