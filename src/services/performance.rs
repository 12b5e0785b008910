//! Success-rate reporting over saved outcomes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const UNKNOWN_STRATEGY: &str = "unknown";

/// Minimal view of a saved outcome. Extra fields in the source JSON are
/// ignored, so full `<file>.result.json` documents load as records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub strategy: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StrategyStats {
    pub successes: usize,
    pub total: usize,
}

impl StrategyStats {
    pub fn rate(&self) -> f64 {
        percentage(self.successes, self.total)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceSummary {
    pub total: usize,
    pub successes: usize,
    pub failures: usize,
    pub success_rate: f64,
    /// Keyed and ordered by strategy name
    pub strategies: BTreeMap<String, StrategyStats>,
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let rate = part as f64 / whole as f64 * 100.0;
    rate
}

pub struct PerformanceMonitor;

impl PerformanceMonitor {
    pub fn summarize(records: &[OutcomeRecord]) -> PerformanceSummary {
        let mut strategies: BTreeMap<String, StrategyStats> = BTreeMap::new();
        for record in records {
            let name = record.strategy.as_deref().unwrap_or(UNKNOWN_STRATEGY);
            let stats = strategies.entry(name.to_string()).or_default();
            stats.total += 1;
            if record.success {
                stats.successes += 1;
            }
        }

        let total = records.len();
        let successes = records.iter().filter(|r| r.success).count();
        PerformanceSummary {
            total,
            successes,
            failures: total - successes,
            success_rate: percentage(successes, total),
            strategies,
        }
    }

    pub fn generate_report(records: &[OutcomeRecord]) -> String {
        if records.is_empty() {
            return "No results to report".to_string();
        }
        let summary = Self::summarize(records);

        let mut lines = vec![
            "Large File Handler Performance Report".to_string(),
            "=".repeat(40),
            format!("Total attempts: {}", summary.total),
            format!("Successes: {}", summary.successes),
            format!("Failures: {}", summary.failures),
            format!("Success rate: {:.1}%", summary.success_rate),
            String::new(),
            "Strategy Success Rates:".to_string(),
        ];
        lines.extend(summary.strategies.iter().map(|(name, stats)| {
            format!(
                "  {name}: {:.1}% ({}/{})",
                stats.rate(),
                stats.successes,
                stats.total
            )
        }));

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(success: bool, strategy: &str) -> OutcomeRecord {
        OutcomeRecord {
            success,
            strategy: Some(strategy.to_string()),
        }
    }

    #[test]
    fn test_report_counts_and_rates() {
        let records = vec![
            record(true, "four_phase"),
            record(true, "four_phase"),
            record(true, "chunked_application"),
            record(false, "chunked_application"),
            record(false, "script_generation"),
            record(true, "direct_operation"),
        ];

        let report = PerformanceMonitor::generate_report(&records);
        let lines: Vec<&str> = report.lines().collect();

        assert_eq!(lines[0], "Large File Handler Performance Report");
        assert_eq!(lines[1], "=".repeat(40));
        assert_eq!(lines[2], "Total attempts: 6");
        assert_eq!(lines[3], "Successes: 4");
        assert_eq!(lines[4], "Failures: 2");
        assert_eq!(lines[5], "Success rate: 66.7%");
        assert_eq!(lines[6], "");
        assert_eq!(lines[7], "Strategy Success Rates:");
        assert_eq!(
            &lines[8..],
            &[
                "  chunked_application: 50.0% (1/2)",
                "  direct_operation: 100.0% (1/1)",
                "  four_phase: 100.0% (2/2)",
                "  script_generation: 0.0% (0/1)",
            ]
        );

        let summary = PerformanceMonitor::summarize(&records);
        let per_strategy: usize = summary.strategies.values().map(|s| s.total).sum();
        let per_strategy_successes: usize =
            summary.strategies.values().map(|s| s.successes).sum();
        assert_eq!(per_strategy, summary.total);
        assert_eq!(per_strategy_successes, summary.successes);
    }

    #[test]
    fn test_empty_report() {
        assert_eq!(PerformanceMonitor::generate_report(&[]), "No results to report");
    }

    #[test]
    fn test_missing_strategy_is_unknown() {
        let records: Vec<OutcomeRecord> =
            serde_json::from_str(r#"[{"success": false, "error": "x"}, {"success": true, "strategy": "four_phase"}]"#)
                .unwrap();

        let report = PerformanceMonitor::generate_report(&records);
        assert!(report.contains("  unknown: 0.0% (0/1)"));
        assert!(report.contains("  four_phase: 100.0% (1/1)"));
    }
}
