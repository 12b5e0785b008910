//! Activation detection for the fallback chain.

use serde::{Deserialize, Serialize};
use tracing::info;

/// Operation names that mark an operation as high-risk (substring match)
pub const HIGH_RISK_OPERATIONS: [&str; 4] = ["edit", "write", "rewrite", "refactor"];

/// Decides whether a run should leave the direct write path
#[derive(Debug, Clone, Copy)]
pub struct ActivationDetector {
    max_lines: usize,
}

impl ActivationDetector {
    pub const fn new(max_lines: usize) -> Self {
        Self { max_lines }
    }

    /// True iff `content` has more than `max_lines` lines and `operation`
    /// is high-risk.
    pub fn should_activate(&self, content: &str, operation: &str) -> bool {
        let lines = line_count(content);
        let is_large = lines > self.max_lines;
        let is_high_risk = is_high_risk(operation);

        if is_large && is_high_risk {
            info!(lines, operation, "Large file detected");
        }

        is_large && is_high_risk
    }
}

impl Default for ActivationDetector {
    fn default() -> Self {
        Self::new(500)
    }
}

/// Count of `\n` plus one
pub fn line_count(content: &str) -> usize {
    content.bytes().filter(|b| *b == b'\n').count() + 1
}

pub fn is_high_risk(operation: &str) -> bool {
    let operation = operation.to_lowercase();
    HIGH_RISK_OPERATIONS
        .iter()
        .any(|keyword| operation.contains(keyword))
}

/// Size statistics shown by `analyze`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStats {
    pub total_lines: usize,
    pub total_chars: usize,
    pub non_empty_lines: usize,
    /// Rough estimate at four characters per token
    pub estimated_tokens: usize,
}

impl FileStats {
    pub fn from_content(content: &str) -> Self {
        let total_chars = content.chars().count();
        Self {
            total_lines: content.split('\n').count(),
            total_chars,
            non_empty_lines: content
                .split('\n')
                .filter(|line| !line.trim().is_empty())
                .count(),
            estimated_tokens: total_chars / 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(n: usize) -> String {
        (0..n)
            .map(|i| format!("line {i}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_activates_for_large_high_risk() {
        let detector = ActivationDetector::default();
        let content = lines(501);

        assert!(detector.should_activate(&content, "edit"));
        assert!(detector.should_activate(&content, "write"));
        assert!(detector.should_activate(&content, "rewrite"));
        assert!(detector.should_activate(&content, "REFACTOR"));
        assert!(detector.should_activate(&content, "bulk_edit"));
    }

    #[test]
    fn test_does_not_activate_for_low_risk() {
        let detector = ActivationDetector::default();
        let content = lines(501);

        assert!(!detector.should_activate(&content, "read"));
        assert!(!detector.should_activate(&content, "analyze"));
    }

    #[test]
    fn test_does_not_activate_for_small_file() {
        let detector = ActivationDetector::default();
        assert!(!detector.should_activate(&lines(100), "edit"));
        // Exactly at the threshold is not large
        assert!(!detector.should_activate(&lines(500), "edit"));
    }

    #[test]
    fn test_line_count_counts_terminators() {
        assert_eq!(line_count(""), 1);
        assert_eq!(line_count("a"), 1);
        assert_eq!(line_count("a\n"), 2);
        assert_eq!(line_count("a\nb\nc"), 3);
    }

    #[test]
    fn test_custom_threshold() {
        let detector = ActivationDetector::new(100);
        assert!(detector.should_activate(&lines(150), "edit"));
        assert!(!detector.should_activate(&lines(50), "edit"));
    }

    #[test]
    fn test_file_stats() {
        let content = lines(50);
        let stats = FileStats::from_content(&content);

        assert_eq!(stats.total_lines, 50);
        assert_eq!(stats.non_empty_lines, 50);
        assert_eq!(stats.total_chars, content.len());
        assert!(stats.estimated_tokens > 0);
    }

    #[test]
    fn test_file_stats_blank_lines() {
        let stats = FileStats::from_content("a\n\n  \nb\n");
        assert_eq!(stats.total_lines, 5);
        assert_eq!(stats.non_empty_lines, 2);
    }
}
