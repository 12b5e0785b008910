//! Terminal outcome once every strategy has failed: a diff report and a
//! manual guide, persisted beside the target.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info};

use crate::domain::models::{
    ExecutionState, FailedStrategy, OutcomeDetails, StrategyKind, StrategyOutcome,
};
use crate::services::backup_store::suffixed_path;
use crate::services::diff_engine::{unified_diff, DEFAULT_CONTEXT};

pub const REPORT_SUFFIX: &str = ".manual_modification_report.txt";
pub const EXHAUSTED_MESSAGE: &str = "All strategies failed. Manual modification required.";
const DIFF_REPORT_LINES: usize = 100;

pub const MANUAL_GUIDE: &str = "
# MANUAL MODIFICATION GUIDE

## Steps:
1. Create a backup of the original file
2. Use a diff tool to compare original and target content
3. Apply changes in small increments:
   - Start with independent functions/classes
   - Then modify dependent sections
   - Finally update global configurations

## Recommended Tools:
- VS Code: Built-in diff viewer
- Beyond Compare: Professional comparison tool
- Meld: Open source visual diff
- vimdiff: Command line diff

## Safety Tips:
- Test after each modification
- Use version control (git)
- Consider splitting into smaller files

## Alternative Approach:
If direct modification is too risky:
1. Create a new file with the target content
2. Test thoroughly
3. Replace the original file
4. Maintain the backup until verified
";

/// First lines of the unified diff between the two bodies
pub fn diff_report(original: &str, new_content: Option<&str>) -> String {
    let Some(new_content) = new_content.filter(|c| !c.is_empty()) else {
        return "Cannot generate diff: missing content".to_string();
    };
    if original.is_empty() {
        return "Cannot generate diff: missing content".to_string();
    }

    let mut lines = unified_diff(original, new_content, DEFAULT_CONTEXT);
    lines.truncate(DIFF_REPORT_LINES);
    lines.join("\n")
}

fn render_report(diff_report: &str, failed: &[FailedStrategy]) -> String {
    let attempts = if failed.is_empty() {
        "(none enabled)".to_string()
    } else {
        failed
            .iter()
            .map(|f| format!("- {}: {}", f.strategy, f.error))
            .collect::<Vec<_>>()
            .join("\n")
    };
    format!(
        "MANUAL MODIFICATION REPORT\n{}\n\nFAILED STRATEGIES:\n{attempts}\n\nDIFF REPORT:\n{diff_report}\n\nMANUAL GUIDE:\n{MANUAL_GUIDE}",
        "=".repeat(60)
    )
}

/// Build the terminal failure outcome for `path`.
///
/// The report file is best effort: if it cannot be written the outcome
/// still carries both texts, just without a `report_path`.
pub async fn final_fallback(
    path: &Path,
    new_content: Option<&str>,
    state: &ExecutionState,
) -> StrategyOutcome {
    error!(run_id = %state.run_id, "All strategies failed, generating manual fallback");

    let diff_report = diff_report(&state.original_content, new_content);
    let report_path = write_report(path, &render_report(&diff_report, &state.failed)).await;

    StrategyOutcome::failure(StrategyKind::FinalFallback, EXHAUSTED_MESSAGE).with_details(
        OutcomeDetails::ManualReport {
            diff_report,
            manual_guide: MANUAL_GUIDE.to_string(),
            report_path,
            failed_strategies: state.failed.clone(),
        },
    )
}

async fn write_report(path: &Path, report: &str) -> Option<PathBuf> {
    let report_path = suffixed_path(path, REPORT_SUFFIX);
    match fs::write(&report_path, report).await {
        Ok(()) => {
            info!(path = %report_path.display(), "Manual modification report saved");
            Some(report_path)
        }
        Err(err) => {
            error!(path = %report_path.display(), error = %err, "Failed to save report");
            None
        }
    }
}
