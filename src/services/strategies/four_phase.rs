//! Structured four-phase application: Analysis -> Preparation -> Execution
//! -> Verification.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument, warn};

use crate::domain::models::{
    AnalysisReport, ChangeMetrics, ChangePattern, ExecutionReport, ExecutionState,
    ModificationPlan, OperationRequest, OutcomeDetails, Phase, PhaseReport, PreparationReport,
    RiskLevel, StrategyKind, StrategyOutcome, VerificationReport,
};
use crate::domain::{ApplyError, PhaseError, Strategy};
use crate::services::backup_store::BackupStore;
use crate::services::structure::is_declaration;

const PREVIEW_SCAN_LINES: usize = 100;
const PREVIEW_MAX_ENTRIES: usize = 20;
const PREVIEW_MAX_CHARS: usize = 80;
const LINES_PER_CHUNK_ESTIMATE: usize = 200;

/// Runs the four phases in order and halts at the first failing one
#[derive(Debug, Clone, Copy, Default)]
pub struct FourPhaseStrategy;

impl FourPhaseStrategy {
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Strategy for FourPhaseStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::FourPhase
    }

    #[instrument(skip_all, fields(run_id = %state.run_id, path = %request.path.display()))]
    async fn attempt(
        &self,
        request: &OperationRequest,
        state: &mut ExecutionState,
    ) -> Result<StrategyOutcome> {
        let mut reports = Vec::with_capacity(4);
        let mut phase = Some(Phase::START);

        while let Some(current) = phase {
            info!(phase = %current, "Executing step");
            match run_phase(current, request, state).await {
                Ok(report) => {
                    reports.push(report);
                    phase = current.next();
                }
                Err(source) => {
                    let err = PhaseError {
                        phase: current,
                        source,
                    };
                    warn!(error = %err, "Four-phase application halted");
                    return Ok(StrategyOutcome::failure(self.kind(), err.to_string())
                        .with_details(OutcomeDetails::FourPhase {
                            phases: reports,
                            failed_phase: Some(current),
                        }));
                }
            }
        }

        Ok(
            StrategyOutcome::success(self.kind()).with_details(OutcomeDetails::FourPhase {
                phases: reports,
                failed_phase: None,
            }),
        )
    }
}

async fn run_phase(
    phase: Phase,
    request: &OperationRequest,
    state: &mut ExecutionState,
) -> Result<PhaseReport, ApplyError> {
    match phase {
        Phase::Analysis => Ok(PhaseReport::Analysis(analyze(
            &state.original_content,
            request.new_content.as_deref(),
        ))),
        Phase::Preparation => prepare(request, state).await.map(PhaseReport::Preparation),
        Phase::Execution => execute(request).await.map(PhaseReport::Execution),
        Phase::Verification => verify(&request.path, request.new_content.as_deref())
            .await
            .map(PhaseReport::Verification),
    }
}

fn counted_lines(content: Option<&str>) -> usize {
    content
        .filter(|c| !c.is_empty())
        .map_or(0, |c| c.split('\n').count())
}

/// Structure preview, line metrics and change classification
pub fn analyze(original: &str, new_content: Option<&str>) -> AnalysisReport {
    let structure_preview = original
        .split('\n')
        .take(PREVIEW_SCAN_LINES)
        .enumerate()
        .filter_map(|(index, line)| {
            let line = line.trim();
            is_declaration(line).then(|| {
                let shown: String = line.chars().take(PREVIEW_MAX_CHARS).collect();
                format!("Line {}: {shown}", index + 1)
            })
        })
        .take(PREVIEW_MAX_ENTRIES)
        .collect();

    let original_lines = original.split('\n').count();
    let new_lines = counted_lines(new_content);

    AnalysisReport {
        structure_preview,
        metrics: ChangeMetrics {
            original_lines,
            new_lines,
            diff_size: original_lines.abs_diff(new_lines),
        },
        change_pattern: classify_change(original, new_content),
    }
}

/// Compare the distinct lines on each side
pub fn classify_change(original: &str, new_content: Option<&str>) -> ChangePattern {
    let Some(new_content) = new_content.filter(|c| !c.is_empty()) else {
        return ChangePattern::NewFile;
    };
    if original.is_empty() {
        return ChangePattern::NewFile;
    }

    let original_lines: HashSet<&str> = original.split('\n').collect();
    let new_lines: HashSet<&str> = new_content.split('\n').collect();

    let added = new_lines.difference(&original_lines).count();
    let removed = original_lines.difference(&new_lines).count();

    if added > 0 && removed == 0 {
        ChangePattern::AppendOnly
    } else if added == 0 && removed > 0 {
        ChangePattern::DeletionOnly
    } else if added > removed * 2 {
        ChangePattern::MajorAdditions
    } else if removed > added * 2 {
        ChangePattern::MajorDeletions
    } else {
        ChangePattern::Mixed
    }
}

async fn prepare(
    request: &OperationRequest,
    state: &mut ExecutionState,
) -> Result<PreparationReport, ApplyError> {
    let hashed = request.new_content.as_deref().unwrap_or_default();
    let backup = BackupStore::create(&request.path, hashed).await?;
    let backup_path = backup.as_ref().map(|b| b.path.clone());
    if backup.is_some() {
        state.backup = backup;
    }

    Ok(PreparationReport {
        backup_path,
        plan: modification_plan(
            &request.path,
            &state.original_content,
            request.new_content.as_deref(),
        ),
    })
}

pub fn modification_plan(path: &Path, original: &str, new_content: Option<&str>) -> ModificationPlan {
    let new_line_count = counted_lines(new_content);
    let risk_level = if new_line_count > 1000 {
        RiskLevel::High
    } else if new_line_count > 500 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    ModificationPlan {
        file: path.to_path_buf(),
        original_line_count: original.split('\n').count(),
        new_line_count,
        estimated_chunks: (new_line_count / LINES_PER_CHUNK_ESTIMATE).max(1),
        risk_level,
    }
}

async fn execute(request: &OperationRequest) -> Result<ExecutionReport, ApplyError> {
    let content = request
        .new_content
        .as_deref()
        .ok_or(ApplyError::MissingContent)?;

    fs::write(&request.path, content)
        .await
        .map_err(|e| ApplyError::write(&request.path, e))?;

    Ok(ExecutionReport {
        bytes_written: content.len(),
        lines_written: content.matches('\n').count() + 1,
    })
}

/// Re-read `path` and require it to hold exactly `expected`.
///
/// A clean write call is not trusted on its own: truncation or re-encoding
/// between write and read fails here.
pub async fn verify(path: &Path, expected: Option<&str>) -> Result<VerificationReport, ApplyError> {
    let expected = expected.ok_or(ApplyError::MissingContent)?;
    let actual = fs::read(path).await.map_err(|e| ApplyError::read(path, e))?;

    if actual != expected.as_bytes() {
        return Err(ApplyError::ContentMismatch {
            expected: expected.len(),
            actual: actual.len(),
        });
    }

    let file_exists = fs::try_exists(path)
        .await
        .map_err(|e| ApplyError::read(path, e))?;
    let not_empty = !actual.is_empty();
    if !(file_exists && not_empty) {
        return Err(ApplyError::SanityCheck(format!(
            "file_exists={file_exists}, not_empty={not_empty}"
        )));
    }

    let file_size = fs::metadata(path)
        .await
        .map_err(|e| ApplyError::read(path, e))?
        .len();

    Ok(VerificationReport {
        file_exists,
        not_empty,
        file_size,
    })
}
