//! Line-by-line application of diff-derived operations against the live file.

use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info, instrument, warn};

use crate::domain::models::{
    DiffOperation, ExecutionState, OperationRequest, OutcomeDetails, StrategyKind,
    StrategyOutcome,
};
use crate::domain::{ApplyError, Strategy};
use crate::services::diff_engine::{apply_operation, parse_operations, unified_diff, DEFAULT_CONTEXT};

#[derive(Debug, Clone, Copy, Default)]
pub struct IncrementalStrategy;

impl IncrementalStrategy {
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Strategy for IncrementalStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::DiffIncremental
    }

    #[instrument(skip_all, fields(run_id = %state.run_id))]
    async fn attempt(
        &self,
        request: &OperationRequest,
        state: &mut ExecutionState,
    ) -> Result<StrategyOutcome> {
        let Some(new_content) = request.non_empty_content() else {
            return Ok(StrategyOutcome::failure(
                self.kind(),
                ApplyError::MissingContent.to_string(),
            ));
        };

        let diff = unified_diff(&state.original_content, new_content, DEFAULT_CONTEXT);
        let operations = parse_operations(&diff);
        let operations_total = operations.len();

        if operations.is_empty() {
            info!("No changes detected");
            return Ok(self.applied(0));
        }
        info!(operations_total, "Parsed incremental operations");

        for (index, operation) in operations.iter().enumerate() {
            debug!(
                step = index + 1,
                operations_total,
                kind = ?operation.kind,
                line = operation.line,
                "Applying operation"
            );

            if let Err(err) = apply_to_file(&request.path, operation).await {
                warn!(step = index + 1, error = %err, "Incremental operation failed");
                return Ok(StrategyOutcome::failure(
                    self.kind(),
                    format!("Operation {} failed: {err}", index + 1),
                )
                .with_details(OutcomeDetails::Incremental {
                    operations_total,
                    operations_applied: index,
                    failed_operation: Some(index),
                }));
            }
        }

        Ok(self.applied(operations_total))
    }
}

impl IncrementalStrategy {
    fn applied(&self, operations: usize) -> StrategyOutcome {
        StrategyOutcome::success(self.kind()).with_details(OutcomeDetails::Incremental {
            operations_total: operations,
            operations_applied: operations,
            failed_operation: None,
        })
    }
}

/// Re-read the file, apply one operation and rewrite the whole file.
///
/// Line numbers are relative to the state left by the previous operation,
/// so the file is never cached between operations.
async fn apply_to_file(path: &Path, operation: &DiffOperation) -> Result<(), ApplyError> {
    let current = fs::read_to_string(path)
        .await
        .map_err(|e| ApplyError::read(path, e))?;

    let mut lines: Vec<String> = current.split('\n').map(str::to_string).collect();
    apply_operation(&mut lines, operation);

    fs::write(path, lines.join("\n"))
        .await
        .map_err(|e| ApplyError::write(path, e))
}
