//! Chunked application of large rewrites.

use anyhow::Result;
use async_trait::async_trait;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{error, info, instrument, warn};

use crate::domain::models::{
    Chunk, ExecutionState, OperationRequest, OutcomeDetails, RollbackStatus, StrategyKind,
    StrategyOutcome,
};
use crate::domain::{ApplyError, Strategy};
use crate::services::backup_store::BackupStore;
use crate::services::diff_engine::{count_added_lines, unified_diff, DEFAULT_CONTEXT};
use crate::services::direct::apply_direct;
use crate::services::structure::is_declaration;

/// How far past the nominal end a chunk may grow to find a clean boundary
const BOUNDARY_SEARCH_LINES: usize = 20;

/// Writes the proposed content in line chunks: the first chunk overwrites,
/// later ones append.
#[derive(Debug, Clone, Copy)]
pub struct ChunkedStrategy {
    chunk_size: usize,
}

impl ChunkedStrategy {
    pub const fn new(chunk_size: usize) -> Self {
        Self { chunk_size }
    }
}

#[async_trait]
impl Strategy for ChunkedStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ChunkedApplication
    }

    #[instrument(skip_all, fields(run_id = %state.run_id, chunk_size = self.chunk_size))]
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
        let added_lines = count_added_lines(&diff);

        if added_lines < self.chunk_size {
            info!(added_lines, "Change size under threshold, using direct edit");
            let mut outcome = apply_direct(request).await;
            outcome.strategy = self.kind();
            return Ok(outcome.with_details(OutcomeDetails::Chunked {
                added_lines,
                chunks_total: 0,
                chunks_processed: 0,
                delegated_to_direct: true,
                rollback: None,
            }));
        }

        let chunks = split_into_chunks(new_content, self.chunk_size);
        let chunks_total = chunks.len();
        info!(chunks_total, "Split into chunks");

        for (index, chunk) in chunks.iter().enumerate() {
            info!(
                chunk = index + 1,
                chunks_total,
                start_line = chunk.start_line,
                end_line = chunk.end_line,
                "Processing chunk"
            );

            if let Err(err) = apply_chunk(request, chunk).await {
                error!(chunk = index + 1, error = %err, "Chunk failed, attempting rollback");
                let rollback = rollback(state).await;
                return Ok(StrategyOutcome::failure(
                    self.kind(),
                    format!("Chunk {} failed: {err}", index + 1),
                )
                .with_details(OutcomeDetails::Chunked {
                    added_lines,
                    chunks_total,
                    chunks_processed: index,
                    delegated_to_direct: false,
                    rollback: Some(rollback),
                }));
            }
        }

        Ok(
            StrategyOutcome::success(self.kind()).with_details(OutcomeDetails::Chunked {
                added_lines,
                chunks_total,
                chunks_processed: chunks_total,
                delegated_to_direct: false,
                rollback: None,
            }),
        )
    }
}

/// Split `content` into chunks of about `chunk_size` lines.
///
/// A chunk that would end mid-file is extended by up to
/// [`BOUNDARY_SEARCH_LINES`] lines so that it closes on a blank line or a
/// block declaration. Joining the chunks with `\n` yields `content`.
pub fn split_into_chunks(content: &str, chunk_size: usize) -> Vec<Chunk> {
    let chunk_size = chunk_size.max(1);
    let lines: Vec<&str> = content.split('\n').collect();
    let mut chunks = Vec::new();

    let mut start = 0;
    while start < lines.len() {
        let mut end = (start + chunk_size).min(lines.len());

        if end < lines.len() {
            let search_end = (end + BOUNDARY_SEARCH_LINES).min(lines.len());
            if let Some(boundary) = (end..search_end)
                .find(|&j| lines[j].trim().is_empty() || is_declaration(lines[j]))
            {
                end = boundary + 1;
            }
        }

        chunks.push(Chunk {
            start_line: start + 1,
            end_line: end,
            content: lines[start..end].join("\n"),
            is_first: start == 0,
            is_last: end >= lines.len(),
        });
        start = end;
    }

    chunks
}

async fn apply_chunk(request: &OperationRequest, chunk: &Chunk) -> Result<(), ApplyError> {
    let path = &request.path;
    if chunk.is_first {
        return fs::write(path, &chunk.content)
            .await
            .map_err(|e| ApplyError::write(path, e));
    }

    let mut file = OpenOptions::new()
        .append(true)
        .open(path)
        .await
        .map_err(|e| ApplyError::write(path, e))?;
    file.write_all(format!("\n{}", chunk.content).as_bytes())
        .await
        .map_err(|e| ApplyError::write(path, e))?;
    file.flush().await.map_err(|e| ApplyError::write(path, e))
}

/// Restore the run's backup, if an earlier phase recorded one
pub async fn rollback(state: &ExecutionState) -> RollbackStatus {
    let Some(backup) = &state.backup else {
        warn!("No backup available, rollback skipped");
        return RollbackStatus::NoBackup;
    };

    match BackupStore::restore(backup).await {
        Ok(()) => RollbackStatus::Restored {
            backup_path: backup.path.clone(),
        },
        Err(err) => {
            error!(error = %err, "Rollback failed");
            RollbackStatus::Failed {
                error: err.to_string(),
            }
        }
    }
}
