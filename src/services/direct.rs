//! Direct write path used below the activation threshold.

use tokio::fs;
use tracing::{debug, warn};

use crate::domain::models::{OperationRequest, OutcomeDetails, StrategyKind, StrategyOutcome};
use crate::domain::ApplyError;

/// Overwrite the target with the proposed content in one write.
///
/// Only `edit` and `write` operations are accepted. Never returns `Err`;
/// every failure is folded into the outcome.
pub async fn apply_direct(request: &OperationRequest) -> StrategyOutcome {
    match write_direct(request).await {
        Ok(bytes_written) => {
            debug!(path = %request.path.display(), bytes_written, "Direct write completed");
            StrategyOutcome::success(StrategyKind::DirectOperation)
                .with_details(OutcomeDetails::Direct { bytes_written })
        }
        Err(err) => {
            warn!(path = %request.path.display(), error = %err, "Direct operation failed");
            let message = match err {
                ApplyError::Write { .. } => format!("Direct operation failed: {err}"),
                other => other.to_string(),
            };
            StrategyOutcome::failure(StrategyKind::DirectOperation, message)
        }
    }
}

async fn write_direct(request: &OperationRequest) -> Result<usize, ApplyError> {
    let kind = request.kind();
    if !kind.supports_direct_write() {
        return Err(ApplyError::UnsupportedOperation(request.operation.clone()));
    }
    let content = request
        .new_content
        .as_deref()
        .ok_or(ApplyError::MissingContent)?;

    fs::write(&request.path, content)
        .await
        .map_err(|e| ApplyError::write(&request.path, e))?;
    Ok(content.len())
}
