use anyhow::Result;
use async_trait::async_trait;

use super::models::{ExecutionState, OperationRequest, StrategyKind, StrategyOutcome};

/// One rung of the fallback chain.
///
/// A strategy reports ordinary failure through a failed [`StrategyOutcome`].
/// Returning `Err` (or panicking) is treated by the controller as an
/// unexpected fault; either way the chain moves on to the next strategy.
#[async_trait]
pub trait Strategy: Send + Sync {
    /// Identifier used in outcomes, failure records and configuration
    fn kind(&self) -> StrategyKind;

    /// Try to deliver `request.new_content` to `request.path`
    ///
    /// # Arguments
    /// * `request` - The immutable operation request for this run
    /// * `state` - Run bookkeeping; strategies may record a backup here
    async fn attempt(
        &self,
        request: &OperationRequest,
        state: &mut ExecutionState,
    ) -> Result<StrategyOutcome>;
}
