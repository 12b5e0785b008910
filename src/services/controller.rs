//! Degradation controller: direct write for small edits, otherwise the
//! strategy chain, otherwise the manual fallback.

use chrono::Utc;
use futures::FutureExt;
use std::any::Any;
use std::io::ErrorKind;
use std::panic::AssertUnwindSafe;
use std::path::Path;
use std::time::Instant;
use tokio::fs;
use tracing::{info, instrument, warn, Span};

use crate::domain::models::{
    AttemptRecord, Config, ExecutionState, OperationRequest, StrategyKind, StrategyOutcome,
};
use crate::domain::{ApplyError, Strategy};
use crate::services::activation::ActivationDetector;
use crate::services::direct::apply_direct;
use crate::services::final_fallback::final_fallback;
use crate::services::strategies::default_chain;

/// Runs one edit through graduated degradation.
///
/// The controller holds no per-run state: every call to [`execute`] builds
/// its own [`ExecutionState`], so one controller can serve many files.
///
/// [`execute`]: DegradationController::execute
pub struct DegradationController {
    detector: ActivationDetector,
    strategies: Vec<Box<dyn Strategy>>,
}

impl DegradationController {
    /// Controller with the enabled strategies of `config`, in chain order
    pub fn new(config: Config) -> Self {
        let strategies = default_chain(&config);
        Self::with_strategies(&config, strategies)
    }

    /// Controller with an explicit strategy list, tried in the given order
    pub fn with_strategies(config: &Config, strategies: Vec<Box<dyn Strategy>>) -> Self {
        Self {
            detector: ActivationDetector::new(config.max_lines),
            strategies,
        }
    }

    /// Deliver `new_content` to `path`. Never fails: every problem is
    /// reported through the returned outcome.
    pub async fn execute(
        &self,
        operation: &str,
        path: &Path,
        new_content: Option<String>,
    ) -> StrategyOutcome {
        self.execute_with_state(operation, path, new_content).await.0
    }

    /// Like [`execute`](Self::execute), also handing back the run's state
    #[instrument(
        skip(self, path, new_content),
        fields(path = %path.display(), run_id = tracing::field::Empty)
    )]
    pub async fn execute_with_state(
        &self,
        operation: &str,
        path: &Path,
        new_content: Option<String>,
    ) -> (StrategyOutcome, ExecutionState) {
        let original = match read_original(path).await {
            Ok(content) => content,
            Err(err) => {
                warn!(error = %err, "Could not read target file");
                let state = ExecutionState::new(String::new());
                return (
                    StrategyOutcome::failure(StrategyKind::DirectOperation, err.to_string()),
                    state,
                );
            }
        };

        let mut state = ExecutionState::new(original.clone());
        Span::current().record("run_id", tracing::field::display(state.run_id));
        let request = OperationRequest::new(operation, path, original, new_content);

        if !self.detector.should_activate(&state.original_content, operation) {
            let outcome = apply_direct(&request).await;
            if outcome.success {
                state.modified_content.clone_from(&request.new_content);
            }
            return (outcome, state);
        }

        let outcome = self.run_chain(&request, &mut state).await;
        (outcome, state)
    }

    async fn run_chain(&self, request: &OperationRequest, state: &mut ExecutionState) -> StrategyOutcome {
        for strategy in &self.strategies {
            let kind = strategy.kind();
            info!(strategy = %kind, "Attempting strategy");

            let started_at = Utc::now();
            let clock = Instant::now();
            let outcome = match AssertUnwindSafe(strategy.attempt(request, state))
                .catch_unwind()
                .await
            {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(err)) => StrategyOutcome::failure(kind, format!("{err:#}")),
                Err(panic) => StrategyOutcome::failure(
                    kind,
                    format!("Strategy panicked: {}", panic_message(panic.as_ref())),
                ),
            };

            state.record_attempt(AttemptRecord {
                strategy: kind,
                success: outcome.success,
                started_at,
                duration_ms: u64::try_from(clock.elapsed().as_millis()).unwrap_or(u64::MAX),
            });

            if outcome.success {
                info!(strategy = %kind, "Strategy succeeded");
                state.modified_content.clone_from(&request.new_content);
                return outcome;
            }

            warn!(strategy = %kind, error = outcome.error_message(), "Strategy failed");
            state.record_failure(kind, outcome.error_message());
        }

        final_fallback(&request.path, request.new_content.as_deref(), state).await
    }
}

/// Current content of `path`; a missing file reads as empty
async fn read_original(path: &Path) -> Result<String, ApplyError> {
    match fs::read_to_string(path).await {
        Ok(content) => Ok(content),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(String::new()),
        Err(err) => Err(ApplyError::read(path, err)),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
