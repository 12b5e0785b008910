//! Fallback strategies tried, in priority order, once degradation is active.

pub mod chunked;
pub mod context_scoped;
pub mod four_phase;
pub mod incremental;
pub mod script;

use std::time::Duration;

use crate::domain::models::{Config, StrategyKind};
use crate::domain::Strategy;

pub use chunked::ChunkedStrategy;
pub use context_scoped::ContextScopedStrategy;
pub use four_phase::FourPhaseStrategy;
pub use incremental::IncrementalStrategy;
pub use script::ScriptStrategy;

/// Build one strategy of the chain from configuration
pub fn build(kind: StrategyKind, config: &Config) -> Option<Box<dyn Strategy>> {
    let strategy: Box<dyn Strategy> = match kind {
        StrategyKind::FourPhase => Box::new(FourPhaseStrategy::new()),
        StrategyKind::ChunkedApplication => {
            Box::new(ChunkedStrategy::new(config.effective_chunk_size()))
        }
        StrategyKind::DiffIncremental => Box::new(IncrementalStrategy::new()),
        StrategyKind::ContextScoped => Box::new(ContextScopedStrategy::new()),
        StrategyKind::ScriptGeneration => {
            let script = &config.strategies.script_generation;
            Box::new(ScriptStrategy::new(
                config.script_auto_execute(),
                script.interpreter.clone(),
                Duration::from_secs(script.timeout_secs),
            ))
        }
        StrategyKind::DirectOperation | StrategyKind::FinalFallback => return None,
    };
    Some(strategy)
}

/// Enabled strategies in chain order
pub fn default_chain(config: &Config) -> Vec<Box<dyn Strategy>> {
    StrategyKind::CHAIN
        .into_iter()
        .filter(|kind| config.is_enabled(*kind))
        .filter_map(|kind| build(kind, config))
        .collect()
}
