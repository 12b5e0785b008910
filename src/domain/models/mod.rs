pub mod backup;
pub mod chunk;
pub mod config;
pub mod diff;
pub mod operation;
pub mod outcome;
pub mod phase;
pub mod section;
pub mod state;

pub use backup::Backup;
pub use chunk::Chunk;
pub use config::{
    ChunkedApplicationConfig, Config, ContextScopedConfig, DiffIncrementalConfig,
    FourPhaseConfig, LoggingConfig, ScriptGenerationConfig, StrategiesConfig,
};
pub use diff::{DiffOpKind, DiffOperation};
pub use operation::{OperationKind, OperationRequest};
pub use outcome::{
    FailedStrategy, OutcomeDetails, RollbackStatus, SectionResult, StrategyKind, StrategyOutcome,
};
pub use phase::{
    AnalysisReport, ChangeMetrics, ChangePattern, ExecutionReport, ModificationPlan, Phase,
    PhaseReport, PreparationReport, RiskLevel, VerificationReport,
};
pub use section::Section;
pub use state::{AttemptRecord, ExecutionState};
