use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use super::phase::{Phase, PhaseReport};

/// Identifier of the path that produced an outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    DirectOperation,
    FourPhase,
    ChunkedApplication,
    DiffIncremental,
    ContextScoped,
    ScriptGeneration,
    FinalFallback,
}

impl StrategyKind {
    /// Fallback chain in priority order
    pub const CHAIN: [Self; 5] = [
        Self::FourPhase,
        Self::ChunkedApplication,
        Self::DiffIncremental,
        Self::ContextScoped,
        Self::ScriptGeneration,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DirectOperation => "direct_operation",
            Self::FourPhase => "four_phase",
            Self::ChunkedApplication => "chunked_application",
            Self::DiffIncremental => "diff_incremental",
            Self::ContextScoped => "context_scoped",
            Self::ScriptGeneration => "script_generation",
            Self::FinalFallback => "final_fallback",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A strategy that failed during a run, in chain order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedStrategy {
    pub strategy: StrategyKind,
    pub error: String,
}

/// What happened when a chunked application tried to undo partial writes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RollbackStatus {
    Restored { backup_path: PathBuf },
    /// No earlier phase of this run created a backup
    NoBackup,
    Failed { error: String },
}

/// Per-section result of a context-scoped replacement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionResult {
    pub kind: String,
    pub name: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Strategy-specific payload attached to an outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutcomeDetails {
    Direct {
        bytes_written: usize,
    },
    FourPhase {
        phases: Vec<PhaseReport>,
        #[serde(skip_serializing_if = "Option::is_none")]
        failed_phase: Option<Phase>,
    },
    Chunked {
        added_lines: usize,
        chunks_total: usize,
        chunks_processed: usize,
        delegated_to_direct: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        rollback: Option<RollbackStatus>,
    },
    Incremental {
        operations_total: usize,
        operations_applied: usize,
        /// Zero-based index of the operation that failed
        #[serde(skip_serializing_if = "Option::is_none")]
        failed_operation: Option<usize>,
    },
    ContextScoped {
        sections_total: usize,
        sections_attempted: usize,
        sections_modified: usize,
        /// False whenever any discovered section was left unmodified
        fully_applied: bool,
        sections: Vec<SectionResult>,
    },
    Script {
        script_path: PathBuf,
        script_preview: String,
        executed: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        output: Option<String>,
    },
    ManualReport {
        diff_report: String,
        manual_guide: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        report_path: Option<PathBuf>,
        failed_strategies: Vec<FailedStrategy>,
    },
}

/// Structured result of a strategy invocation or of a whole run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyOutcome {
    pub success: bool,
    pub strategy: StrategyKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<OutcomeDetails>,
}

impl StrategyOutcome {
    pub const fn success(strategy: StrategyKind) -> Self {
        Self {
            success: true,
            strategy,
            error: None,
            details: None,
        }
    }

    pub fn failure(strategy: StrategyKind, error: impl Into<String>) -> Self {
        Self {
            success: false,
            strategy,
            error: Some(error.into()),
            details: None,
        }
    }

    #[must_use]
    pub fn with_details(mut self, details: OutcomeDetails) -> Self {
        self.details = Some(details);
        self
    }

    /// Failure description, or a generic one when the strategy gave none
    pub fn error_message(&self) -> &str {
        self.error.as_deref().unwrap_or("Unknown error")
    }

    /// Failed strategies carried by a manual-report outcome
    pub fn failed_strategies(&self) -> &[FailedStrategy] {
        match &self.details {
            Some(OutcomeDetails::ManualReport {
                failed_strategies, ..
            }) => failed_strategies,
            _ => &[],
        }
    }
}
