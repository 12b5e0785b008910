use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::backup::Backup;
use super::outcome::{FailedStrategy, StrategyKind};

/// One strategy invocation made during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub strategy: StrategyKind,
    pub success: bool,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
}

/// Mutable bookkeeping for a single controller run.
///
/// Owned by exactly one run and handed to each strategy by `&mut`; it is
/// never shared between runs, so independent files can be processed by
/// independent controllers without coordination.
#[derive(Debug, Clone)]
pub struct ExecutionState {
    /// Correlates log lines of one run
    pub run_id: Uuid,

    pub original_content: String,

    /// Content delivered by the successful path, if any
    pub modified_content: Option<String>,

    pub attempts: Vec<AttemptRecord>,

    pub failed: Vec<FailedStrategy>,

    /// Live backup for this run; advisory, recorded once
    pub backup: Option<Backup>,
}

impl ExecutionState {
    pub fn new(original_content: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            original_content: original_content.into(),
            modified_content: None,
            attempts: Vec::new(),
            failed: Vec::new(),
            backup: None,
        }
    }

    pub fn record_attempt(&mut self, record: AttemptRecord) {
        self.attempts.push(record);
    }

    pub fn record_failure(&mut self, strategy: StrategyKind, error: impl Into<String>) {
        self.failed.push(FailedStrategy {
            strategy,
            error: error.into(),
        });
    }
}
