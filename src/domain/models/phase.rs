//! Four-phase application state machine types
//!
//! The phases run strictly in the order given by [`Phase::next`]. Each phase
//! yields a typed report; the first failing phase halts the machine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A phase of the structured four-phase application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Analysis,
    Preparation,
    Execution,
    Verification,
}

impl Phase {
    /// Entry state of the machine
    pub const START: Self = Self::Analysis;

    /// Forward transition taken after this phase succeeds.
    /// `None` means the machine reached its success terminal.
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Analysis => Some(Self::Preparation),
            Self::Preparation => Some(Self::Execution),
            Self::Execution => Some(Self::Verification),
            Self::Verification => None,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Analysis => write!(f, "Analysis"),
            Self::Preparation => write!(f, "Preparation"),
            Self::Execution => write!(f, "Execution"),
            Self::Verification => write!(f, "Verification"),
        }
    }
}

/// How the proposed content relates to the original, by distinct line sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangePattern {
    NewFile,
    AppendOnly,
    DeletionOnly,
    MajorAdditions,
    MajorDeletions,
    Mixed,
}

impl fmt::Display for ChangePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NewFile => write!(f, "New file creation"),
            Self::AppendOnly => write!(f, "Append-only changes"),
            Self::DeletionOnly => write!(f, "Deletion-only changes"),
            Self::MajorAdditions => write!(f, "Major additions with some deletions"),
            Self::MajorDeletions => write!(f, "Major deletions with some additions"),
            Self::Mixed => write!(f, "Mixed modifications"),
        }
    }
}

/// Line-count metrics computed during analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeMetrics {
    pub original_lines: usize,
    pub new_lines: usize,
    pub diff_size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// `Line N: <declaration>` entries from the head of the original file
    pub structure_preview: Vec<String>,
    pub metrics: ChangeMetrics,
    pub change_pattern: ChangePattern,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModificationPlan {
    pub file: PathBuf,
    pub original_line_count: usize,
    pub new_line_count: usize,
    pub estimated_chunks: usize,
    pub risk_level: RiskLevel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreparationReport {
    /// `None` when the target did not exist and nothing was backed up
    pub backup_path: Option<PathBuf>,
    pub plan: ModificationPlan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub bytes_written: usize,
    pub lines_written: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub file_exists: bool,
    pub not_empty: bool,
    pub file_size: u64,
}

/// Typed result of one completed phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum PhaseReport {
    Analysis(AnalysisReport),
    Preparation(PreparationReport),
    Execution(ExecutionReport),
    Verification(VerificationReport),
}

impl PhaseReport {
    pub const fn phase(&self) -> Phase {
        match self {
            Self::Analysis(_) => Phase::Analysis,
            Self::Preparation(_) => Phase::Preparation,
            Self::Execution(_) => Phase::Execution,
            Self::Verification(_) => Phase::Verification,
        }
    }
}
