use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Classified kind of a requested file operation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Edit,
    Write,
    Rewrite,
    Refactor,
    /// Any other operation name, kept verbatim (e.g. `read`, `analyze`)
    Other(String),
}

impl OperationKind {
    /// Classify an operation name. Matching is exact but case-insensitive.
    pub fn parse(operation: &str) -> Self {
        match operation.to_lowercase().as_str() {
            "edit" => Self::Edit,
            "write" => Self::Write,
            "rewrite" => Self::Rewrite,
            "refactor" => Self::Refactor,
            _ => Self::Other(operation.to_string()),
        }
    }

    /// Whether the direct write path accepts this operation
    pub const fn supports_direct_write(&self) -> bool {
        matches!(self, Self::Edit | Self::Write)
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Edit => write!(f, "edit"),
            Self::Write => write!(f, "write"),
            Self::Rewrite => write!(f, "rewrite"),
            Self::Refactor => write!(f, "refactor"),
            Self::Other(name) => write!(f, "{name}"),
        }
    }
}

/// A single request to deliver new content to a file.
///
/// Built once at the start of a run and never mutated afterwards; every
/// strategy sees the same request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationRequest {
    /// Operation name as supplied by the caller
    pub operation: String,

    /// Target file
    pub path: PathBuf,

    /// File content at the start of the run (empty for new files)
    pub original_content: String,

    /// Proposed replacement body
    pub new_content: Option<String>,
}

impl OperationRequest {
    pub fn new(
        operation: impl Into<String>,
        path: impl Into<PathBuf>,
        original_content: impl Into<String>,
        new_content: Option<String>,
    ) -> Self {
        Self {
            operation: operation.into(),
            path: path.into(),
            original_content: original_content.into(),
            new_content,
        }
    }

    pub fn kind(&self) -> OperationKind {
        OperationKind::parse(&self.operation)
    }

    /// Proposed content, treating an empty body the same as a missing one
    pub fn non_empty_content(&self) -> Option<&str> {
        self.new_content.as_deref().filter(|content| !content.is_empty())
    }
}
