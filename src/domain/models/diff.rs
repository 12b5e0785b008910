use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffOpKind {
    Add,
    Delete,
}

/// A single line edit derived from a unified diff.
///
/// `line` is 1-based and relative to the file as it stands after every
/// preceding operation has been applied, so operations must be applied in
/// the order they were derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffOperation {
    pub kind: DiffOpKind,
    pub line: usize,
    pub content: String,
}

impl DiffOperation {
    pub fn add(line: usize, content: impl Into<String>) -> Self {
        Self {
            kind: DiffOpKind::Add,
            line,
            content: content.into(),
        }
    }

    pub fn delete(line: usize, content: impl Into<String>) -> Self {
        Self {
            kind: DiffOpKind::Delete,
            line,
            content: content.into(),
        }
    }
}
