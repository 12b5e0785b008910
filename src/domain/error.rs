use std::io;
use std::path::PathBuf;
use thiserror::Error;

use super::models::Phase;

/// Errors raised while delivering content to a file
#[derive(Error, Debug)]
pub enum ApplyError {
    #[error("No new content provided")]
    MissingContent,

    #[error("Unknown operation: {0}")]
    UnsupportedOperation(String),

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to create backup {}: {source}", path.display())]
    Backup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to restore {} from {}: {source}", target.display(), backup.display())]
    Restore {
        target: PathBuf,
        backup: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Content mismatch after write: expected {expected} bytes, found {actual}")]
    ContentMismatch { expected: usize, actual: usize },

    #[error("Sanity checks failed: {0}")]
    SanityCheck(String),

    #[error("Unable to extract relevant context")]
    NoSections,

    #[error("Section `{0}` not found in current file")]
    SectionNotFound(String),

    #[error("Invalid section pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Script execution failed: {0}")]
    ScriptFailed(String),

    #[error("Script execution timed out after {0}s")]
    ScriptTimeout(u64),
}

impl ApplyError {
    pub fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}

/// A four-phase run halted at `phase`
#[derive(Error, Debug)]
#[error("Step {phase} failed: {source}")]
pub struct PhaseError {
    pub phase: Phase,
    #[source]
    pub source: ApplyError,
}
