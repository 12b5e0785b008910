use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A point-in-time copy of a file taken before destructive writes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Backup {
    /// File that was copied
    pub source: PathBuf,

    /// `<source>.backup_<YYYYmmdd_HHMMSS>_<hash8>`
    pub path: PathBuf,

    pub created_at: DateTime<Local>,
}
