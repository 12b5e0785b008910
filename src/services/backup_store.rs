//! Point-in-time file backups and restore.

use chrono::{DateTime, Local};
use md5::{Digest, Md5};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use crate::domain::models::Backup;
use crate::domain::ApplyError;

/// `path` with `suffix` appended to its final component, e.g.
/// `src/app.py` + `.auto_script.py` -> `src/app.py.auto_script.py`
pub fn suffixed_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// First eight hex characters of the MD5 of `content`, matching the backup
/// names earlier tooling wrote
pub fn content_hash(content: &str) -> String {
    let digest = Md5::digest(content.as_bytes());
    hex::encode(digest)[..8].to_string()
}

/// Creates and restores backups beside the file they protect
#[derive(Debug, Clone, Copy, Default)]
pub struct BackupStore;

impl BackupStore {
    /// `<source>.backup_<YYYYmmdd_HHMMSS>_<hash8>`, hashed over the content
    /// that is about to be written
    pub fn backup_path(source: &Path, hashed_content: &str, at: DateTime<Local>) -> PathBuf {
        let suffix = format!(
            ".backup_{}_{}",
            at.format("%Y%m%d_%H%M%S"),
            content_hash(hashed_content)
        );
        suffixed_path(source, &suffix)
    }

    /// Copy `source` to a fresh backup path.
    ///
    /// Returns `Ok(None)` when `source` does not exist yet; there is nothing
    /// to protect in that case.
    pub async fn create(source: &Path, hashed_content: &str) -> Result<Option<Backup>, ApplyError> {
        let exists = fs::try_exists(source)
            .await
            .map_err(|e| ApplyError::read(source, e))?;
        if !exists {
            debug!(path = %source.display(), "No existing file, skipping backup");
            return Ok(None);
        }

        let created_at = Local::now();
        let path = Self::backup_path(source, hashed_content, created_at);
        fs::copy(source, &path)
            .await
            .map_err(|source_err| ApplyError::Backup {
                path: path.clone(),
                source: source_err,
            })?;

        info!(backup = %path.display(), "Backup created");
        Ok(Some(Backup {
            source: source.to_path_buf(),
            path,
            created_at,
        }))
    }

    /// Copy the backup over its source file
    pub async fn restore(backup: &Backup) -> Result<(), ApplyError> {
        fs::copy(&backup.path, &backup.source)
            .await
            .map_err(|source| ApplyError::Restore {
                target: backup.source.clone(),
                backup: backup.path.clone(),
                source,
            })?;

        info!(backup = %backup.path.display(), "Rolled back to backup");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_backup_path_format() {
        let at = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        let path = BackupStore::backup_path(Path::new("/tmp/app.py"), "new body", at);
        let name = path.to_string_lossy().to_string();

        let prefix = "/tmp/app.py.backup_20240309_140507_";
        assert!(name.starts_with(prefix), "unexpected name {name}");
        let hash = &name[prefix.len()..];
        assert_eq!(hash.len(), 8);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hash, content_hash("new body"));
    }

    #[test]
    fn test_content_hash_is_md5_prefix() {
        assert_eq!(content_hash("hello"), "5d41402a");
        assert_eq!(content_hash(""), "d41d8cd9");
    }

    #[test]
    fn test_suffixed_path() {
        assert_eq!(
            suffixed_path(Path::new("dir/file.txt"), ".result.json"),
            PathBuf::from("dir/file.txt.result.json")
        );
    }

    #[tokio::test]
    async fn test_create_and_restore() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("target.txt");
        fs::write(&file, "original").await.unwrap();

        let backup = BackupStore::create(&file, "replacement")
            .await
            .unwrap()
            .expect("backup should exist");
        assert_eq!(fs::read_to_string(&backup.path).await.unwrap(), "original");

        fs::write(&file, "clobbered").await.unwrap();
        BackupStore::restore(&backup).await.unwrap();
        assert_eq!(fs::read_to_string(&file).await.unwrap(), "original");
    }

    #[tokio::test]
    async fn test_create_skips_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("missing.txt");

        let backup = BackupStore::create(&file, "anything").await.unwrap();
        assert!(backup.is_none());
    }
}
