//! Atomic filesystem operations for datastream.
//!
//! Full writes never touch the live file until the new content is complete.
//!
//! # Implementation Strategy
//!
//! 1. Write content to a side file `{target}.tmp` in the same directory
//! 2. Sync the side file to disk
//! 3. Copy the current target to `{target}.bak` (best effort)
//! 4. Atomically replace the target with the side file
//!
//! # Cross-Platform Behavior
//!
//! `rename` replaces the destination atomically on POSIX when source and
//! destination share a filesystem. On Windows the standard library maps it to
//! `MoveFileExW` with `MOVEFILE_REPLACE_EXISTING`.
//!
//! # Important Notes
//!
//! - The side file is created next to the target so the rename never crosses a volume
//! - On crash, a side file may remain; the next full write truncates it

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

/// How a finished side file replaces its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishMode {
    /// `rename` over the target; readers see the old or the new file.
    Rename,
    /// Copy over the target, then delete the side file. Readers can observe a
    /// partially copied target.
    CopyThenDelete,
}

impl PublishMode {
    pub fn from_atomic_flag(atomic: bool) -> Self {
        if atomic {
            PublishMode::Rename
        } else {
            PublishMode::CopyThenDelete
        }
    }
}

fn sibling(target: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = target.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// Side file a full write is staged in: `customers.csv` -> `customers.csv.tmp`.
pub fn temp_path(target: &Path) -> PathBuf {
    sibling(target, ".tmp")
}

/// Where the previous full version is kept: `customers.csv` -> `customers.csv.bak`.
pub fn backup_path(target: &Path) -> PathBuf {
    sibling(target, ".bak")
}

/// Copy an existing target to its `.bak` sibling.
///
/// Returns `Ok(None)` when there is nothing to back up.
pub async fn backup_existing(target: &Path) -> io::Result<Option<PathBuf>> {
    if !fs::try_exists(target).await? {
        return Ok(None);
    }

    let backup = backup_path(target);
    fs::copy(target, &backup).await?;
    Ok(Some(backup))
}

/// Replace `target` with the finished side file `source`.
pub async fn publish(source: &Path, target: &Path, mode: PublishMode) -> io::Result<()> {
    match mode {
        PublishMode::Rename => {
            fs::rename(source, target).await?;
            sync_parent_dir(target).await;
        }
        PublishMode::CopyThenDelete => {
            fs::copy(source, target).await?;
            fs::remove_file(source).await?;
        }
    }
    Ok(())
}

/// Remove a side file, ignoring every error.
pub async fn discard(path: &Path) {
    let _ = fs::remove_file(path).await;
}

/// Atomically write a string to a file, creating parent directories.
pub async fn atomic_write_file(target: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = target.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).await?;
    }

    let staged = temp_path(target);
    let result = async {
        let mut file = File::create(&staged).await?;
        file.write_all(content.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);
        publish(&staged, target, PublishMode::Rename).await
    }
    .await;

    if result.is_err() {
        discard(&staged).await;
    }
    result
}

/// Persist the directory entry of a freshly renamed file.
#[cfg(unix)]
async fn sync_parent_dir(target: &Path) {
    if let Some(parent) = target.parent()
        && let Ok(dir) = File::open(parent).await
    {
        let _ = dir.sync_all().await;
    }
}

#[cfg(not(unix))]
async fn sync_parent_dir(_target: &Path) {}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sibling_paths() {
        let target = Path::new("/data/out/customers.csv");
        assert_eq!(temp_path(target), Path::new("/data/out/customers.csv.tmp"));
        assert_eq!(backup_path(target), Path::new("/data/out/customers.csv.bak"));
    }

    #[tokio::test]
    async fn test_atomic_write_new_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("test.txt");

        atomic_write_file(&file_path, "hello world").await.unwrap();

        let content = std::fs::read_to_string(&file_path).unwrap();
        assert_eq!(content, "hello world");
        assert!(!temp_path(&file_path).exists());
    }

    #[tokio::test]
    async fn test_atomic_write_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("nested").join("dirs").join("test.txt");

        atomic_write_file(&file_path, "nested content").await.unwrap();

        let content = std::fs::read_to_string(&file_path).unwrap();
        assert_eq!(content, "nested content");
    }

    #[tokio::test]
    async fn test_backup_missing_target_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("absent.csv");

        assert!(backup_existing(&file_path).await.unwrap().is_none());
        assert!(!backup_path(&file_path).exists());
    }

    #[tokio::test]
    async fn test_backup_copies_current_version() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("loans.csv");
        std::fs::write(&file_path, "old").unwrap();

        let backup = backup_existing(&file_path).await.unwrap().unwrap();
        assert_eq!(std::fs::read_to_string(backup).unwrap(), "old");
        assert_eq!(std::fs::read_to_string(&file_path).unwrap(), "old");
    }

    #[tokio::test]
    async fn test_publish_rename_replaces_existing() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("invoices.csv");
        let staged = temp_path(&target);
        std::fs::write(&target, "old").unwrap();
        std::fs::write(&staged, "new").unwrap();

        publish(&staged, &target, PublishMode::Rename).await.unwrap();

        assert_eq!(std::fs::read_to_string(&target).unwrap(), "new");
        assert!(!staged.exists());
    }

    #[tokio::test]
    async fn test_publish_copy_then_delete() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("invoices.csv");
        let staged = temp_path(&target);
        std::fs::write(&target, "old").unwrap();
        std::fs::write(&staged, "new").unwrap();

        publish(&staged, &target, PublishMode::CopyThenDelete)
            .await
            .unwrap();

        assert_eq!(std::fs::read_to_string(&target).unwrap(), "new");
        assert!(!staged.exists());
    }

    #[tokio::test]
    async fn test_discard_missing_file_is_silent() {
        let temp_dir = TempDir::new().unwrap();
        discard(&temp_dir.path().join("nothing.tmp")).await;
    }
}
