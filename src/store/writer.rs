//! RecordStore: locked full replace and locked append.

use super::csv::{header_line, record_line};
use super::record::Record;
use crate::config::StreamConfig;
use crate::error::{Result, StreamError};
use crate::fs::{PublishMode, backup_existing, discard, publish, temp_path};
use crate::locks::LockManager;
use crate::logging::Logger;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio_util::sync::CancellationToken;

const LOG_CONTEXT: &str = "RecordStore";
const WRITE_BUFFER_BYTES: usize = 64 * 1024;

/// Why staging a side file stopped early.
enum StageFault {
    Cancelled,
    Io(io::Error),
}

impl From<io::Error> for StageFault {
    fn from(e: io::Error) -> Self {
        StageFault::Io(e)
    }
}

/// Writes typed records to per-resource CSV files.
///
/// The store has no knowledge of specific schemas; anything implementing
/// `Record` can be written. Resource names double as file names.
#[derive(Debug, Clone)]
pub struct RecordStore {
    output_dir: PathBuf,
    locks: Arc<LockManager>,
    logger: Logger,
    publish_mode: PublishMode,
    flush_every_rows: usize,
}

impl RecordStore {
    pub fn new(output_dir: impl Into<PathBuf>, locks: Arc<LockManager>, logger: Logger) -> Self {
        Self {
            output_dir: output_dir.into(),
            locks,
            logger,
            publish_mode: PublishMode::Rename,
            flush_every_rows: 5_000,
        }
    }

    pub fn from_config(config: &StreamConfig, locks: Arc<LockManager>, logger: Logger) -> Self {
        Self::new(config.output_dir.clone(), locks, logger)
            .with_publish_mode(PublishMode::from_atomic_flag(config.atomic_write))
            .with_flush_every(config.flush_every_rows)
    }

    pub fn with_publish_mode(mut self, mode: PublishMode) -> Self {
        self.publish_mode = mode;
        self
    }

    pub fn with_flush_every(mut self, rows: usize) -> Self {
        self.flush_every_rows = rows.max(1);
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn locks(&self) -> &Arc<LockManager> {
        &self.locks
    }

    /// Path of the file backing `resource`.
    pub fn target_path(&self, resource: &str) -> PathBuf {
        self.output_dir.join(resource)
    }

    /// Replace the whole file for `resource` with `records`.
    ///
    /// # Returns
    ///
    /// * `Ok(rows)` - Number of data rows written (header excluded)
    /// * `Err(StreamError::LockTimeout | Cancelled | Closed)` - From lock acquisition, unchanged
    /// * `Err(StreamError::Cancelled)` - `cancel` fired while rows were being written
    /// * `Err(StreamError::AtomicWrite)` - Staging or publishing failed
    ///
    /// On every error path the side file is removed and the target is left as
    /// it was.
    pub async fn write_all<'a, T, I>(
        &self,
        resource: &str,
        records: I,
        cancel: &CancellationToken,
    ) -> Result<usize>
    where
        T: Record + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        let target = self.target_path(resource);
        let staged = temp_path(&target);

        self.logger.info(
            format!("Writing full dataset to {}", resource),
            Some(LOG_CONTEXT),
        );

        let _guard = self.locks.acquire(resource, cancel).await?;

        let rows = match self.stage(&staged, records, cancel).await {
            Ok(rows) => rows,
            Err(StageFault::Cancelled) => {
                discard(&staged).await;
                self.logger.warning(
                    format!("Full write of {} cancelled; side file removed", resource),
                    Some(LOG_CONTEXT),
                );
                return Err(StreamError::Cancelled);
            }
            Err(StageFault::Io(e)) => {
                discard(&staged).await;
                return Err(StreamError::atomic_write(&target, e));
            }
        };

        match backup_existing(&target).await {
            Ok(Some(backup)) => self.logger.debug(
                format!("Kept previous version as {}", backup.display()),
                Some(LOG_CONTEXT),
            ),
            Ok(None) => {}
            Err(e) => self.logger.warning(
                format!("Backup of {} skipped: {}", target.display(), e),
                Some(LOG_CONTEXT),
            ),
        }

        if let Err(e) = publish(&staged, &target, self.publish_mode).await {
            discard(&staged).await;
            return Err(StreamError::atomic_write(&target, e));
        }

        self.logger.info(
            format!("Successfully wrote {} rows to {}", rows, resource),
            Some(LOG_CONTEXT),
        );
        Ok(rows)
    }

    /// Serialize header and rows into the side file, checking `cancel` per row.
    async fn stage<'a, T, I>(
        &self,
        staged: &Path,
        records: I,
        cancel: &CancellationToken,
    ) -> std::result::Result<usize, StageFault>
    where
        T: Record + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        fs::create_dir_all(&self.output_dir).await?;

        let file = File::create(staged).await?;
        let mut out = BufWriter::with_capacity(WRITE_BUFFER_BYTES, file);
        out.write_all(header_line::<T>().as_bytes()).await?;

        let mut rows = 0;
        for record in records {
            if cancel.is_cancelled() {
                return Err(StageFault::Cancelled);
            }

            out.write_all(record_line(record).as_bytes()).await?;
            rows += 1;

            if rows % self.flush_every_rows == 0 {
                out.flush().await?;
            }
        }

        out.flush().await?;
        out.get_ref().sync_all().await?;
        Ok(rows)
    }

    /// Add one row to the file for `resource`, creating it with a header if needed.
    ///
    /// The row is written to the live file; see the module docs for the
    /// crash behavior this implies.
    pub async fn append<T: Record>(
        &self,
        resource: &str,
        record: &T,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let target = self.target_path(resource);
        let _guard = self.locks.acquire(resource, cancel).await?;

        self.append_line(&target, record)
            .await
            .map_err(|e| StreamError::atomic_write(&target, e))
    }

    async fn append_line<T: Record>(&self, target: &Path, record: &T) -> io::Result<()> {
        fs::create_dir_all(&self.output_dir).await?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(target)
            .await?;

        let mut chunk = String::new();
        if file.metadata().await?.len() == 0 {
            chunk.push_str(&header_line::<T>());
        }
        chunk.push_str(&record_line(record));

        file.write_all(chunk.as_bytes()).await?;
        file.flush().await?;
        file.sync_data().await?;
        Ok(())
    }
}
