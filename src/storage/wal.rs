//! Write-Ahead Log
//!
//! Append-only text log with one record per line. Records are buffered in memory
//! and only become durable when [`Wal::sync`] runs, either from the periodic
//! [`Wal::keep_syncing`] loop or on shutdown. A failed sync is reported, never
//! retried.

use crate::error::{StorageError, StorageResult};

use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

pub struct Wal {
    path: PathBuf,
    sync_interval: Duration,
    /// `None` once the log has been closed.
    writer: Mutex<Option<BufWriter<File>>>,
}

impl Wal {
    /// Attaches a buffered writer to the log.
    ///
    /// When `file` is `None` the log file is created (or opened in append mode);
    /// otherwise the supplied handle is used as-is, e.g. the end-positioned
    /// handle returned by recovery.
    pub async fn init(
        path: impl Into<PathBuf>,
        file: Option<File>,
        sync_interval: Duration,
    ) -> StorageResult<Self> {
        let path = path.into();
        let file = match file {
            Some(file) => file,
            None => create_wal_file(&path).await?,
        };

        Ok(Self {
            path,
            sync_interval,
            writer: Mutex::new(Some(BufWriter::new(file))),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `data` to the in-memory buffer.
    pub async fn write(&self, data: &[u8]) -> StorageResult<()> {
        let mut guard = self.writer.lock().await;
        let writer = guard.as_mut().ok_or(StorageError::WalClosed)?;
        writer.write_all(data).await?;
        Ok(())
    }

    /// Flushes the buffer and forces it to stable storage.
    pub async fn sync(&self) -> StorageResult<()> {
        let mut guard = self.writer.lock().await;
        let writer = guard.as_mut().ok_or(StorageError::WalClosed)?;
        sync_writer(writer).await
    }

    /// Syncs and closes the file. Later writes fail with [`StorageError::WalClosed`].
    pub async fn close(&self) -> StorageResult<()> {
        let mut guard = self.writer.lock().await;
        let mut writer = guard.take().ok_or(StorageError::WalClosed)?;
        sync_writer(&mut writer).await?;
        writer.shutdown().await?;
        tracing::debug!("Closed WAL {}", self.path.display());
        Ok(())
    }

    /// Periodically syncs the log until `cancel` fires, then syncs one last time
    /// and closes the file.
    pub async fn keep_syncing(&self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval_at(
            tokio::time::Instant::now() + self.sync_interval,
            self.sync_interval,
        );
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    tracing::trace!("Flushing WAL buffer");
                    if let Err(e) = self.sync().await {
                        tracing::error!("Error while syncing WAL {}: {}", self.path.display(), e);
                    }
                }
                _ = cancel.cancelled() => {
                    tracing::debug!("Flushing WAL buffer before stopping");
                    if let Err(e) = self.close().await {
                        tracing::error!("Error while closing WAL {}: {}", self.path.display(), e);
                    }
                    return;
                }
            }
        }
    }
}

async fn create_wal_file(path: &Path) -> StorageResult<File> {
    let file = OpenOptions::new()
        .read(true)
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(|source| StorageError::Open {
            path: path.to_path_buf(),
            source,
        })?;

    tracing::info!("WAL file {} opened", path.display());
    Ok(file)
}

async fn sync_writer(writer: &mut BufWriter<File>) -> StorageResult<()> {
    writer.flush().await?;
    writer.get_mut().sync_all().await?;
    Ok(())
}
