//! Periodic full-state snapshots.
//!
//! Snapshots are JSON dumps of the word table named after their creation time.
//! They are never read back by startup recovery and never rotated; two snapshots
//! taken within the same second share a file name and the later one wins.

use super::memory::WordStore;
use crate::error::{StorageError, StorageResult};

use chrono::{DateTime, Local};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub struct Snapshotter {
    dir: PathBuf,
    interval: Duration,
}

impl Snapshotter {
    pub fn new(dir: impl Into<PathBuf>, interval: Duration) -> Self {
        Self {
            dir: dir.into(),
            interval,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn file_name(at: DateTime<Local>) -> String {
        format!("snapshot_{}.json", at.format("%Y%m%d%H%M%S"))
    }

    /// Writes the current contents of `store` to a new snapshot file.
    pub async fn create_snapshot(&self, store: &WordStore) -> StorageResult<PathBuf> {
        let encoded = store.encode()?;

        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(Self::file_name(Local::now()));
        tokio::fs::write(&path, encoded).await?;

        tracing::debug!("Snapshot of {} words written to {}", store.len(), path.display());
        Ok(path)
    }

    /// Creates a snapshot on every tick until `cancel` fires, then takes one last
    /// snapshot before returning. Failures are logged and never stop the loop.
    pub async fn run(&self, store: Arc<WordStore>, cancel: CancellationToken) {
        let mut interval =
            tokio::time::interval_at(tokio::time::Instant::now() + self.interval, self.interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    tracing::debug!("Timer for creating db snapshot");
                    self.snapshot_and_log(&store).await;
                }
                _ = cancel.cancelled() => {
                    tracing::info!("Creating last snapshot of database before stopping");
                    self.snapshot_and_log(&store).await;
                    return;
                }
            }
        }
    }

    async fn snapshot_and_log(&self, store: &WordStore) {
        if let Err(e) = self.create_snapshot(store).await {
            tracing::warn!("Cannot create snapshot in {}: {}", self.dir.display(), e);
        }
    }
}

/// Decodes a serialized snapshot (or full-state transfer) into a fresh store.
pub fn load_snapshot(encoded: &[u8]) -> StorageResult<WordStore> {
    WordStore::decode(encoded)
}

pub async fn load_snapshot_from_file(path: &Path) -> StorageResult<WordStore> {
    let encoded = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(StorageError::NotFound(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };
    load_snapshot(&encoded)
}
