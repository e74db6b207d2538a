//! Startup recovery: rebuilds the word table by replaying the WAL.
//!
//! Records are read as raw bytes. A crash mid-flush can leave a torn record at
//! the tail, so records that are not valid UTF-8 are skipped instead of
//! failing the whole replay.

use super::memory::WordStore;
use crate::error::{StorageError, StorageResult};

use std::io::{ErrorKind, SeekFrom};
use std::path::Path;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncSeekExt, BufReader};

/// Replays every record of the log at `path` into a fresh [`WordStore`].
///
/// Returns the store together with the open file handle, positioned at the end
/// of the log so it can be handed straight to the WAL for further appends.
/// A missing file is reported as [`StorageError::NotFound`]; an empty file
/// yields an empty store.
pub async fn recover(path: &Path) -> StorageResult<(WordStore, File)> {
    let mut file = match OpenOptions::new().read(true).write(true).open(path).await {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(StorageError::NotFound(path.to_path_buf()));
        }
        Err(source) => {
            return Err(StorageError::Open {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let store = WordStore::new();
    let mut replayed = 0usize;
    let mut skipped = 0usize;
    {
        let mut reader = BufReader::new(&mut file);
        let mut record = Vec::new();
        while reader.read_until(b'\n', &mut record).await? > 0 {
            match std::str::from_utf8(&record) {
                Ok(line) => {
                    let word = line.trim();
                    if !word.is_empty() {
                        store.increment(word);
                        replayed += 1;
                    }
                }
                Err(e) => {
                    skipped += 1;
                    tracing::warn!(
                        "Skipping undecodable WAL record ({} bytes) in {}: {}",
                        record.len(),
                        path.display(),
                        e
                    );
                }
            }
            record.clear();
        }
    }

    file.seek(SeekFrom::End(0)).await?;

    tracing::info!(
        "Recovered {} records ({} distinct words, {} skipped) from {}",
        replayed,
        store.len(),
        skipped,
        path.display()
    );

    Ok((store, file))
}
