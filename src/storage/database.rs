use super::memory::WordStore;
use super::recovery::recover;
use super::wal::Wal;
use crate::config::WalOptions;
use crate::error::{StorageError, StorageResult};

use std::path::Path;
use std::sync::Arc;

/// The word table together with the log that makes it durable.
pub struct Database {
    store: Arc<WordStore>,
    wal: Arc<Wal>,
}

impl Database {
    pub fn new(store: Arc<WordStore>, wal: Arc<Wal>) -> Self {
        Self { store, wal }
    }

    /// Opens the node's database, replaying an existing log first.
    ///
    /// The log's directory must already exist. When the log file is missing (or
    /// `restore` is off) the node starts with an empty table and appends to the
    /// log from wherever it currently ends.
    pub async fn open(options: &WalOptions) -> StorageResult<Self> {
        let path = options.file_path.as_path();
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        if !tokio::fs::try_exists(dir).await? {
            return Err(StorageError::MissingDirectory(dir.to_path_buf()));
        }

        if options.restore {
            match recover(path).await {
                Ok((store, file)) => {
                    let wal = Wal::init(path, Some(file), options.sync_interval()).await?;
                    return Ok(Self::new(Arc::new(store), Arc::new(wal)));
                }
                Err(StorageError::NotFound(_)) => {
                    tracing::info!("No WAL at {}, starting with an empty store", path.display());
                }
                Err(e) => return Err(e),
            }
        }

        let wal = Wal::init(path, None, options.sync_interval()).await?;
        Ok(Self::new(Arc::new(WordStore::new()), Arc::new(wal)))
    }

    /// Counts `word` and appends it to the log buffer.
    ///
    /// A failed append is logged only: the in-memory count stays, and callers
    /// cannot tell a buffered record from a durable one.
    pub async fn insert(&self, word: &str) {
        let word = word.to_lowercase();
        self.store.increment(&word);

        let mut record = word.into_bytes();
        record.push(b'\n');
        if let Err(e) = self.wal.write(&record).await {
            tracing::error!("Cannot write into WAL buffer: {}", e);
        }
    }

    pub fn get(&self, word: &str) -> u64 {
        self.store.get(word)
    }

    pub fn encode_datastore(&self) -> StorageResult<Vec<u8>> {
        self.store.encode()
    }

    pub fn load_datastore(&self, encoded: &[u8]) -> StorageResult<()> {
        self.store.load(encoded)
    }

    pub fn store(&self) -> &Arc<WordStore> {
        &self.store
    }

    pub fn wal(&self) -> &Arc<Wal> {
        &self.wal
    }
}
