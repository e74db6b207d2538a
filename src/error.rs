use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("WAL directory {0} does not exist")]
    MissingDirectory(PathBuf),

    #[error("Failed to open WAL file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File not found: {0}")]
    NotFound(PathBuf),

    #[error("WAL is closed")]
    WalClosed,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// A single peer that could not be reached during a broadcast or fan-out.
#[derive(Debug, Clone)]
pub struct PeerFailure {
    pub peer: String,
    pub reason: String,
}

/// Every per-peer failure of one broadcast, combined into a single error.
#[derive(Error, Debug)]
pub struct BroadcastError {
    pub endpoint: String,
    pub failures: Vec<PeerFailure>,
}

impl fmt::Display for BroadcastError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} peer(s) failed on {}",
            self.failures.len(),
            self.endpoint
        )?;
        for failure in &self.failures {
            write!(f, "; {}: {}", failure.peer, failure.reason)?;
        }
        Ok(())
    }
}
