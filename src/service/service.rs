//! Word ingestion and lookup on top of the node's database.

use super::tokenizer::{split_phrase, split_terms};
use super::types::WordResponse;
use crate::executor::WorkerPool;
use crate::storage::Database;

use anyhow::Result;
use axum::body::Bytes;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::sync::mpsc::{self, error::TrySendError};

pub struct WordService {
    db: Arc<Database>,
    pool_size: usize,
    /// Present only while this node is master and fans writes out.
    forwarding: RwLock<Option<mpsc::Sender<Bytes>>>,
}

impl WordService {
    pub fn new(db: Arc<Database>, pool_size: usize) -> Arc<Self> {
        Arc::new(Self {
            db,
            pool_size,
            forwarding: RwLock::new(None),
        })
    }

    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    /// Splits `text` into words and inserts each one through a bounded worker pool.
    ///
    /// Returns the number of words inserted. Every insert has been applied to the
    /// store and appended to the WAL buffer when this returns.
    pub async fn register_words(&self, text: &str) -> Result<usize> {
        let words = split_phrase(text);
        if words.is_empty() {
            return Ok(0);
        }

        let mut pool = WorkerPool::new(self.pool_size.min(words.len()));
        pool.start();

        let count = words.len();
        let mut submitted = Ok(());
        for word in words {
            let db = self.db.clone();
            if let Err(e) = pool.submit(async move { db.insert(&word).await }).await {
                submitted = Err(e);
                break;
            }
        }
        pool.stop().await;

        submitted?;
        tracing::debug!("Registered {} words", count);
        Ok(count)
    }

    /// Looks up every comma-separated term, in request order.
    pub fn get_occurrences(&self, terms: &str) -> Vec<WordResponse> {
        split_terms(terms)
            .into_iter()
            .map(|word| {
                let occurrences = self.db.get(&word);
                WordResponse { word, occurrences }
            })
            .collect()
    }

    pub fn encode_datastore(&self) -> Result<Vec<u8>> {
        Ok(self.db.encode_datastore()?)
    }

    pub fn load_datastore(&self, encoded: &[u8]) -> Result<()> {
        Ok(self.db.load_datastore(encoded)?)
    }

    /// Routes every accepted write payload into `sender` from now on.
    pub async fn set_forwarding(&self, sender: mpsc::Sender<Bytes>) {
        *self.forwarding.write().await = Some(sender);
        tracing::info!("Forwarding of writes to workers enabled");
    }

    pub async fn unset_forwarding(&self) {
        if self.forwarding.write().await.take().is_some() {
            tracing::info!("Forwarding of writes to workers disabled");
        }
    }

    pub async fn is_forwarding(&self) -> bool {
        self.forwarding.read().await.is_some()
    }

    /// Queues `payload` for fan-out without waiting on the channel.
    ///
    /// Returns `false` when forwarding is off or the payload was dropped because
    /// the channel is full or closed.
    pub async fn forward(&self, payload: Bytes) -> bool {
        let guard = self.forwarding.read().await;
        let Some(sender) = guard.as_ref() else {
            return false;
        };

        match sender.try_send(payload) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::warn!("Forwarding channel is full, write not replicated");
                false
            }
            Err(TrySendError::Closed(_)) => {
                tracing::warn!("Forwarding channel is closed, write not replicated");
                false
            }
        }
    }
}
