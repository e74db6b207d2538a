use crate::error::StorageResult;

use dashmap::DashMap;
use std::collections::BTreeMap;

/// Concurrent word → occurrence count table.
///
/// Each increment runs under the shard lock of its key, so concurrent inserts of
/// the same word never lose an update. Reads never block writers of other shards.
#[derive(Debug, Default)]
pub struct WordStore {
    words: DashMap<String, u64>,
}

impl WordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lower-cases `word` and increments its count, returning the new count.
    pub fn insert(&self, word: &str) -> u64 {
        self.increment(&word.to_lowercase())
    }

    /// Increments `word` exactly as given. Used by WAL replay, whose tokens are
    /// already normalized.
    pub fn increment(&self, word: &str) -> u64 {
        let mut count = self.words.entry(word.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    pub fn get(&self, word: &str) -> u64 {
        self.words
            .get(&word.to_lowercase())
            .map(|count| *count)
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Point-in-time copy of the table. Inserts racing with the copy may or may
    /// not be included.
    pub fn to_map(&self) -> BTreeMap<String, u64> {
        self.words
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect()
    }

    pub fn encode(&self) -> StorageResult<Vec<u8>> {
        Ok(serde_json::to_vec(&self.to_map())?)
    }

    pub fn decode(encoded: &[u8]) -> StorageResult<Self> {
        let data: BTreeMap<String, u64> = serde_json::from_slice(encoded)?;
        Ok(data.into_iter().collect())
    }

    /// Replaces the whole table with the decoded full state.
    ///
    /// Decoding happens first, so a malformed payload leaves the table untouched.
    pub fn load(&self, encoded: &[u8]) -> StorageResult<()> {
        let data: BTreeMap<String, u64> = serde_json::from_slice(encoded)?;
        self.words.clear();
        for (word, count) in data {
            self.words.insert(word, count);
        }
        Ok(())
    }
}

impl FromIterator<(String, u64)> for WordStore {
    fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
        Self {
            words: iter.into_iter().collect(),
        }
    }
}
