//! Storage Module
//!
//! Owns the node's copy of the word table and everything that keeps it durable.
//!
//! ## Core Concepts
//! - **Word Store**: `WordStore` is a concurrent word → count table with per-key atomic increments.
//! - **Write-Ahead Log**: every accepted word is appended to `Wal` as one line; the buffer is
//!   flushed and fsynced periodically and on shutdown.
//! - **Recovery**: on startup the log is replayed line by line into a fresh store, and the same
//!   file handle is reused for appends.
//! - **Snapshots**: `Snapshotter` dumps the table to timestamped JSON files on a timer. Snapshots
//!   serve operators and full-state transfer; recovery never reads them.

pub mod database;
pub mod memory;
pub mod recovery;
pub mod snapshot;
pub mod wal;

pub use database::Database;
pub use memory::WordStore;
pub use snapshot::Snapshotter;
pub use wal::Wal;
