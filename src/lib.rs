//! Distributed Word Occurrence Store Library
//!
//! This library crate defines the modules that make up a `mem-db` node.
//! It serves as the foundation for the binary executable (`main.rs`).
//!
//! ## Architecture Modules
//! The system is composed of four subsystems plus the shared plumbing around them:
//!
//! - **`storage`**: The durability layer. A concurrent word → count table backed by an
//!   append-only write-ahead log, startup recovery from that log, and periodic JSON snapshots.
//! - **`executor`**: A bounded worker pool used to parallelize bulk word ingestion.
//! - **`service`**: The word API. Tokenizes text, inserts the words through the pool, answers
//!   occurrence queries, and hands accepted writes to replication on the master.
//! - **`membership`**: The cluster layer. Master/worker roles, worker registration with full
//!   state transfer, heartbeat-based failure detection, write fan-out and leadership hand-off.
//!
//! Supporting modules: `config` (JSON configuration), `error` (typed storage and broadcast
//! errors), `server` (axum server lifecycle) and `shutdown` (signal handling).

pub mod config;
pub mod error;
pub mod executor;
pub mod membership;
pub mod server;
pub mod service;
pub mod shutdown;
pub mod storage;
