//! Word Service Module
//!
//! The client-facing side of a node: turns text into word inserts and answers
//! occurrence queries.
//!
//! ## Core Concepts
//! - **Tokenization**: text is split on whitespace and `,.-_`, and every word is lower-cased.
//! - **Parallel Ingestion**: each registration inserts its words through a bounded
//!   `WorkerPool`, so a large text never spawns more than `pool_size` concurrent inserts.
//! - **Forwarding**: on the master, every accepted write payload is also queued on the
//!   forwarding channel for replication. The client response never waits on replication.
//!
//! ## Submodules
//! - **`handlers`**: Axum handlers and router for `/words/*`.
//! - **`service`**: `WordService`, shared by the word API and the node API.
//! - **`tokenizer`**: Phrase and term splitting.
//! - **`types`**: Request/response DTOs and the response envelope.

pub mod handlers;
pub mod service;
pub mod tokenizer;
pub mod types;

pub use service::WordService;

#[cfg(test)]
mod tests;
