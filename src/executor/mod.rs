//! Task Executor Module
//!
//! Bounded-concurrency execution used to parallelize bulk word ingestion.
//!
//! ## Core Concepts
//! - **Fixed Workers**: a pool is created with a worker count `K` and spawns exactly `K`
//!   long-lived tokio tasks on `start`.
//! - **Rendezvous Queue**: `submit` blocks until an idle worker takes the task, which bounds
//!   the number of running tasks without an unbounded backlog.
//! - **Drain on Stop**: `stop` closes the queue and joins every worker, so all submitted
//!   tasks have completed when it returns.
//!
//! ## Submodules
//! - **`pool`**: The `WorkerPool` itself.

pub mod pool;

pub use pool::WorkerPool;
