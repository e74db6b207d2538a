//! Membership & Replication Module
//!
//! Manages the cluster topology of one master and a dynamic set of workers, and keeps
//! the workers' copies of the word table in step with the master.
//!
//! ## Core Mechanisms
//! - **Roles**: A node is `Master` or `Worker { master_id }`, decided by whether a master id is
//!   configured. The role is swapped atomically on promotion, the only transition there is.
//! - **Registration**: A worker posts its name to the master, which records it, sends the
//!   worker its full store, and broadcasts the new worker set to every worker.
//! - **Heartbeat**: The master probes all workers concurrently on a fixed interval and evicts
//!   the ones that do not answer in time.
//! - **Fan-out**: Client writes accepted by the master are queued on a bounded channel and
//!   replayed on every worker. Replication is best-effort; a re-registering worker catches up
//!   through full state transfer.
//! - **Leadership**: An external elector drives `LeaderCallbacks`. Promotion swaps the node
//!   API from the worker router to the master router on the same port.
//!
//! ## Submodules
//! - **`node`**: The `Node` itself: role, worker set, registration and broadcasts.
//! - **`heartbeat`**: Failure detection loop.
//! - **`replication`**: The fan-out task that drains the forwarding channel.
//! - **`leader`**: Leadership callbacks and promotion.
//! - **`client`**: Outbound node API calls, concurrent broadcast and retry.
//! - **`handlers`**: Master and worker routers.
//! - **`protocol`**: Endpoint paths.

pub mod client;
pub mod handlers;
pub mod heartbeat;
pub mod leader;
pub mod node;
pub mod protocol;
pub mod replication;
pub mod types;
pub mod workers;

pub use leader::LeaderCallbacks;
pub use node::Node;
