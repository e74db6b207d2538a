//! Node API Protocol
//!
//! Endpoints of the node API. Master and worker roles serve disjoint route sets,
//! except for the status endpoint.

// --- Master role ---

/// A worker announces itself to the master.
pub const ENDPOINT_REGISTER: &str = "/master/register";
/// Current worker set, for inspection.
pub const ENDPOINT_WORKERS: &str = "/master/workers";

// --- Worker role ---

/// Replaces the worker's view of its peers. Body is a JSON array of names.
pub const ENDPOINT_WORKERS_LIST: &str = "/worker/workers-list";
/// Points the worker at a newly promoted master.
pub const ENDPOINT_MASTER_ID: &str = "/worker/master-id";
/// Full-state transfer from the master, sent right after registration.
pub const ENDPOINT_MASTER_DATABASE: &str = "/worker/master-database";
/// A client write fanned out by the master.
pub const ENDPOINT_REPLICATE: &str = "/worker/replicate";
/// Liveness probe.
pub const ENDPOINT_HEARTBEAT: &str = "/worker/heartbeat";

// --- Both roles ---

pub const ENDPOINT_STATUS: &str = "/node/status";
