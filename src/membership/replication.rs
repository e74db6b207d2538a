//! Master-side write fan-out.

use super::node::Node;
use super::protocol::ENDPOINT_REPLICATE;
use crate::error::BroadcastError;

use axum::body::Bytes;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

impl Node {
    /// Sends one write payload to every known worker concurrently.
    ///
    /// With no workers this is a no-op. Failures are returned combined; the
    /// local write is never rolled back.
    pub async fn replicate(&self, payload: Bytes) -> Result<(), BroadcastError> {
        let workers = self.workers().snapshot();
        if workers.is_empty() {
            tracing::trace!("No workers to replicate to");
            return Ok(());
        }

        tracing::debug!("Forwarding write to workers {:?}", workers);
        self.client()
            .broadcast(workers, ENDPOINT_REPLICATE, payload)
            .await
    }
}

/// Owns the receiving end of the forwarding channel and fans out every payload.
///
/// On cancellation the channel is closed, whatever is still queued is sent,
/// and the task returns.
pub async fn run_replication(
    node: Arc<Node>,
    mut receiver: mpsc::Receiver<Bytes>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            payload = receiver.recv() => match payload {
                Some(payload) => replicate_and_log(&node, payload).await,
                None => {
                    tracing::debug!("Forwarding channel closed");
                    return;
                }
            },
            _ = cancel.cancelled() => break,
        }
    }

    receiver.close();
    let mut drained = 0usize;
    while let Some(payload) = receiver.recv().await {
        replicate_and_log(&node, payload).await;
        drained += 1;
    }
    tracing::debug!("Replication stopped after draining {} queued writes", drained);
}

async fn replicate_and_log(node: &Node, payload: Bytes) {
    if let Err(e) = node.replicate(payload).await {
        tracing::error!("Cannot replicate the request to the workers: {}", e);
    }
}
