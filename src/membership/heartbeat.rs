//! Master-side failure detection.

use super::node::Node;
use super::protocol::ENDPOINT_HEARTBEAT;

use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

impl Node {
    /// Probes every known worker concurrently and removes the ones that fail.
    ///
    /// Removal only starts after every probe has finished. Returns the evicted
    /// workers.
    pub async fn check_and_remove_dead_workers(&self) -> Vec<String> {
        let timeout = self.options().heartbeat_timeout();
        let mut probes = JoinSet::new();

        for worker in self.workers().snapshot() {
            let client = self.client().clone();
            probes.spawn(async move {
                let result = client.get(&worker, ENDPOINT_HEARTBEAT, timeout).await;
                (worker, result)
            });
        }

        let mut dead = Vec::new();
        while let Some(joined) = probes.join_next().await {
            match joined {
                Ok((worker, Ok(()))) => tracing::trace!("Worker {} is alive", worker),
                Ok((worker, Err(e))) => {
                    tracing::warn!("Worker {} not responding: {}", worker, e);
                    dead.push(worker);
                }
                Err(e) => tracing::error!("Heartbeat probe task failed: {}", e),
            }
        }

        for worker in &dead {
            tracing::warn!("Removing worker due to heartbeat failure: {}", worker);
            self.delete_worker(worker);
        }

        if !dead.is_empty() && self.workers().is_empty() {
            tracing::warn!("No workers left, replication suspended until a worker registers");
        }

        dead
    }

    /// Runs a heartbeat round every interval until `cancel` fires.
    pub async fn run_heartbeat(self: Arc<Self>, cancel: CancellationToken) {
        let period = self.options().heartbeat_interval();
        let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.check_and_remove_dead_workers().await;
                }
                _ = cancel.cancelled() => {
                    tracing::debug!("Heartbeat process stopped");
                    return;
                }
            }
        }
    }
}
