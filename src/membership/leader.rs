//! Leadership hand-off.
//!
//! Leader election itself is external; this module only reacts to its
//! notifications through [`LeaderCallbacks`].

use super::node::Node;
use super::types::NodeRole;

use anyhow::Result;
use async_trait::async_trait;

/// Notifications delivered by a leader-election mechanism.
#[async_trait]
pub trait LeaderCallbacks: Send + Sync {
    /// This node became leader.
    async fn on_started_leading(&self);

    /// This node is no longer leader. Terminal.
    async fn on_stopped_leading(&self);

    /// `identity` is the current leader, possibly this node.
    async fn on_new_leader(&self, identity: &str);
}

impl Node {
    /// Turns a worker into the master.
    ///
    /// The worker node API is stopped and a master node API is started on the
    /// same port. Forwarding and heartbeat start, and the known workers are
    /// told about their new master.
    pub async fn promote(&self) -> Result<()> {
        if self.is_master() {
            tracing::info!("Node {} is already master", self.name());
            return Ok(());
        }

        tracing::info!("Promoting node {} to master", self.name());
        self.stop_server().await;
        self.set_role(NodeRole::Master);
        self.start_server().await?;
        self.start_master_duties().await?;

        if let Err(e) = self.broadcast_master_id().await {
            tracing::warn!("Errors broadcasting the master's name: {}", e);
        }

        tracing::info!("Node {} is now master", self.name());
        Ok(())
    }
}

#[async_trait]
impl LeaderCallbacks for Node {
    async fn on_started_leading(&self) {
        if let Err(e) = self.promote().await {
            tracing::error!("Promotion to master failed, shutting down: {}", e);
            self.mark_leadership_lost();
            self.shutdown_token().cancel();
        }
    }

    async fn on_stopped_leading(&self) {
        tracing::error!("Node {} lost leadership, shutting down", self.name());
        self.mark_leadership_lost();
        self.shutdown_token().cancel();
    }

    async fn on_new_leader(&self, identity: &str) {
        if identity == self.name() {
            tracing::debug!("Node {} is the leader", identity);
            return;
        }

        tracing::info!("New leader elected: {}", identity);
        self.update_master_id(identity);
    }
}
