//! The cluster node: role, known workers, and the node API server it drives.

use super::client::{NodeClient, retry};
use super::handlers::{master_router, worker_router};
use super::protocol::{
    ENDPOINT_MASTER_DATABASE, ENDPOINT_MASTER_ID, ENDPOINT_REGISTER, ENDPOINT_WORKERS_LIST,
};
use super::replication::run_replication;
use super::types::{NodeDetails, NodeRole, NodeStatus};
use super::workers::WorkerSet;
use crate::config::NodeOptions;
use crate::server::ApiServer;
use crate::service::WordService;

use anyhow::Result;
use arc_swap::ArcSwap;
use axum::body::Bytes;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

pub struct Node {
    /// Handle to the owning `Arc`, for spawning tasks and building routers from `&self`.
    me: Weak<Node>,
    name: String,
    options: NodeOptions,
    role: ArcSwap<NodeRole>,
    workers: WorkerSet,
    service: Arc<WordService>,
    client: NodeClient,
    server: Mutex<Option<ApiServer>>,
    /// Process-wide shutdown token; cancelled when leadership is lost.
    shutdown: CancellationToken,
    /// Stops this node's background tasks. Child of `shutdown`.
    cancel: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    leadership_lost: AtomicBool,
}

impl Node {
    pub fn new(
        options: NodeOptions,
        service: Arc<WordService>,
        shutdown: &CancellationToken,
    ) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            me: me.clone(),
            name: options.name.clone(),
            role: ArcSwap::from_pointee(NodeRole::from_master_id(&options.master_id)),
            workers: WorkerSet::new(),
            service,
            client: NodeClient::new(options.port, options.heartbeat_timeout()),
            server: Mutex::new(None),
            shutdown: shutdown.clone(),
            cancel: shutdown.child_token(),
            tasks: Mutex::new(Vec::new()),
            leadership_lost: AtomicBool::new(false),
            options,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &NodeOptions {
        &self.options
    }

    pub fn role(&self) -> Arc<NodeRole> {
        self.role.load_full()
    }

    pub fn is_master(&self) -> bool {
        self.role.load().is_master()
    }

    pub fn master_id(&self) -> Option<String> {
        self.role.load().master_id().map(str::to_string)
    }

    pub fn workers(&self) -> &WorkerSet {
        &self.workers
    }

    pub fn service(&self) -> &Arc<WordService> {
        &self.service
    }

    pub fn client(&self) -> &NodeClient {
        &self.client
    }

    pub(crate) fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown
    }

    /// Set once this node has been told it lost leadership.
    pub fn leadership_lost(&self) -> bool {
        self.leadership_lost.load(Ordering::SeqCst)
    }

    pub(crate) fn mark_leadership_lost(&self) {
        self.leadership_lost.store(true, Ordering::SeqCst);
    }

    pub fn status(&self) -> NodeStatus {
        let role = self.role();
        NodeStatus {
            name: self.name.clone(),
            role: role.label().to_string(),
            master_id: role.master_id().map(str::to_string),
            workers: self.workers.snapshot(),
        }
    }

    pub(crate) fn arc(&self) -> Result<Arc<Node>> {
        self.me
            .upgrade()
            .ok_or_else(|| anyhow::anyhow!("Node {} is being dropped", self.name))
    }

    fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.options.port))
    }

    /// Starts the node API for the configured role.
    ///
    /// A master also starts forwarding and the heartbeat loop. A worker
    /// registers with its master, retrying as configured; failing to register
    /// is an error.
    pub async fn start(&self) -> Result<()> {
        self.start_server().await?;

        if self.is_master() {
            tracing::info!("Node {} starting as master", self.name);
            self.start_master_duties().await
        } else {
            tracing::info!("Node {} starting as worker", self.name);
            self.register_with_master().await
        }
    }

    /// Stops the node API and waits for the heartbeat and replication tasks.
    pub async fn stop(&self) {
        self.cancel.cancel();
        self.service.unset_forwarding().await;
        self.stop_server().await;

        let tasks: Vec<_> = self.tasks.lock().await.drain(..).collect();
        for task in tasks {
            if let Err(e) = task.await {
                tracing::error!("Node task terminated abnormally: {}", e);
            }
        }

        tracing::info!("Node {} stopped", self.name);
    }

    /// Starts the node API server with the router of the current role.
    pub(crate) async fn start_server(&self) -> Result<()> {
        let node = self.arc()?;
        let (label, router) = if self.is_master() {
            ("master node API", master_router(node))
        } else {
            ("worker node API", worker_router(node))
        };

        let server = ApiServer::start(label, self.bind_addr(), router).await?;
        *self.server.lock().await = Some(server);
        Ok(())
    }

    pub(crate) async fn stop_server(&self) {
        if let Some(server) = self.server.lock().await.take() {
            server.stop().await;
        }
    }

    pub(crate) fn set_role(&self, role: NodeRole) {
        self.role.store(Arc::new(role));
    }

    /// Activates forwarding and spawns the heartbeat loop.
    pub(crate) async fn start_master_duties(&self) -> Result<()> {
        self.activate_forwarding().await?;

        let node = self.arc()?;
        let cancel = self.cancel.clone();
        self.spawn(async move { node.run_heartbeat(cancel).await })
            .await;

        tracing::info!("Heartbeat process started");
        Ok(())
    }

    /// Creates the forwarding channel, hands its sender to the word service,
    /// and spawns the fan-out task that owns the receiver.
    pub async fn activate_forwarding(&self) -> Result<()> {
        let (sender, receiver) = mpsc::channel(self.options.forwarding_capacity.max(1));
        self.service.set_forwarding(sender).await;

        let node = self.arc()?;
        let cancel = self.cancel.clone();
        self.spawn(async move { run_replication(node, receiver, cancel).await })
            .await;
        Ok(())
    }

    async fn spawn<F>(&self, task: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let span = tracing::info_span!("node", name = %self.name);
        let handle = tokio::spawn(task.instrument(span));
        self.tasks.lock().await.push(handle);
    }

    // ============================================================
    // MASTER SIDE
    // ============================================================

    pub fn register_worker(&self, name: &str) {
        if self.workers.add(name) {
            tracing::info!("Registered node {} as worker", name);
        } else {
            tracing::info!("Worker {} registered again", name);
        }
    }

    pub fn delete_worker(&self, name: &str) {
        if self.workers.remove(name) {
            tracing::warn!("Deleted worker {} from list", name);
            tracing::info!("Active workers: {:?}", self.workers.snapshot());
        }
    }

    /// Adds `name` to the worker set, transfers the full store to it, and
    /// tells every worker about the new set.
    ///
    /// A failed state transfer undoes the registration. Failing to reach other
    /// workers with the new list is only logged; heartbeat will evict them.
    pub async fn handle_registration(&self, name: &str) -> Result<()> {
        self.register_worker(name);

        let state = self.service.encode_datastore()?;
        if let Err(e) = self
            .client
            .post_bytes(name, ENDPOINT_MASTER_DATABASE, Bytes::from(state))
            .await
        {
            self.workers.remove(name);
            return Err(e.context(format!("Cannot send database to worker {}", name)));
        }
        tracing::info!("Sent database to worker {}", name);

        if let Err(e) = self.broadcast_workers_list().await {
            tracing::warn!("Errors broadcasting the workers list: {}", e);
        }
        Ok(())
    }

    /// Sends the current worker set to every worker.
    ///
    /// Delivery failures surface as a [`crate::error::BroadcastError`] inside the returned error.
    pub async fn broadcast_workers_list(&self) -> Result<()> {
        let workers = self.workers.snapshot();
        let payload = serde_json::to_vec(&workers)?;

        tracing::info!("Broadcasting workers list {:?}", workers);
        self.client
            .broadcast(workers, ENDPOINT_WORKERS_LIST, Bytes::from(payload))
            .await?;
        Ok(())
    }

    /// Announces this node as master to every known worker.
    pub async fn broadcast_master_id(&self) -> Result<()> {
        let payload = serde_json::to_vec(&NodeDetails {
            name: self.name.clone(),
        })?;

        tracing::info!("Sending master-id {} to workers", self.name);
        self.client
            .broadcast(self.workers.snapshot(), ENDPOINT_MASTER_ID, Bytes::from(payload))
            .await?;
        Ok(())
    }

    // ============================================================
    // WORKER SIDE
    // ============================================================

    /// One registration attempt against the current master.
    pub async fn send_registration_request(&self) -> Result<()> {
        let master = self
            .master_id()
            .ok_or_else(|| anyhow::anyhow!("Node {} is master, nothing to register with", self.name))?;

        tracing::info!("Registering worker {} to master {}", self.name, master);
        self.client
            .post_json(
                &master,
                ENDPOINT_REGISTER,
                &NodeDetails {
                    name: self.name.clone(),
                },
            )
            .await
            .map_err(|e| {
                e.context(format!(
                    "Cannot register the worker {} to the master {}",
                    self.name, master
                ))
            })?;

        tracing::info!("Successfully registered to the master {}", master);
        Ok(())
    }

    /// Registers with the master, retrying as configured.
    pub async fn register_with_master(&self) -> Result<()> {
        retry(
            self.options.registration_attempts,
            self.options.registration_interval(),
            &self.cancel,
            || self.send_registration_request(),
        )
        .await
    }

    /// Points a worker at a new master. Ignored on a master.
    pub fn update_master_id(&self, master_id: &str) {
        if self.is_master() {
            tracing::warn!("Ignoring master-id {} on master node", master_id);
            return;
        }
        self.set_role(NodeRole::Worker {
            master_id: master_id.to_string(),
        });
        tracing::info!("Updated master id to {}", master_id);
    }

    /// Adopts the master's worker set, minus this node.
    pub fn update_workers_list(&self, workers: Vec<String>) {
        self.workers
            .replace(workers.into_iter().filter(|worker| *worker != self.name));
        tracing::info!("Updated workers list: {:?}", self.workers.snapshot());
    }
}
