//! HTTP server lifecycle shared by the word API and the node API.

use anyhow::Result;
use axum::Router;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Time in-flight requests get to finish once a server is asked to stop.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(4);

/// A running axum server with its own shutdown token.
pub struct ApiServer {
    label: String,
    addr: SocketAddr,
    shutdown: CancellationToken,
    handle: JoinHandle<()>,
}

impl ApiServer {
    /// Binds `addr` and starts serving `router` in the background.
    ///
    /// Binding happens before this returns, so a port conflict is reported here
    /// and requests sent afterwards are accepted.
    pub async fn start(label: &str, addr: SocketAddr, router: Router) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| anyhow::anyhow!("Cannot bind {} server to {}: {}", label, addr, e))?;
        let addr = listener.local_addr()?;

        let shutdown = CancellationToken::new();
        let signal = shutdown.clone().cancelled_owned();
        let server_label = label.to_string();
        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router)
                .with_graceful_shutdown(signal)
                .await
            {
                tracing::error!("{} server error: {}", server_label, e);
            }
        });

        tracing::info!("{} server listening on {}", label, addr);
        Ok(Self {
            label: label.to_string(),
            addr,
            shutdown,
            handle,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stops accepting connections and waits up to [`SHUTDOWN_GRACE`] for
    /// in-flight requests, then aborts the server task.
    pub async fn stop(self) {
        tracing::info!("Shutting down {} server on {}", self.label, self.addr);
        self.shutdown.cancel();

        let mut handle = self.handle;
        if tokio::time::timeout(SHUTDOWN_GRACE, &mut handle).await.is_err() {
            tracing::warn!(
                "{} server did not stop within {:?}, aborting",
                self.label,
                SHUTDOWN_GRACE
            );
            handle.abort();
        }
    }
}
