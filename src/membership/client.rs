//! Outbound node API calls.

use crate::error::{BroadcastError, PeerFailure};

use anyhow::Result;
use axum::body::Bytes;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Builds the URL of `endpoint` on `peer`.
///
/// A peer name that already carries a port (`host:port`) is used as-is;
/// otherwise the cluster-wide node port is appended.
pub fn peer_url(peer: &str, node_port: u16, endpoint: &str) -> String {
    if peer.contains(':') {
        format!("http://{}{}", peer, endpoint)
    } else {
        format!("http://{}:{}{}", peer, node_port, endpoint)
    }
}

/// HTTP client for talking to other nodes' node API.
#[derive(Clone)]
pub struct NodeClient {
    http: reqwest::Client,
    node_port: u16,
    timeout: Duration,
}

impl NodeClient {
    pub fn new(node_port: u16, timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            node_port,
            timeout,
        }
    }

    pub fn url(&self, peer: &str, endpoint: &str) -> String {
        peer_url(peer, self.node_port, endpoint)
    }

    pub async fn post_json<T: Serialize>(&self, peer: &str, endpoint: &str, payload: &T) -> Result<()> {
        let body = serde_json::to_vec(payload)?;
        self.post_bytes(peer, endpoint, Bytes::from(body)).await
    }

    /// Posts a pre-serialized JSON body.
    pub async fn post_bytes(&self, peer: &str, endpoint: &str, body: Bytes) -> Result<()> {
        let response = self
            .http
            .post(self.url(peer, endpoint))
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .timeout(self.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!("Unexpected status code: {}", response.status()));
        }
        Ok(())
    }

    pub async fn get(&self, peer: &str, endpoint: &str, timeout: Duration) -> Result<()> {
        let response = self
            .http
            .get(self.url(peer, endpoint))
            .timeout(timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!("Unexpected status code: {}", response.status()));
        }
        Ok(())
    }

    /// Posts `body` to `endpoint` on every peer concurrently.
    ///
    /// All sends complete before this returns; every failure is collected into
    /// one [`BroadcastError`].
    pub async fn broadcast(
        &self,
        peers: Vec<String>,
        endpoint: &str,
        body: Bytes,
    ) -> Result<(), BroadcastError> {
        let mut sends = JoinSet::new();
        for peer in peers {
            let client = self.clone();
            let endpoint = endpoint.to_string();
            let body = body.clone();
            sends.spawn(async move {
                let result = client.post_bytes(&peer, &endpoint, body).await;
                (peer, result)
            });
        }

        let mut failures = Vec::new();
        while let Some(joined) = sends.join_next().await {
            match joined {
                Ok((peer, Ok(()))) => {
                    tracing::trace!("Sent {} to {}", endpoint, peer);
                }
                Ok((peer, Err(e))) => failures.push(PeerFailure {
                    peer,
                    reason: e.to_string(),
                }),
                Err(e) => failures.push(PeerFailure {
                    peer: "<unknown>".to_string(),
                    reason: format!("send task failed: {}", e),
                }),
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(BroadcastError {
                endpoint: endpoint.to_string(),
                failures,
            })
        }
    }
}

/// Runs `operation` up to `attempts` times, sleeping `interval` plus a little
/// jitter between tries. Gives up as soon as `cancel` fires.
pub async fn retry<T, F, Fut>(
    attempts: usize,
    interval: Duration,
    cancel: &CancellationToken,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = attempts.max(1);
    let mut last_error = None;

    for attempt in 0..attempts {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                tracing::warn!("Attempt {}/{} failed: {}", attempt + 1, attempts, e);
                last_error = Some(e);
            }
        }

        if attempt + 1 == attempts {
            break;
        }

        let jitter = Duration::from_millis(rand::random::<u64>() % 100);
        tokio::select! {
            _ = tokio::time::sleep(interval + jitter) => {}
            _ = cancel.cancelled() => {
                return Err(anyhow::anyhow!("Retry aborted by shutdown"));
            }
        }
    }

    match last_error {
        Some(e) => Err(e.context(format!("All {} retries failed", attempts))),
        None => Err(anyhow::anyhow!("Retry attempts exhausted")),
    }
}
