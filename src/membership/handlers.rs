use super::node::Node;
use super::protocol::*;
use super::types::{NodeDetails, NodeStatus};
use crate::service::types::{ApiResponse, TextInput};

use axum::body::Bytes;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use std::sync::Arc;

pub fn master_router(node: Arc<Node>) -> Router {
    Router::new()
        .route(ENDPOINT_REGISTER, post(handle_register))
        .route(ENDPOINT_WORKERS, get(handle_list_workers))
        .route(ENDPOINT_STATUS, get(handle_status))
        .layer(Extension(node))
}

pub fn worker_router(node: Arc<Node>) -> Router {
    Router::new()
        .route(ENDPOINT_WORKERS_LIST, post(handle_workers_list))
        .route(ENDPOINT_MASTER_ID, post(handle_master_id))
        .route(ENDPOINT_MASTER_DATABASE, post(handle_master_database))
        .route(ENDPOINT_REPLICATE, post(handle_replicate))
        .route(ENDPOINT_HEARTBEAT, get(handle_heartbeat))
        .route(ENDPOINT_STATUS, get(handle_status))
        .layer(Extension(node))
}

fn reply(code: StatusCode, message: impl Into<String>) -> (StatusCode, Json<ApiResponse>) {
    (code, Json(ApiResponse::message(code, message)))
}

// --- Master role ---

pub async fn handle_register(
    Extension(node): Extension<Arc<Node>>,
    body: Bytes,
) -> (StatusCode, Json<ApiResponse>) {
    let details: NodeDetails = match serde_json::from_slice(&body) {
        Ok(details) => details,
        Err(e) => {
            tracing::error!("Invalid registration request: {}", e);
            return reply(StatusCode::BAD_REQUEST, format!("Invalid request body: {}", e));
        }
    };

    if details.name.trim().is_empty() {
        return reply(StatusCode::BAD_REQUEST, "Worker name is empty");
    }

    match node.handle_registration(&details.name).await {
        Ok(()) => reply(StatusCode::OK, format!("Registered worker {}", details.name)),
        Err(e) => {
            tracing::error!("Failed to register worker {}: {:#}", details.name, e);
            reply(StatusCode::INTERNAL_SERVER_ERROR, format!("{:#}", e))
        }
    }
}

pub async fn handle_list_workers(
    Extension(node): Extension<Arc<Node>>,
) -> (StatusCode, Json<ApiResponse<Vec<String>>>) {
    (
        StatusCode::OK,
        Json(ApiResponse::success(node.workers().snapshot())),
    )
}

// --- Worker role ---

pub async fn handle_workers_list(
    Extension(node): Extension<Arc<Node>>,
    body: Bytes,
) -> (StatusCode, Json<ApiResponse>) {
    match serde_json::from_slice::<Vec<String>>(&body) {
        Ok(workers) => {
            node.update_workers_list(workers);
            reply(StatusCode::OK, "Workers list updated")
        }
        Err(e) => {
            tracing::error!("Invalid request body for workers list: {}", e);
            reply(
                StatusCode::BAD_REQUEST,
                format!("Invalid request body for workers list: {}", e),
            )
        }
    }
}

pub async fn handle_master_id(
    Extension(node): Extension<Arc<Node>>,
    body: Bytes,
) -> (StatusCode, Json<ApiResponse>) {
    match serde_json::from_slice::<NodeDetails>(&body) {
        Ok(details) => {
            node.update_master_id(&details.name);
            reply(StatusCode::OK, "Master id updated")
        }
        Err(e) => {
            tracing::error!("Invalid request body for master id: {}", e);
            reply(
                StatusCode::BAD_REQUEST,
                format!("Invalid request body for master id: {}", e),
            )
        }
    }
}

pub async fn handle_master_database(
    Extension(node): Extension<Arc<Node>>,
    body: Bytes,
) -> (StatusCode, Json<ApiResponse>) {
    tracing::info!("Received encoded database from master");

    match node.service().load_datastore(&body) {
        Ok(()) => {
            tracing::info!("Loaded database received from master");
            reply(StatusCode::OK, "Database loaded")
        }
        Err(e) => {
            tracing::error!("Error loading datastore: {}", e);
            reply(
                StatusCode::BAD_REQUEST,
                format!("Error loading datastore: {}", e),
            )
        }
    }
}

pub async fn handle_replicate(
    Extension(node): Extension<Arc<Node>>,
    body: Bytes,
) -> (StatusCode, Json<ApiResponse>) {
    let input = match TextInput::parse(&body) {
        Ok(input) => input,
        Err(message) => {
            tracing::error!("Rejected replicated write: {}", message);
            return reply(StatusCode::BAD_REQUEST, message);
        }
    };

    match node.service().register_words(&input.text).await {
        Ok(count) => {
            tracing::debug!("Applied replicated write of {} words", count);
            reply(StatusCode::OK, "Text processed successfully")
        }
        Err(e) => {
            tracing::error!("Failed to apply replicated write: {}", e);
            reply(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

pub async fn handle_heartbeat() -> StatusCode {
    tracing::trace!("Heartbeat");
    StatusCode::OK
}

// --- Both roles ---

pub async fn handle_status(
    Extension(node): Extension<Arc<Node>>,
) -> (StatusCode, Json<ApiResponse<NodeStatus>>) {
    (StatusCode::OK, Json(ApiResponse::success(node.status())))
}
