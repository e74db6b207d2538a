use super::service::WordService;
use super::types::{ApiResponse, OccurrenceParams, TextInput, WordResponse};

use axum::body::Bytes;
use axum::extract::Query;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use std::sync::Arc;

pub const ENDPOINT_REGISTER_WORDS: &str = "/words/register";
pub const ENDPOINT_OCCURRENCES: &str = "/words/occurrences";

/// Client-facing word API. Served for the whole life of the process, whatever the node's role.
pub fn router(service: Arc<WordService>) -> Router {
    Router::new()
        .route(ENDPOINT_REGISTER_WORDS, post(handle_register_words))
        .route(ENDPOINT_OCCURRENCES, get(handle_get_occurrences))
        .layer(Extension(service))
}

pub async fn handle_register_words(
    Extension(service): Extension<Arc<WordService>>,
    body: Bytes,
) -> (StatusCode, Json<ApiResponse>) {
    let input = match TextInput::parse(&body) {
        Ok(input) => input,
        Err(message) => {
            tracing::debug!("Rejected word registration: {}", message);
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::message(StatusCode::BAD_REQUEST, message)),
            );
        }
    };

    if let Err(e) = service.register_words(&input.text).await {
        tracing::error!("Failed to register words: {}", e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::message(
                StatusCode::INTERNAL_SERVER_ERROR,
                e.to_string(),
            )),
        );
    }

    if service.forward(body).await {
        tracing::debug!("Queued write for replication");
    }

    (
        StatusCode::OK,
        Json(ApiResponse::message(
            StatusCode::OK,
            "Text processed successfully",
        )),
    )
}

pub async fn handle_get_occurrences(
    Extension(service): Extension<Arc<WordService>>,
    Query(params): Query<OccurrenceParams>,
) -> (StatusCode, Json<ApiResponse<Vec<WordResponse>>>) {
    let terms = params.terms.unwrap_or_default();
    let results = service.get_occurrences(&terms);

    if results.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::message(
                StatusCode::BAD_REQUEST,
                "No words provided into request",
            )),
        );
    }

    (StatusCode::OK, Json(ApiResponse::success(results)))
}
