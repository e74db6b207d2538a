use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

/// Body of a word registration, both from clients and from the master's fan-out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextInput {
    pub text: String,
}

impl TextInput {
    /// Validates a raw request body. The error is the message returned to the caller.
    pub fn parse(body: &[u8]) -> Result<Self, String> {
        if body.is_empty() {
            return Err("Request body is empty".to_string());
        }

        let input: TextInput =
            serde_json::from_slice(body).map_err(|e| format!("Invalid request body: {}", e))?;

        if input.text.trim().is_empty() {
            return Err("Text field is empty".to_string());
        }

        Ok(input)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordResponse {
    pub word: String,
    pub occurrences: u64,
}

#[derive(Debug, Deserialize)]
pub struct OccurrenceParams {
    pub terms: Option<String>,
}

/// Envelope shared by every HTTP response of the node.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T = ()> {
    pub status: String,
    pub status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: status_text(StatusCode::OK),
            status_code: StatusCode::OK.as_u16(),
            data: Some(data),
            message: None,
        }
    }

    pub fn message(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status: status_text(code),
            status_code: code.as_u16(),
            data: None,
            message: Some(message.into()),
        }
    }
}

fn status_text(code: StatusCode) -> String {
    if code.is_success() {
        "Success".to_string()
    } else {
        code.canonical_reason().unwrap_or("Error").to_string()
    }
}
