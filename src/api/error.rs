//! Errors raised by the transport and the typed endpoint client.

/// API-level errors, one variant per failure class the caller can act on.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Cannot reach server at {0}")]
    Connection(String),
    #[error("Request timed out")]
    Timeout,
    #[error("HTTP client error: {0}")]
    HttpClient(String),
    #[error("Authentication required")]
    Unauthorized,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Unexpected response from {endpoint}: {reason}")]
    Decode { endpoint: String, reason: String },
    #[error("Invalid identifier: {0:?}")]
    InvalidId(String),
}

impl ApiError {
    /// Map a non-success HTTP status and its body to an error.
    pub fn from_status(status: u16, path: &str, body: &str) -> Self {
        match status {
            401 => ApiError::Unauthorized,
            404 => ApiError::NotFound(path.to_string()),
            _ => ApiError::Status {
                status,
                message: error_message(body),
            },
        }
    }
}

/// Longest server message kept verbatim.
const MAX_MESSAGE_CHARS: usize = 200;

/// Pull a human-readable message out of an error body.
///
/// Understands `{"message": ..}`, `{"error": ".."}` and
/// `{"error": {"message": ..}}`; anything else is returned as trimmed text.
pub fn error_message(body: &str) -> String {
    let body = body.trim();
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        let found = json
            .get("message")
            .and_then(|m| m.as_str())
            .or_else(|| json.get("error").and_then(|e| e.as_str()))
            .or_else(|| {
                json.get("error")
                    .and_then(|e| e.get("message"))
                    .and_then(|m| m.as_str())
            });
        if let Some(message) = found {
            return truncate(message);
        }
    }
    if body.is_empty() {
        return "No response body".to_string();
    }
    truncate(body)
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_MESSAGE_CHARS {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(MAX_MESSAGE_CHARS).collect();
    cut.push('…');
    cut
}
