use thiserror::Error;

/// Client-side error taxonomy.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No valid session — the caller should prompt login. Not retryable.
    #[error("not signed in")]
    Unauthenticated,

    /// A toggle for this book is already in flight. The second request
    /// is rejected, never silently duplicated.
    #[error("a wishlist update for book {0} is already pending")]
    TogglePending(String),

    /// The refresh credential was rejected; a new login is required.
    #[error("session refresh rejected")]
    RefreshInvalid,

    /// The server rejected the request.
    #[error("server returned {status}: {message}")]
    Api { status: u16, message: String },

    /// Network/transport failure. Any optimistic state has been rolled
    /// back; safe for the user to retry manually.
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ClientError {
    /// Build an Api error from a status code and a response body,
    /// pulling the server's message field when present.
    pub(crate) fn from_response(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v["message"].as_str().map(|s| s.to_string()))
            .unwrap_or_else(|| body.to_string());
        ClientError::Api { status, message }
    }
}
