//! Errors raised while talking to the upstream REST API.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure or an unreadable body.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request timed out: {0}")]
    Timeout(String),

    /// HTTP 401; callers drop the client's stored credentials.
    #[error("Session expired or invalid")]
    Unauthorized,

    #[error("Upstream returned {status}: {message}")]
    Status { status: u16, message: String },

    /// A 2xx response carrying `"success": false`.
    #[error("Upstream rejected the request: {0}")]
    Rejected(String),

    #[error("Unexpected response from {context}: {source}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool { matches!(self, Self::Unauthorized) }
    pub fn is_not_found(&self) -> bool { matches!(self, Self::Status { status: 404, .. }) }
}
