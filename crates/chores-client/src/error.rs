use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connection refused, timeout, ...).
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success status on an endpoint without an explicit success flag.
    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// Body was not JSON or did not match the endpoint's schema.
    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid server URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl ApiError {
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        ApiError::Status { status, message: message.into() }
    }

    pub fn not_found(what: &str) -> Self {
        Self::status(404, format!("{what} not found"))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { status: 404, .. })
    }
}
