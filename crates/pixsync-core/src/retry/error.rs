//! Outbound API error type shared by the Gemini and GitHub clients.

use std::fmt;

/// Marker the Gemini API puts in error bodies when a quota is exhausted.
pub const RESOURCE_EXHAUSTED: &str = "RESOURCE_EXHAUSTED";

/// Error returned by a single outbound API call (curl failure, HTTP error, or bad body).
/// Kept concrete so we can classify and decide retries before converting to anyhow.
#[derive(Debug)]
pub enum ApiError {
    /// Curl reported an error (timeout, connection refused, DNS, etc.).
    Transport(curl::Error),
    /// HTTP response had a non-2xx status. `body` is the raw response text.
    Http { status: u32, body: String },
    /// Response arrived but could not be decoded.
    Decode(serde_json::Error),
}

impl ApiError {
    /// HTTP status, if the server answered at all.
    pub fn status(&self) -> Option<u32> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            ApiError::Transport(_) | ApiError::Decode(_) => None,
        }
    }

    /// True when the error signals quota or rate-limit exhaustion.
    pub fn is_rate_limited(&self) -> bool {
        super::classify(self) == super::ErrorKind::RateLimited
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Transport(e) => write!(f, "transport: {}", e),
            ApiError::Http { status, body } if body.is_empty() => write!(f, "HTTP {}", status),
            ApiError::Http { status, body } => write!(f, "HTTP {}: {}", status, body.trim()),
            ApiError::Decode(e) => write!(f, "decode: {}", e),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Transport(e) => Some(e),
            ApiError::Decode(e) => Some(e),
            ApiError::Http { .. } => None,
        }
    }
}

impl From<curl::Error> for ApiError {
    fn from(e: curl::Error) -> Self {
        ApiError::Transport(e)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode(e)
    }
}
