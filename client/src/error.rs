//! Error types shared across the client crate.
//!
//! ERROR HANDLING
//! ==============
//! Transport failures surface unmodified to callers as `ApiError`; storage
//! absence is never an error, but a failed write-through is reported as
//! `StorageError` instead of being swallowed.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

// =============================================================================
// API
// =============================================================================

/// Errors produced by REST and websocket calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Network failure, timeout, or client construction failure.
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("server returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body did not match the expected shape.
    #[error("response decode failed: {0}")]
    Decode(#[from] serde_json::Error),

    /// The configured base URL cannot be mapped to a websocket URL.
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// Websocket transport failure.
    #[cfg(not(target_arch = "wasm32"))]
    #[error("websocket failed: {0}")]
    Socket(Box<tokio_tungstenite::tungstenite::Error>),

    /// The websocket closed before a message arrived.
    #[error("websocket closed")]
    SocketClosed,

    /// No websocket message arrived within the wait window.
    #[error("timed out waiting for websocket message")]
    Timeout,
}

#[cfg(not(target_arch = "wasm32"))]
impl From<tokio_tungstenite::tungstenite::Error> for ApiError {
    fn from(error: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::Socket(Box::new(error))
    }
}

impl ApiError {
    /// HTTP status code when the backend rejected the request.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Http(error) => error.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the failure was a client-side timeout.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Http(error) => error.is_timeout(),
            Self::Timeout => true,
            _ => false,
        }
    }
}

// =============================================================================
// STORAGE
// =============================================================================

/// Errors produced while writing through to persistent storage.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The backing file could not be written.
    #[error("storage io failed: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be serialized for storage.
    #[error("storage encode failed: {0}")]
    Encode(#[from] serde_json::Error),

    /// The browser refused the write (quota, privacy mode, no window).
    #[error("browser storage failed: {0}")]
    Browser(String),
}

// =============================================================================
// SESSION
// =============================================================================

/// Errors produced by composite session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
