//! Wire types for the upload protocol.
//!
//! These types are the request/response contract between the server and the
//! client, so they are serialized by one side and deserialized by the other.
//! Keep them boring: the client parses exactly what the server emits.
//!
//! # Upload response
//!
//! ```json
//! {
//!   "results": [
//!     { "name": "cat.png", "url": "http://127.0.0.1:19190/files/3f2a...9c.png" },
//!     { "name": "huge.bin", "error": "io_error", "message": "failed to write ..." }
//!   ]
//! }
//! ```
//!
//! One entry per file part, in the order the parts appeared in the request.
//! A part that failed to persist is reported in place, never dropped.

use serde::{Deserialize, Serialize};

/// Per-part upload result: a public URL on success, an error code and
/// message on failure. Exactly one of `url` and `error` is set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PartOutcome {
    /// Original filename as supplied by the client (untrusted, echo only)
    pub name: String,

    /// Public URL of the stored file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Error code for a failed part (e.g. "io_error")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Human-readable failure detail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl PartOutcome {
    /// Build a successful outcome.
    pub fn success(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: Some(url.into()),
            error: None,
            message: None,
        }
    }

    /// Build a failed outcome.
    pub fn failure(
        name: impl Into<String>,
        error: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            url: None,
            error: Some(error.into()),
            message: Some(message.into()),
        }
    }

    /// Whether this part was stored.
    pub fn is_success(&self) -> bool {
        self.url.is_some()
    }
}

/// Body of a successful `POST /upload` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    /// One outcome per file part, in request order
    pub results: Vec<PartOutcome>,
}

/// Body of a whole-request failure (authentication, malformed request).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error type identifier (e.g. "invalid_token", "empty_upload")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code, included for clients that lose the status line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ErrorResponse {
    /// Create a new error response.
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: None,
        }
    }

    /// Create a new error response carrying the HTTP status code.
    pub fn with_status(
        error: impl Into<String>,
        message: impl Into<String>,
        status: http::StatusCode,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: Some(status.as_u16()),
        }
    }
}

/// Body of the `GET /health` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status, always "healthy" when the server responds
    pub status: String,

    /// Crate version
    pub version: String,
}
