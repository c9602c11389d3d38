use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors raised while persisting an uploaded file to the storage directory.
///
/// These are per-part failures: the handler reports them in the part's slot
/// of the response and keeps processing sibling parts.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Could not create or write the temporary file
    #[error("failed to write {name}: {source}")]
    Write {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// Could not flush the written bytes to disk
    #[error("failed to sync {name}: {source}")]
    Sync {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// Could not rename the temporary file into its final place
    #[error("failed to finalize {name}: {source}")]
    Finalize {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised by the upload client.
///
/// Local file problems are caught before anything is sent; network and
/// server failures are terminal for the whole request. Per-part server
/// failures are not errors at this level — they come back as outcomes.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A local path does not exist or cannot be read
    #[error("cannot read {path}: {source}")]
    UnreadableFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A local path is not a regular file
    #[error("not a regular file: {path}")]
    NotAFile { path: PathBuf },

    /// The request did not complete within the configured timeout
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Connection could not be established or broke mid-request
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The server rejected the token
    #[error("authentication rejected: {0}")]
    Unauthorized(String),

    /// The server rejected the whole request (malformed, too large, ...)
    #[error("server rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The response body could not be parsed as the expected protocol
    #[error("malformed server response: {0}")]
    MalformedResponse(String),
}
