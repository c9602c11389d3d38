//! # imgdrop
//!
//! A token-gated image upload service: push local files to a server over
//! HTTP, get back public URLs for the stored copies.
//!
//! The system has two halves sharing one protocol:
//!
//! - **Server** (`imgdrop serve`): validates the shared token, persists
//!   uploaded bytes under content-hash names in a flat storage directory,
//!   and answers with one URL per stored file.
//! - **Client** (`imgdrop upload`): reads local files, posts them in a
//!   single multipart request, and prints the resulting URLs.
//!
//! ## Design
//!
//! - **Shared-token auth**: one static secret, compared in constant time,
//!   checked before any file is touched.
//! - **Content-hash naming**: stored names are a truncated SHA-256 of the
//!   bytes plus a sanitized extension, so names never collide, never leak
//!   client paths, and never escape the storage directory.
//! - **Atomic writes**: temp-file-then-rename, so readers never observe a
//!   partial file.
//! - **Per-part failure isolation**: one failed write becomes a per-part
//!   error in the response; sibling parts still succeed.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`storage`] - Filename derivation and atomic file persistence
//! - [`server`] - Axum-based HTTP server, token auth, and routes
//! - [`client`] - Multipart upload client
//! - [`protocol`] - Wire types shared by both halves
//! - [`config`] - CLI and configuration types
//! - [`error`] - Storage and client error types

pub mod client;
pub mod config;
pub mod error;
pub mod protocol;
pub mod server;
pub mod storage;

// Re-export commonly used types
pub use client::{upload, DEFAULT_UPLOAD_TIMEOUT_SECS};
pub use config::{Cli, Command, ServeConfig, UploadConfig};
pub use error::{ClientError, StorageError};
pub use protocol::{ErrorResponse, HealthResponse, PartOutcome, UploadResponse};
pub use server::{
    create_router, AppState, AuthError, RouterConfig, TokenAuth, DEFAULT_MAX_UPLOAD_SIZE,
    DEFAULT_REQUEST_TIMEOUT_SECS,
};
pub use storage::{derive_name, store, StoredFile};
