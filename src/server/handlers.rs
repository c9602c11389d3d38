//! HTTP request handlers for the upload API.
//!
//! # Endpoints
//!
//! - `POST /upload` - Store uploaded files, return one URL per part
//! - `GET /files/{name}` - Fetch a stored file's bytes
//! - `GET /health` - Health check endpoint
//!
//! # Upload request lifecycle
//!
//! The handler buffers every multipart field first, so the token is checked
//! before any storage happens regardless of field order on the wire:
//!
//! ```text
//! Received -> fields collected -> Authenticated -> part 1..N persisted -> Completed
//!                |                    |
//!                +-> 400 (malformed)  +-> 401 (Rejected, nothing written)
//! ```
//!
//! Storage failures are isolated per part: one failed write becomes an
//! `io_error` outcome in that part's slot while siblings still succeed.

use std::path::PathBuf;

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use tracing::{debug, error, info};

use crate::protocol::{ErrorResponse, HealthResponse, PartOutcome, UploadResponse};
use crate::server::auth::{AuthError, TokenAuth};
use crate::storage;

/// Multipart field name carrying the shared token.
const TOKEN_FIELD: &str = "token";

// =============================================================================
// Application State
// =============================================================================

/// Shared application state, passed to handlers via Axum's State extractor.
#[derive(Clone)]
pub struct AppState {
    /// Token validator holding the configured secret
    pub auth: TokenAuth,

    /// Directory uploads are persisted into (created at startup)
    pub storage_dir: PathBuf,

    /// Prefix prepended to derived names to build public URLs
    pub url_prefix: String,
}

impl AppState {
    /// Create the application state.
    ///
    /// A trailing slash on `url_prefix` is dropped so URL construction is
    /// always `prefix + "/" + name`.
    pub fn new(
        auth: TokenAuth,
        storage_dir: impl Into<PathBuf>,
        url_prefix: impl Into<String>,
    ) -> Self {
        let url_prefix = url_prefix.into();
        Self {
            auth,
            storage_dir: storage_dir.into(),
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
        }
    }

    /// Public URL for a derived filename.
    pub fn url_for(&self, name: &str) -> String {
        format!("{}/{}", self.url_prefix, name)
    }
}

// =============================================================================
// Upload Handler
// =============================================================================

/// One collected file part: client-supplied name plus raw bytes.
struct FilePart {
    name: String,
    content: Bytes,
}

/// Handle `POST /upload`.
pub async fn upload_handler(State(state): State<AppState>, multipart: Multipart) -> Response {
    let (token, parts) = match collect_fields(multipart).await {
        Ok(collected) => collected,
        Err(response) => return response,
    };

    // Authentication gate: nothing is written before this point
    let token = match token {
        Some(token) => token,
        None => return AuthError::MissingToken.into_response(),
    };
    if !state.auth.validate(&token) {
        return AuthError::InvalidToken.into_response();
    }

    if parts.is_empty() {
        return validation_error("empty_upload", "request contains no file parts");
    }

    let mut results = Vec::with_capacity(parts.len());
    for part in parts {
        results.push(persist_part(&state, part).await);
    }

    (StatusCode::OK, Json(UploadResponse { results })).into_response()
}

/// Name and persist one part, turning a storage failure into a per-part
/// outcome rather than a request failure.
async fn persist_part(state: &AppState, part: FilePart) -> PartOutcome {
    let derived = storage::derive_name(&part.name, &part.content);

    match storage::store(&state.storage_dir, &derived, &part.content).await {
        Ok(stored) => {
            info!(
                original = %part.name,
                stored = %stored.name,
                len = stored.len,
                "file stored"
            );
            PartOutcome::success(part.name, state.url_for(&stored.name))
        }
        Err(err) => {
            error!(original = %part.name, error = %err, "failed to store file");
            PartOutcome::failure(part.name, "io_error", err.to_string())
        }
    }
}

/// Drain the multipart body into the token and the ordered file parts.
///
/// Any unreadable field, or a file part without a filename, rejects the
/// whole request before storage is attempted.
async fn collect_fields(
    mut multipart: Multipart,
) -> Result<(Option<String>, Vec<FilePart>), Response> {
    let mut token: Option<String> = None;
    let mut parts = Vec::new();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => {
                return Err(validation_error(
                    "malformed_multipart",
                    format!("could not read multipart body: {}", err),
                ));
            }
        };

        if field.name() == Some(TOKEN_FIELD) {
            let value = field.text().await.map_err(|err| {
                validation_error(
                    "malformed_multipart",
                    format!("could not read token field: {}", err),
                )
            })?;
            token = Some(value);
            continue;
        }

        let file_name = match field.file_name() {
            Some(name) if !name.is_empty() => name.to_owned(),
            _ => {
                return Err(validation_error(
                    "missing_filename",
                    format!("file part {} has no filename", parts.len() + 1),
                ));
            }
        };

        let content = field.bytes().await.map_err(|err| {
            validation_error(
                "unreadable_part",
                format!("could not read part {}: {}", file_name, err),
            )
        })?;

        parts.push(FilePart {
            name: file_name,
            content,
        });
    }

    Ok((token, parts))
}

fn validation_error(error_type: &str, message: impl Into<String>) -> Response {
    let message = message.into();
    debug!(error_type = error_type, "rejecting request: {}", message);
    let body = ErrorResponse::with_status(error_type, message, StatusCode::BAD_REQUEST);
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

// =============================================================================
// File Fetch Handler
// =============================================================================

/// Handle `GET /files/{name}`.
///
/// Serves the bytes of a stored file. Anything that is not a plain derived
/// name is treated as not found rather than resolved against the filesystem.
pub async fn file_handler(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    if !is_safe_name(&name) {
        return not_found(&name);
    }

    match tokio::fs::read(state.storage_dir.join(&name)).await {
        Ok(bytes) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, content_type_for(&name))],
            bytes,
        )
            .into_response(),
        Err(err) => {
            debug!(name = %name, error = %err, "file fetch miss");
            not_found(&name)
        }
    }
}

/// A name is servable only if it cannot address anything outside the
/// storage directory.
fn is_safe_name(name: &str) -> bool {
    !name.is_empty() && !name.contains('/') && !name.contains('\\') && !name.contains("..")
}

/// Content type for a derived filename, from its extension.
fn content_type_for(name: &str) -> &'static str {
    match name.rsplit('.').next() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("bmp") => "image/bmp",
        _ => "application/octet-stream",
    }
}

fn not_found(name: &str) -> Response {
    let body = ErrorResponse::with_status(
        "not_found",
        format!("no stored file named {}", name),
        StatusCode::NOT_FOUND,
    );
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}

// =============================================================================
// Health Handler
// =============================================================================

/// Handle `GET /health`.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// =============================================================================
// Tests
// =============================================================================
