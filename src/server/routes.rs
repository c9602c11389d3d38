//! Router configuration for the upload server.
//!
//! # Route Structure
//!
//! ```text
//! POST /upload         - Upload one or more files (token in multipart body)
//! GET  /files/{name}   - Fetch a stored file (public)
//! GET  /health         - Health check (public)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use imgdrop::server::routes::{create_router, RouterConfig};
//!
//! let config = RouterConfig::new("my-secret-token", "http://127.0.0.1:19190/files");
//! let router = create_router("/var/lib/imgdrop", config);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:19190").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::path::PathBuf;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::auth::TokenAuth;
use super::handlers::{file_handler, health_handler, upload_handler, AppState};

/// Default cap on the whole multipart request body (32 MiB).
pub const DEFAULT_MAX_UPLOAD_SIZE: usize = 32 * 1024 * 1024;

/// Default per-request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Clone)]
pub struct RouterConfig {
    /// Shared secret uploads must present
    pub token: String,

    /// Prefix for public file URLs
    pub url_prefix: String,

    /// Maximum accepted request body size in bytes
    pub max_upload_size: usize,

    /// Per-request deadline
    pub request_timeout: Duration,

    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl RouterConfig {
    /// Create a new router configuration with the given token and URL prefix.
    ///
    /// By default:
    /// - Request bodies are capped at 32 MiB
    /// - Requests time out after 30 seconds
    /// - CORS allows any origin
    /// - Tracing is enabled
    pub fn new(token: impl Into<String>, url_prefix: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            url_prefix: url_prefix.into(),
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            cors_origins: None,
            enable_tracing: true,
        }
    }

    /// Set the maximum accepted request body size in bytes.
    pub fn with_max_upload_size(mut self, bytes: usize) -> Self {
        self.max_upload_size = bytes;
        self
    }

    /// Set the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set specific allowed CORS origins.
    ///
    /// Pass None (or don't call this method) to allow any origin.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the application router.
///
/// `storage_dir` must exist and be writable; the caller creates it at
/// startup, not per request.
pub fn create_router(storage_dir: impl Into<PathBuf>, config: RouterConfig) -> Router {
    let state = AppState::new(
        TokenAuth::new(&config.token),
        storage_dir,
        &config.url_prefix,
    );

    let cors = build_cors_layer(&config);

    let router = Router::new()
        .route("/upload", post(upload_handler))
        .route("/files/{name}", get(file_handler))
        .route("/health", get(health_handler))
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.max_upload_size))
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(cors);

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .max_age(Duration::from_secs(86400));

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        Some(origins) => {
            let parsed_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
