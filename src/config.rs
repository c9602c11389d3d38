//! Configuration management for imgdrop.
//!
//! This module provides a flexible configuration system that supports:
//! - Command-line arguments via clap
//! - Environment variables with `IMGDROP_` prefix
//! - Sensible defaults for all optional settings
//!
//! # Example
//!
//! ```ignore
//! use clap::Parser;
//! use imgdrop::config::{Cli, Command};
//!
//! let cli = Cli::parse();
//! match cli.command {
//!     Command::Serve(config) => { /* run the server */ }
//!     Command::Upload(config) => { /* run the client */ }
//! }
//! ```
//!
//! # Environment Variables
//!
//! - `IMGDROP_HOST` - Server bind address (default: 0.0.0.0)
//! - `IMGDROP_PORT` - Server port (default: 19190)
//! - `IMGDROP_TOKEN` - Shared upload token (required, both subcommands)
//! - `IMGDROP_STORAGE_DIR` - Directory uploads are stored in (required)
//! - `IMGDROP_URL_PREFIX` - Public URL prefix for stored files
//! - `IMGDROP_MAX_UPLOAD_SIZE` - Upload body cap in bytes (default: 32 MiB)
//! - `IMGDROP_REQUEST_TIMEOUT` - Server request timeout seconds (default: 30)
//! - `IMGDROP_CORS_ORIGINS` - Allowed CORS origins, comma-separated
//! - `IMGDROP_API_URL` - Server base URL for the upload client
//! - `IMGDROP_TIMEOUT` - Client request timeout seconds (default: 30)

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::client::DEFAULT_UPLOAD_TIMEOUT_SECS;
use crate::server::routes::{DEFAULT_MAX_UPLOAD_SIZE, DEFAULT_REQUEST_TIMEOUT_SECS};

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 19190;

/// Default server base URL for the upload client.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:19190";

// =============================================================================
// CLI Arguments
// =============================================================================

/// imgdrop - Push images to a server, get back public URLs.
#[derive(Parser, Debug)]
#[command(name = "imgdrop")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the upload server
    Serve(ServeConfig),

    /// Upload local files to a running server
    Upload(UploadConfig),
}

// =============================================================================
// Serve Configuration
// =============================================================================

/// Configuration for the `serve` subcommand.
#[derive(Args, Debug, Clone)]
pub struct ServeConfig {
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "IMGDROP_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "IMGDROP_PORT")]
    pub port: u16,

    /// Shared secret that upload requests must present.
    #[arg(long, env = "IMGDROP_TOKEN")]
    pub token: String,

    /// Directory uploaded files are stored in (created at startup).
    #[arg(long, env = "IMGDROP_STORAGE_DIR")]
    pub storage_dir: PathBuf,

    /// Public URL prefix for stored files.
    ///
    /// Returned URLs are `{prefix}/{derived_name}`. If not specified,
    /// defaults to `http://127.0.0.1:{port}/files`.
    #[arg(long, env = "IMGDROP_URL_PREFIX")]
    pub url_prefix: Option<String>,

    /// Maximum accepted upload body size in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_UPLOAD_SIZE, env = "IMGDROP_MAX_UPLOAD_SIZE")]
    pub max_upload_size: usize,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS, env = "IMGDROP_REQUEST_TIMEOUT")]
    pub request_timeout: u64,

    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "IMGDROP_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl ServeConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.token.is_empty() {
            return Err("Upload token is required. Set --token or IMGDROP_TOKEN".to_string());
        }

        if self.port == 0 {
            return Err("Port must be non-zero".to_string());
        }

        if self.storage_dir.as_os_str().is_empty() {
            return Err(
                "Storage directory is required. Set --storage-dir or IMGDROP_STORAGE_DIR"
                    .to_string(),
            );
        }

        if self.max_upload_size == 0 {
            return Err("max_upload_size must be greater than 0".to_string());
        }

        if self.request_timeout == 0 {
            return Err("request_timeout must be greater than 0".to_string());
        }

        if let Some(ref prefix) = self.url_prefix {
            url::Url::parse(prefix).map_err(|e| format!("Invalid url_prefix '{}': {}", prefix, e))?;
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The configured URL prefix, or the local default derived from the port.
    pub fn url_prefix_or_default(&self) -> String {
        match &self.url_prefix {
            Some(prefix) => prefix.trim_end_matches('/').to_string(),
            None => format!("http://127.0.0.1:{}/files", self.port),
        }
    }
}

// =============================================================================
// Upload Configuration
// =============================================================================

/// Configuration for the `upload` subcommand.
#[derive(Args, Debug, Clone)]
pub struct UploadConfig {
    /// Base URL of the upload server.
    #[arg(short = 'u', long, default_value = DEFAULT_API_URL, env = "IMGDROP_API_URL")]
    pub api_url: String,

    /// Shared secret for the server.
    #[arg(short, long, env = "IMGDROP_TOKEN")]
    pub token: String,

    /// Request timeout in seconds.
    #[arg(long, default_value_t = DEFAULT_UPLOAD_TIMEOUT_SECS, env = "IMGDROP_TIMEOUT")]
    pub timeout: u64,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Local files to upload.
    #[arg(required = true, num_args = 1..)]
    pub files: Vec<PathBuf>,
}

impl UploadConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.token.is_empty() {
            return Err("Upload token is required. Set --token or IMGDROP_TOKEN".to_string());
        }

        if self.files.is_empty() {
            return Err("At least one file to upload is required".to_string());
        }

        if self.timeout == 0 {
            return Err("timeout must be greater than 0".to_string());
        }

        let parsed = url::Url::parse(&self.api_url)
            .map_err(|e| format!("Invalid api_url '{}': {}", self.api_url, e))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(format!(
                "Invalid api_url '{}': scheme must be http or https",
                self.api_url
            ));
        }

        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
