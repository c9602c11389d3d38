//! Shared-token authentication.
//!
//! Every upload request carries the shared secret as a `token` field in its
//! multipart body. Verification is a constant-time byte comparison so the
//! secret cannot be probed through response timing.
//!
//! # Example
//!
//! ```rust
//! use imgdrop::server::auth::TokenAuth;
//!
//! let auth = TokenAuth::new("my-secret-token");
//! assert!(auth.validate("my-secret-token"));
//! assert!(!auth.validate("guess"));
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use subtle::ConstantTimeEq;
use tracing::{debug, warn};

use crate::protocol::ErrorResponse;

// =============================================================================
// Token Validator
// =============================================================================

/// Validator for the configured shared secret.
#[derive(Clone)]
pub struct TokenAuth {
    secret: Vec<u8>,
}

impl TokenAuth {
    /// Create a validator holding the configured secret.
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
        }
    }

    /// Compare a presented token against the configured secret.
    ///
    /// Constant-time over the compared bytes; a length mismatch rejects
    /// without leaking position information.
    pub fn validate(&self, presented: &str) -> bool {
        presented.as_bytes().ct_eq(&self.secret).into()
    }
}

impl std::fmt::Debug for TokenAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never expose the secret through Debug output
        f.debug_struct("TokenAuth").finish_non_exhaustive()
    }
}

// =============================================================================
// Authentication Errors
// =============================================================================

/// Authentication failure for a whole request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The request carried no `token` field
    MissingToken,

    /// The presented token does not match the configured secret
    InvalidToken,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingToken => write!(f, "Missing token field"),
            AuthError::InvalidToken => write!(f, "Invalid token"),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (error_type, message) = match &self {
            AuthError::MissingToken => ("missing_token", self.to_string()),
            AuthError::InvalidToken => ("invalid_token", self.to_string()),
        };

        // A wrong token could indicate someone probing the secret, so log
        // at warn; a missing field is usually a misconfigured client
        match &self {
            AuthError::InvalidToken => {
                warn!(error_type = error_type, "Authentication failed: {}", message);
            }
            AuthError::MissingToken => {
                debug!(error_type = error_type, "Authentication failed: {}", message);
            }
        }

        let body = ErrorResponse::with_status(error_type, message, StatusCode::UNAUTHORIZED);
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

// =============================================================================
// Tests
// =============================================================================
