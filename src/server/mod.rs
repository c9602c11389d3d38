//! HTTP server layer for imgdrop.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                           │
//! │        POST /upload          GET /files/{name}               │
//! │                                                              │
//! │  ┌─────────────┐  ┌──────────────┐  ┌─────────────────────┐  │
//! │  │  handlers   │  │     auth     │  │       routes        │  │
//! │  │ (requests)  │  │ (shared token)│ │  (router config)    │  │
//! │  └─────────────┘  └──────────────┘  └─────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod handlers;
pub mod routes;

pub use auth::{AuthError, TokenAuth};
pub use handlers::{file_handler, health_handler, upload_handler, AppState};
pub use routes::{
    create_router, RouterConfig, DEFAULT_MAX_UPLOAD_SIZE, DEFAULT_REQUEST_TIMEOUT_SECS,
};
