//! Upload client.
//!
//! The client half of the protocol: read local files, post them in one
//! multipart request carrying the shared token, and return the per-file
//! outcomes in the same order as the input paths.
//!
//! Every path is checked locally before anything is sent, so an obviously
//! bad input fails fast instead of burning a network round trip. The
//! request is a single awaited call bounded by the configured timeout;
//! there is no retry.
//!
//! # Example
//!
//! ```ignore
//! use std::path::PathBuf;
//! use std::time::Duration;
//!
//! let outcomes = imgdrop::client::upload(
//!     "http://127.0.0.1:19190",
//!     "my-secret-token",
//!     &[PathBuf::from("cat.png")],
//!     Duration::from_secs(30),
//! )
//! .await?;
//!
//! for outcome in outcomes {
//!     match outcome.url {
//!         Some(url) => println!("{}", url),
//!         None => eprintln!("{}: {}", outcome.name, outcome.message.unwrap_or_default()),
//!     }
//! }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use tracing::debug;

use crate::error::ClientError;
use crate::protocol::{ErrorResponse, PartOutcome, UploadResponse};

/// Default client-side timeout in seconds.
pub const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 30;

/// Upload local files to the server and return per-file outcomes.
///
/// `api_url` is the server base URL (e.g. `http://127.0.0.1:19190`); the
/// `/upload` path is appended here. Whole-request failures (unreadable
/// local file, network, auth, malformed request) surface as `ClientError`;
/// per-part storage failures come back inside the outcome list.
pub async fn upload(
    api_url: &str,
    token: &str,
    paths: &[PathBuf],
    timeout: Duration,
) -> Result<Vec<PartOutcome>, ClientError> {
    for path in paths {
        check_readable(path)?;
    }

    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(ClientError::Network)?;

    let mut form = Form::new().text("token", token.to_string());
    for path in paths {
        let content = tokio::fs::read(path)
            .await
            .map_err(|source| ClientError::UnreadableFile {
                path: path.clone(),
                source,
            })?;
        form = form.part("file", Part::bytes(content).file_name(part_name(path)));
    }

    let endpoint = format!("{}/upload", api_url.trim_end_matches('/'));
    debug!(endpoint = %endpoint, files = paths.len(), "sending upload request");

    let response = client
        .post(&endpoint)
        .multipart(form)
        .send()
        .await
        .map_err(|err| map_send_error(err, timeout))?;

    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(ClientError::Unauthorized(error_message(response).await));
    }
    if !status.is_success() {
        return Err(ClientError::Rejected {
            status: status.as_u16(),
            message: error_message(response).await,
        });
    }

    let body: UploadResponse = response
        .json()
        .await
        .map_err(|err| ClientError::MalformedResponse(err.to_string()))?;

    // The server promises one outcome per part, in order
    if body.results.len() != paths.len() {
        return Err(ClientError::MalformedResponse(format!(
            "expected {} results, got {}",
            paths.len(),
            body.results.len()
        )));
    }

    Ok(body.results)
}

/// Fail fast on paths that cannot possibly upload.
fn check_readable(path: &Path) -> Result<(), ClientError> {
    let metadata = std::fs::metadata(path).map_err(|source| ClientError::UnreadableFile {
        path: path.to_path_buf(),
        source,
    })?;

    if !metadata.is_file() {
        return Err(ClientError::NotAFile {
            path: path.to_path_buf(),
        });
    }

    std::fs::File::open(path).map_err(|source| ClientError::UnreadableFile {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(())
}

/// Original filename sent to the server (basename of the local path).
fn part_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string())
}

fn map_send_error(err: reqwest::Error, timeout: Duration) -> ClientError {
    if err.is_timeout() {
        ClientError::Timeout(timeout)
    } else {
        ClientError::Network(err)
    }
}

/// Best-effort extraction of the server's error message body.
async fn error_message(response: reqwest::Response) -> String {
    match response.json::<ErrorResponse>().await {
        Ok(body) => body.message,
        Err(_) => "no error detail in response".to_string(),
    }
}
