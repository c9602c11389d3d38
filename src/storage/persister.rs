//! File persistence for uploaded bytes.
//!
//! Writes go to a temporary name inside the storage directory and are
//! renamed into place, so a concurrent reader of the final path never
//! observes a partially-written file. The rename also makes re-uploads of
//! identical content (which derive the same name) an idempotent overwrite.
//!
//! The storage directory itself is created once at startup by the caller,
//! not per request.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::StorageError;

/// Monotonic suffix so simultaneous writes (even of identical content)
/// never share a temporary path.
static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A successfully persisted upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Derived filename under the storage directory
    pub name: String,

    /// Absolute (or caller-relative) path of the stored file
    pub path: PathBuf,

    /// Number of bytes written
    pub len: u64,
}

/// Write `content` to `dir/name` atomically.
///
/// `name` must be a derived name from the namer; this function joins it
/// directly under `dir`.
pub async fn store(dir: &Path, name: &str, content: &[u8]) -> Result<StoredFile, StorageError> {
    let final_path = dir.join(name);
    let temp_path = dir.join(format!(
        ".{}.{}.{}.tmp",
        name,
        std::process::id(),
        TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));

    let result = write_and_rename(&temp_path, &final_path, name, content).await;

    if result.is_err() {
        // The temp file may or may not exist at this point; removal failure
        // is not worth surfacing over the original error
        let _ = fs::remove_file(&temp_path).await;
    }

    result.map(|len| {
        debug!(name = name, len = len, "stored file");
        StoredFile {
            name: name.to_string(),
            path: final_path,
            len,
        }
    })
}

async fn write_and_rename(
    temp_path: &Path,
    final_path: &Path,
    name: &str,
    content: &[u8],
) -> Result<u64, StorageError> {
    let mut file = fs::File::create(temp_path)
        .await
        .map_err(|source| StorageError::Write {
            name: name.to_string(),
            source,
        })?;

    file.write_all(content)
        .await
        .map_err(|source| StorageError::Write {
            name: name.to_string(),
            source,
        })?;

    file.sync_all()
        .await
        .map_err(|source| StorageError::Sync {
            name: name.to_string(),
            source,
        })?;

    drop(file);

    fs::rename(temp_path, final_path)
        .await
        .map_err(|source| StorageError::Finalize {
            name: name.to_string(),
            source,
        })?;

    Ok(content.len() as u64)
}
