//! Filename derivation for stored uploads.
//!
//! All sanitization of client-supplied filenames lives here, in one pure
//! function, so the rules can be tested without the HTTP layer.
//!
//! # Naming scheme
//!
//! ```text
//! derived = hex(sha256(content))[..32] [ "." + sanitized_extension ]
//! ```
//!
//! The stem is a truncated content hash: 128 bits, so two distinct uploads
//! colliding is negligible, and identical bytes dedupe to a single name
//! (the stored content is identical, so the second write is a no-op
//! overwrite). The extension is taken from the client filename, lower-cased
//! and reduced to `[a-z0-9]`; everything else about the client name —
//! directory components, `..` segments, separators — is discarded.
//!
//! Derived names therefore match `[0-9a-f]{32}(\.[a-z0-9]+)?` and can never
//! escape the storage directory or require URL encoding.

use sha2::{Digest, Sha256};

/// Hex characters kept from the content hash (128 bits).
const STEM_LEN: usize = 32;

/// Longest extension carried over from the client filename.
const MAX_EXT_LEN: usize = 10;

/// Derive the storage filename for an uploaded file.
///
/// `original_name` is untrusted client input; only its extension survives,
/// sanitized. The stem is a truncated SHA-256 of `content`.
pub fn derive_name(original_name: &str, content: &[u8]) -> String {
    let digest = Sha256::digest(content);
    let stem = &hex::encode(digest)[..STEM_LEN];

    match sanitized_extension(original_name) {
        Some(ext) => format!("{}.{}", stem, ext),
        None => stem.to_string(),
    }
}

/// Extract a safe, lower-cased extension from a client filename.
///
/// Returns `None` when the name has no usable extension.
fn sanitized_extension(original_name: &str) -> Option<String> {
    // Strip directory components; clients on Windows send backslashes
    let base = original_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original_name);

    // rsplit_once keeps only the part after the last dot; a name like
    // "archive.tar.gz" keeps "gz", and ".hidden" yields "hidden" which is
    // harmless since the stem is ours anyway
    let (before, ext) = base.rsplit_once('.')?;
    if before.is_empty() && ext.is_empty() {
        return None;
    }

    let ext: String = ext
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(MAX_EXT_LEN)
        .collect();

    if ext.is_empty() {
        None
    } else {
        Some(ext)
    }
}
