//! Entity tags derived from file identity, size and modification time.

use sha2::{Digest, Sha256};
use std::path::Path;

/// Strong `ETag` (quoted) for a file version.
///
/// Hashes the path, byte length and modification second, so it changes
/// whenever the file is replaced or rewritten without reading its content.
pub fn etag_for(path: &Path, len: u64, modified_secs: i64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(path.to_string_lossy().as_bytes());
    hasher.update(len.to_be_bytes());
    hasher.update(modified_secs.to_be_bytes());
    let digest = hasher.finalize();
    format!("\"{}\"", hex::encode(&digest[..16]))
}
