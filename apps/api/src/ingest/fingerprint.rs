use std::path::Path;

use sha2::{Digest, Sha256};

/// Hex SHA-256 of `bytes`. Used for change detection only.
pub fn fingerprint_bytes(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Fingerprint of the file's current content.
///
/// Returns an empty string when the file cannot be read. An empty fingerprint
/// never matches a ledger entry, so the file is retried on the next scan.
pub fn fingerprint_file(path: &Path) -> String {
    match std::fs::read(path) {
        Ok(bytes) => fingerprint_bytes(&bytes),
        Err(e) => {
            tracing::warn!("Could not fingerprint {}: {e}", path.display());
            String::new()
        }
    }
}
