//! SHA-256 verification of downloaded archives.
//!
//! Archives are streamed through the digest in fixed-size chunks, so memory
//! use does not depend on archive size.

use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};

use super::error::{ProvisionError, ProvisionResult};

const BUFFER_SIZE: usize = 64 * 1024;

/// Lowercase hex SHA-256 of the file at `path`.
pub fn calculate_file_checksum(path: &Path) -> ProvisionResult<String> {
    let mut file = File::open(path).map_err(|e| ProvisionError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; BUFFER_SIZE];

    loop {
        let bytes_read = file
            .read(&mut buffer)
            .map_err(|e| ProvisionError::ReadFailed {
                path: path.to_path_buf(),
                source: e,
            })?;

        if bytes_read == 0 {
            break;
        }

        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Compares the file digest against `expected`, ignoring hex case.
pub fn verify_checksum(path: &Path, expected: &str) -> ProvisionResult<()> {
    let actual = calculate_file_checksum(path)?;
    if !actual.eq_ignore_ascii_case(expected.trim()) {
        return Err(ProvisionError::ChecksumMismatch {
            filename: path
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string(),
            expected: expected.to_string(),
            actual,
        });
    }
    Ok(())
}

/// Verify a downloaded archive, deleting it if it does not match.
///
/// A corrupt archive must not survive for a later run to resume from or
/// accept.
pub fn verify_or_discard(path: &Path, expected: &str) -> ProvisionResult<()> {
    match verify_checksum(path, expected) {
        Ok(()) => Ok(()),
        Err(err) => {
            if path.exists() {
                fs::remove_file(path).map_err(|e| ProvisionError::RemoveFailed {
                    path: path.to_path_buf(),
                    source: e,
                })?;
                tracing::warn!(path = %path.display(), "Deleted archive that failed verification");
            }
            Err(err)
        }
    }
}
