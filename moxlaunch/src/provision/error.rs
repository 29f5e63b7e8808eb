//! Error types for the provisioning pipeline.
//!
//! Three layers:
//! - [`VersionError`]: reading or comparing installed versions. Always
//!   recovered by the version gate ("update needed"), never returned by a run.
//! - [`ProvisionError`]: a single stage failed (transfer, checksum, extract,
//!   install).
//! - [`LaunchError`]: a run aborted; wraps the stage error with the resource
//!   and stage it happened in.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use super::steps::Stage;

/// Result type for stage operations.
pub type ProvisionResult<T> = Result<T, ProvisionError>;

/// Errors produced while reading or comparing a resource version.
#[derive(Debug, Error)]
pub enum VersionError {
    /// The version record could not be read.
    #[error("failed to read version record {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    /// The version record exists but is not valid JSON for a record.
    #[error("failed to parse version record {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    /// One of the two versions is not a valid semantic version.
    #[error("cannot compare versions {required} and {installed}: {reason}")]
    Compare {
        required: String,
        installed: String,
        reason: String,
    },
}

/// Errors that abort a stage of the pipeline.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// Failed to read a file or directory.
    #[error("failed to read {}: {source}", path.display())]
    ReadFailed { path: PathBuf, source: io::Error },

    /// Failed to write a file.
    #[error("failed to write {}: {source}", path.display())]
    WriteFailed { path: PathBuf, source: io::Error },

    /// Failed to create a directory.
    #[error("failed to create directory {}: {source}", path.display())]
    CreateDirFailed { path: PathBuf, source: io::Error },

    /// Failed to remove a file or directory.
    #[error("failed to remove {}: {source}", path.display())]
    RemoveFailed { path: PathBuf, source: io::Error },

    /// The HTTP client could not be constructed.
    #[error("failed to create HTTP client: {0}")]
    HttpClient(String),

    /// Transport-level failure while downloading.
    #[error("failed to download {url}: {reason}")]
    DownloadFailed { url: String, reason: String },

    /// The server answered with an error status.
    #[error("download of {url} failed with HTTP status {status}")]
    HttpStatus { url: String, status: u16 },

    /// Network timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout { url: String, timeout_secs: u64 },

    /// Checksum verification failed. The archive has been deleted.
    #[error("checksum mismatch for {filename}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        filename: String,
        expected: String,
        actual: String,
    },

    /// Verification is required but no checksum is configured.
    #[error("checksum verification is required for {resource} but no checksum is configured")]
    ChecksumMissing { resource: String },

    /// Archive extraction failed.
    #[error("failed to extract {}: {reason}", path.display())]
    ExtractionFailed { path: PathBuf, reason: String },

    /// An archive entry would be written outside the destination directory.
    #[error("archive {} contains unsafe entry path '{entry}'", path.display())]
    UnsafeEntry { path: PathBuf, entry: String },

    /// The staging directory could not be swapped into the live location.
    #[error("failed to move {} to {}: {source}", staging.display(), live.display())]
    ReplaceFailed {
        staging: PathBuf,
        live: PathBuf,
        source: io::Error,
    },

    /// The version record could not be serialized.
    #[error("failed to record version in {}: {reason}", path.display())]
    RecordFailed { path: PathBuf, reason: String },
}

/// A provisioning run aborted in a specific resource and stage.
#[derive(Debug, Error)]
#[error("{stage} failed for {resource}: {source}")]
pub struct LaunchError {
    /// Label of the resource being provisioned.
    pub resource: String,
    /// Stage that failed.
    pub stage: Stage,
    /// Underlying cause.
    #[source]
    pub source: ProvisionError,
}

impl LaunchError {
    /// Attach resource and stage context to a stage error.
    pub fn new(resource: impl Into<String>, stage: Stage, source: ProvisionError) -> Self {
        Self {
            resource: resource.into(),
            stage,
            source,
        }
    }
}
