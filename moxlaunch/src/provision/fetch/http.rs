//! HTTP-based archive fetcher with resume support.
//!
//! This module provides the core HTTP download functionality including:
//! - Resumable downloads via HTTP Range requests
//! - Totals that include the already-downloaded prefix
//! - Inline per-chunk progress callbacks

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, CONTENT_RANGE, RANGE};
use reqwest::StatusCode;

use super::state::DownloadState;
use super::ResumeNotFoundPolicy;
use crate::provision::error::{ProvisionError, ProvisionResult};
use crate::provision::traits::ArchiveFetcher;

/// Default timeout for HTTP requests in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300; // 5 minutes

/// Buffer size for reading/writing during downloads (64KB).
const BUFFER_SIZE: usize = 64 * 1024;

/// HTTP-based archive fetcher.
///
/// Implements [`ArchiveFetcher`] with support for:
/// - Range requests for resuming downloads
/// - A configurable interpretation of 404 on resumed requests
/// - Progress reporting per received chunk
#[derive(Debug)]
pub struct HttpFetcher {
    client: Client,
    pub(crate) timeout: Duration,
    resume_not_found: ResumeNotFoundPolicy,
}

impl HttpFetcher {
    /// Create a new fetcher with the default timeout.
    pub fn new() -> ProvisionResult<Self> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a new fetcher with a custom timeout.
    pub fn with_timeout(timeout: Duration) -> ProvisionResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProvisionError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            timeout,
            resume_not_found: ResumeNotFoundPolicy::default(),
        })
    }

    /// Set how a 404 on a resumed request is interpreted.
    pub fn with_resume_not_found(mut self, policy: ResumeNotFoundPolicy) -> Self {
        self.resume_not_found = policy;
        self
    }

    /// The active 404-on-resume policy.
    pub fn resume_not_found(&self) -> ResumeNotFoundPolicy {
        self.resume_not_found
    }

    /// Download `url` into `dest`, resuming from `existing_size` bytes.
    fn download(
        &self,
        url: &str,
        dest: &Path,
        existing_size: u64,
        on_progress: &mut dyn FnMut(&DownloadState),
    ) -> ProvisionResult<DownloadState> {
        let mut request = self.client.get(url);
        if existing_size > 0 {
            tracing::debug!(url, offset = existing_size, "Resuming download");
            request = request.header(RANGE, format!("bytes={}-", existing_size));
        }

        let response = request.send().map_err(|e| self.transport_error(url, e))?;
        let status = response.status();

        if status == StatusCode::RANGE_NOT_SATISFIABLE && existing_size > 0 {
            if content_range_total(response.headers()) == Some(existing_size) {
                tracing::info!(url, bytes = existing_size, "Archive already fully downloaded");
                let state = DownloadState::new(dest, existing_size, existing_size);
                on_progress(&state);
                return Ok(state);
            }
            tracing::warn!(
                url,
                bytes = existing_size,
                "Partial archive does not match the remote file, restarting"
            );
            return self.download(url, dest, 0, on_progress);
        }

        if status.as_u16() >= 400 {
            if status == StatusCode::NOT_FOUND
                && existing_size > 0
                && self.resume_not_found == ResumeNotFoundPolicy::Complete
            {
                tracing::warn!(
                    url,
                    bytes = existing_size,
                    "Resumed request returned 404, treating existing bytes as complete"
                );
                let state = DownloadState::new(dest, existing_size, existing_size);
                on_progress(&state);
                return Ok(state);
            }
            return Err(ProvisionError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let start_byte = if status == StatusCode::PARTIAL_CONTENT {
            let offset = content_range_start(response.headers()).unwrap_or(existing_size);
            if offset != existing_size {
                return Err(ProvisionError::DownloadFailed {
                    url: url.to_string(),
                    reason: format!(
                        "server resumed at byte {} but {} bytes are on disk",
                        offset, existing_size
                    ),
                });
            }
            offset
        } else {
            if existing_size > 0 {
                tracing::debug!(url, status = %status, "Server ignored range request, restarting");
            }
            0
        };

        let bytes_total = response
            .content_length()
            .map(|remaining| remaining + start_byte)
            .unwrap_or(0);

        let file = open_destination(dest, start_byte)?;
        let mut state = DownloadState::new(dest, start_byte, bytes_total);
        self.stream_to_file(url, response, file, &mut state, on_progress)?;

        Ok(state)
    }

    /// Stream the response body into the destination file.
    fn stream_to_file(
        &self,
        url: &str,
        mut response: Response,
        file: File,
        state: &mut DownloadState,
        on_progress: &mut dyn FnMut(&DownloadState),
    ) -> ProvisionResult<()> {
        let mut writer = BufWriter::new(file);
        let mut buffer = vec![0u8; BUFFER_SIZE];

        loop {
            let bytes_read =
                response
                    .read(&mut buffer)
                    .map_err(|e| ProvisionError::DownloadFailed {
                        url: url.to_string(),
                        reason: format!("Read error: {}", e),
                    })?;

            if bytes_read == 0 {
                break;
            }

            writer
                .write_all(&buffer[..bytes_read])
                .map_err(|e| ProvisionError::WriteFailed {
                    path: state.archive_path.clone(),
                    source: e,
                })?;

            state.record_chunk(bytes_read);
            on_progress(state);
        }

        writer.flush().map_err(|e| ProvisionError::WriteFailed {
            path: state.archive_path.clone(),
            source: e,
        })
    }

    fn transport_error(&self, url: &str, e: reqwest::Error) -> ProvisionError {
        if e.is_timeout() {
            ProvisionError::Timeout {
                url: url.to_string(),
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            ProvisionError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    }
}

impl ArchiveFetcher for HttpFetcher {
    fn fetch(
        &self,
        url: &str,
        dest: &Path,
        resume: bool,
        on_progress: &mut dyn FnMut(&DownloadState),
    ) -> ProvisionResult<DownloadState> {
        let existing_size = if resume {
            fs::metadata(dest).map(|m| m.len()).unwrap_or(0)
        } else {
            0
        };
        self.download(url, dest, existing_size, on_progress)
    }
}

/// Open the destination for appending (resume) or truncating (fresh start).
fn open_destination(dest: &Path, start_byte: u64) -> ProvisionResult<File> {
    if start_byte > 0 {
        return OpenOptions::new()
            .append(true)
            .open(dest)
            .map_err(|e| ProvisionError::WriteFailed {
                path: dest.to_path_buf(),
                source: e,
            });
    }

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| ProvisionError::CreateDirFailed {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    File::create(dest).map_err(|e| ProvisionError::WriteFailed {
        path: dest.to_path_buf(),
        source: e,
    })
}

/// First byte position of a `Content-Range: bytes <start>-<end>/<size>` header.
fn content_range_start(headers: &HeaderMap) -> Option<u64> {
    let value = headers.get(CONTENT_RANGE)?.to_str().ok()?;
    let range = value.trim().strip_prefix("bytes")?.trim_start();
    let (start, _) = range.split_once('-')?;
    start.trim().parse().ok()
}

/// Full size from a `Content-Range` header (`bytes */<size>` on a 416).
fn content_range_total(headers: &HeaderMap) -> Option<u64> {
    let value = headers.get(CONTENT_RANGE)?.to_str().ok()?;
    let (_, total) = value.trim().rsplit_once('/')?;
    total.trim().parse().ok()
}
