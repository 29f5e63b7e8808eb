//! Seams between the orchestrator and its I/O stages.

use std::path::Path;

use super::error::ProvisionResult;
use super::extractor::ExtractProgress;
use super::fetch::DownloadState;

/// Downloads a resource archive to a local path.
pub trait ArchiveFetcher: Send + Sync {
    /// Download `url` into `dest`.
    ///
    /// When `resume` is true and `dest` already holds a partial download, the
    /// transfer continues from its end. `on_progress` is called inline once
    /// per received chunk.
    fn fetch(
        &self,
        url: &str,
        dest: &Path,
        resume: bool,
        on_progress: &mut dyn FnMut(&DownloadState),
    ) -> ProvisionResult<DownloadState>;
}

/// Unpacks an archive into a directory.
pub trait ArchiveExtractor: Send + Sync {
    /// Extract every entry of `archive_path` under `dest_dir`.
    ///
    /// `on_progress` is called once per completed entry. Returns the number
    /// of entries extracted.
    fn extract(
        &self,
        archive_path: &Path,
        dest_dir: &Path,
        on_progress: &mut dyn FnMut(&ExtractProgress),
    ) -> ProvisionResult<usize>;
}
