//! Transfer state for a single archive download.

use std::path::PathBuf;

/// Progress of one download.
///
/// Lives only for the duration of the download stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadState {
    /// Where the archive is being written.
    pub archive_path: PathBuf,
    /// Bytes on disk so far, including any resumed prefix.
    pub bytes_received: u64,
    /// Expected final size, or 0 if the server did not report one.
    pub bytes_total: u64,
}

impl DownloadState {
    /// Create a state for a download starting with `bytes_received` bytes.
    pub fn new(archive_path: impl Into<PathBuf>, bytes_received: u64, bytes_total: u64) -> Self {
        Self {
            archive_path: archive_path.into(),
            bytes_received,
            bytes_total,
        }
    }

    /// Whole-number completion percentage.
    ///
    /// Returns 0 while the total is unknown and never exceeds 100.
    pub fn percent(&self) -> u32 {
        if self.bytes_total == 0 {
            return 0;
        }
        let pct = (self.bytes_received as u128 * 100) / self.bytes_total as u128;
        pct.min(100) as u32
    }

    /// Record a received chunk.
    pub fn record_chunk(&mut self, bytes: usize) {
        self.bytes_received += bytes as u64;
    }
}
