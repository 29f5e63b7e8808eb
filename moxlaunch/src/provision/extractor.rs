//! Zip extraction into a staging directory.
//!
//! Entries are decompressed one at a time and streamed to disk. Each entry
//! name is resolved with `enclosed_name`, so an archive can never write
//! outside the destination directory.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use zip::ZipArchive;

use super::error::{ProvisionError, ProvisionResult};
use super::traits::ArchiveExtractor;

/// Entry-count progress of an extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractProgress {
    /// Entries fully written so far.
    pub extracted_count: usize,
    /// Entries in the archive.
    pub total_count: usize,
}

impl ExtractProgress {
    /// Whole-number completion percentage.
    pub fn percent(&self) -> u32 {
        extract_percent(self.extracted_count, self.total_count)
    }
}

/// `floor(extracted * 100 / total)`, or 100 for an empty archive.
pub fn extract_percent(extracted: usize, total: usize) -> u32 {
    if total == 0 {
        return 100;
    }
    let pct = (extracted as u128 * 100) / total as u128;
    pct.min(100) as u32
}

/// Zip archive extractor.
#[derive(Debug, Default)]
pub struct ZipExtractor;

impl ZipExtractor {
    /// Create a new zip extractor.
    pub fn new() -> Self {
        Self
    }

    fn extract_zip(
        &self,
        archive_path: &Path,
        dest_dir: &Path,
        on_progress: &mut dyn FnMut(&ExtractProgress),
    ) -> ProvisionResult<usize> {
        let file = File::open(archive_path).map_err(|e| ProvisionError::ReadFailed {
            path: archive_path.to_path_buf(),
            source: e,
        })?;
        let mut archive =
            ZipArchive::new(BufReader::new(file)).map_err(|e| ProvisionError::ExtractionFailed {
                path: archive_path.to_path_buf(),
                reason: e.to_string(),
            })?;

        fs::create_dir_all(dest_dir).map_err(|e| ProvisionError::CreateDirFailed {
            path: dest_dir.to_path_buf(),
            source: e,
        })?;

        let total_count = archive.len();
        tracing::debug!(
            archive = %archive_path.display(),
            entries = total_count,
            "Extracting archive"
        );

        for index in 0..total_count {
            let mut entry =
                archive
                    .by_index(index)
                    .map_err(|e| ProvisionError::ExtractionFailed {
                        path: archive_path.to_path_buf(),
                        reason: format!("entry {}: {}", index, e),
                    })?;

            let relative = entry
                .enclosed_name()
                .ok_or_else(|| ProvisionError::UnsafeEntry {
                    path: archive_path.to_path_buf(),
                    entry: entry.name().to_string(),
                })?;
            let outpath = dest_dir.join(relative);

            if entry.is_dir() || entry.name().ends_with('/') {
                fs::create_dir_all(&outpath).map_err(|e| ProvisionError::CreateDirFailed {
                    path: outpath.clone(),
                    source: e,
                })?;
            } else {
                if let Some(parent) = outpath.parent() {
                    fs::create_dir_all(parent).map_err(|e| ProvisionError::CreateDirFailed {
                        path: parent.to_path_buf(),
                        source: e,
                    })?;
                }

                let out = File::create(&outpath).map_err(|e| ProvisionError::WriteFailed {
                    path: outpath.clone(),
                    source: e,
                })?;
                let mut writer = BufWriter::new(out);
                io::copy(&mut entry, &mut writer).map_err(|e| {
                    ProvisionError::ExtractionFailed {
                        path: archive_path.to_path_buf(),
                        reason: format!("{}: {}", entry.name(), e),
                    }
                })?;
                writer.flush().map_err(|e| ProvisionError::WriteFailed {
                    path: outpath.clone(),
                    source: e,
                })?;

                #[cfg(unix)]
                if let Some(mode) = entry.unix_mode() {
                    use std::os::unix::fs::PermissionsExt;
                    fs::set_permissions(&outpath, fs::Permissions::from_mode(mode)).map_err(
                        |e| ProvisionError::WriteFailed {
                            path: outpath.clone(),
                            source: e,
                        },
                    )?;
                }
            }

            on_progress(&ExtractProgress {
                extracted_count: index + 1,
                total_count,
            });
        }

        Ok(total_count)
    }
}

impl ArchiveExtractor for ZipExtractor {
    fn extract(
        &self,
        archive_path: &Path,
        dest_dir: &Path,
        on_progress: &mut dyn FnMut(&ExtractProgress),
    ) -> ProvisionResult<usize> {
        self.extract_zip(archive_path, dest_dir, on_progress)
    }
}
