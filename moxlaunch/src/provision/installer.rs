//! Staging and live directory management.
//!
//! Every path the pipeline touches on disk is derived here from the data
//! directory:
//!
//! ```text
//! <data_dir>/
//! ├── <name>/                     live directory
//! ├── <name>.info.json            version record (see `version`)
//! ├── temp_<name>_<version>.zip   downloaded archive
//! ├── temp_<name>_<version>/      staging directory
//! └── temp_<name>_backup/         previous live directory during a swap
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::error::{ProvisionError, ProvisionResult};

/// Moves extracted resources into place.
#[derive(Debug, Clone)]
pub struct Installer {
    data_dir: PathBuf,
}

impl Installer {
    /// Create an installer rooted at `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Live directory the host application uses.
    pub fn live_dir(&self, name: &str) -> PathBuf {
        self.data_dir.join(name)
    }

    /// Directory an archive is extracted into before the swap.
    pub fn staging_dir(&self, name: &str, version: &str) -> PathBuf {
        self.data_dir.join(format!("temp_{}_{}", name, version))
    }

    /// Where the archive for `version` is downloaded.
    ///
    /// Stable across runs so an interrupted download can be resumed.
    pub fn archive_path(&self, name: &str, version: &str) -> PathBuf {
        self.data_dir.join(format!("temp_{}_{}.zip", name, version))
    }

    /// Where the previous live directory is parked during a swap.
    pub fn backup_dir(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("temp_{}_backup", name))
    }

    /// Force-remove any leftover staging directory and create an empty one.
    pub fn prepare_staging(&self, staging: &Path) -> ProvisionResult<()> {
        remove_dir_if_exists(staging)?;
        fs::create_dir_all(staging).map_err(|e| ProvisionError::CreateDirFailed {
            path: staging.to_path_buf(),
            source: e,
        })
    }

    /// Move `backup` back onto `live` when a swap stopped between its renames.
    ///
    /// Returns `true` if a directory was restored.
    pub fn restore_interrupted_swap(&self, live: &Path, backup: &Path) -> ProvisionResult<bool> {
        if live.exists() || !backup.is_dir() {
            return Ok(false);
        }
        fs::rename(backup, live).map_err(|e| ProvisionError::ReplaceFailed {
            staging: backup.to_path_buf(),
            live: live.to_path_buf(),
            source: e,
        })?;
        tracing::warn!(path = %live.display(), "Restored directory left by an interrupted swap");
        Ok(true)
    }

    /// Replace `live` with `staging`.
    ///
    /// The current live directory is moved to `backup`, then `staging` is
    /// renamed onto `live` in a single rename. If that rename fails the
    /// backup is moved back, so `live` is either the old tree or the new one.
    pub fn replace_live(&self, staging: &Path, live: &Path, backup: &Path) -> ProvisionResult<()> {
        self.restore_interrupted_swap(live, backup)?;
        remove_dir_if_exists(backup)?;

        if let Some(parent) = live.parent() {
            fs::create_dir_all(parent).map_err(|e| ProvisionError::CreateDirFailed {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let had_live = live.exists();
        if had_live {
            fs::rename(live, backup).map_err(|e| ProvisionError::ReplaceFailed {
                staging: live.to_path_buf(),
                live: backup.to_path_buf(),
                source: e,
            })?;
        }

        if let Err(e) = fs::rename(staging, live) {
            if had_live {
                if let Err(restore) = fs::rename(backup, live) {
                    tracing::error!(
                        backup = %backup.display(),
                        live = %live.display(),
                        error = %restore,
                        "Failed to restore previous directory"
                    );
                }
            }
            return Err(ProvisionError::ReplaceFailed {
                staging: staging.to_path_buf(),
                live: live.to_path_buf(),
                source: e,
            });
        }

        if had_live {
            if let Err(e) = fs::remove_dir_all(backup) {
                tracing::warn!(
                    path = %backup.display(),
                    error = %e,
                    "Could not remove previous directory, it will be cleared next time"
                );
            }
        }

        tracing::info!(path = %live.display(), "Installed");
        Ok(())
    }

    /// Delete a downloaded archive that is no longer needed.
    pub fn discard_archive(&self, archive: &Path) -> ProvisionResult<()> {
        match fs::remove_file(archive) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ProvisionError::RemoveFailed {
                path: archive.to_path_buf(),
                source: e,
            }),
        }
    }
}

fn remove_dir_if_exists(path: &Path) -> ProvisionResult<()> {
    if !path.exists() {
        return Ok(());
    }
    fs::remove_dir_all(path).map_err(|e| ProvisionError::RemoveFailed {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn installer(temp: &TempDir) -> Installer {
        Installer::new(temp.path())
    }

    #[test]
    fn test_path_layout() {
        let inst = Installer::new("/data");
        assert_eq!(inst.live_dir("git_portable_win"), Path::new("/data/git_portable_win"));
        assert_eq!(
            inst.staging_dir("git_portable_win", "v0.0.1"),
            Path::new("/data/temp_git_portable_win_v0.0.1")
        );
        assert_eq!(
            inst.archive_path("git_portable_win", "v0.0.1"),
            Path::new("/data/temp_git_portable_win_v0.0.1.zip")
        );
        assert_eq!(
            inst.backup_dir("git_portable_win"),
            Path::new("/data/temp_git_portable_win_backup")
        );
    }

    #[test]
    fn test_prepare_staging_clears_leftovers() {
        let temp = TempDir::new().unwrap();
        let inst = installer(&temp);
        let staging = inst.staging_dir("env", "v1.0.0");
        fs::create_dir_all(staging.join("partial")).unwrap();
        fs::write(staging.join("partial/file.txt"), "old").unwrap();

        inst.prepare_staging(&staging).unwrap();

        assert!(staging.is_dir());
        assert_eq!(fs::read_dir(&staging).unwrap().count(), 0);
    }

    #[test]
    fn test_replace_live_first_install() {
        let temp = TempDir::new().unwrap();
        let inst = installer(&temp);
        let staging = inst.staging_dir("env", "v1.0.0");
        fs::create_dir_all(&staging).unwrap();
        fs::write(staging.join("python.exe"), "new").unwrap();
        let live = inst.live_dir("env");

        inst.replace_live(&staging, &live, &inst.backup_dir("env"))
            .unwrap();

        assert_eq!(fs::read_to_string(live.join("python.exe")).unwrap(), "new");
        assert!(!staging.exists());
        assert!(!inst.backup_dir("env").exists());
    }

    #[test]
    fn test_replace_live_swaps_whole_tree() {
        let temp = TempDir::new().unwrap();
        let inst = installer(&temp);
        let live = inst.live_dir("env");
        fs::create_dir_all(&live).unwrap();
        fs::write(live.join("stale.txt"), "old").unwrap();

        let staging = inst.staging_dir("env", "v2.0.0");
        fs::create_dir_all(&staging).unwrap();
        fs::write(staging.join("fresh.txt"), "new").unwrap();

        inst.replace_live(&staging, &live, &inst.backup_dir("env"))
            .unwrap();

        assert!(live.join("fresh.txt").exists());
        assert!(!live.join("stale.txt").exists());
        assert!(!inst.backup_dir("env").exists());
    }

    #[test]
    fn test_replace_live_failure_keeps_previous_tree() {
        let temp = TempDir::new().unwrap();
        let inst = installer(&temp);
        let live = inst.live_dir("env");
        fs::create_dir_all(&live).unwrap();
        fs::write(live.join("keep.txt"), "old").unwrap();

        let missing_staging = inst.staging_dir("env", "v2.0.0");
        let result = inst.replace_live(&missing_staging, &live, &inst.backup_dir("env"));

        assert!(matches!(result, Err(ProvisionError::ReplaceFailed { .. })));
        assert_eq!(fs::read_to_string(live.join("keep.txt")).unwrap(), "old");
        assert!(!inst.backup_dir("env").exists());
    }

    #[test]
    fn test_replace_live_clears_stale_backup() {
        let temp = TempDir::new().unwrap();
        let inst = installer(&temp);
        let live = inst.live_dir("env");
        fs::create_dir_all(&live).unwrap();
        let backup = inst.backup_dir("env");
        fs::create_dir_all(&backup).unwrap();
        fs::write(backup.join("junk"), "x").unwrap();

        let staging = inst.staging_dir("env", "v1.0.0");
        fs::create_dir_all(&staging).unwrap();
        fs::write(staging.join("python.exe"), "new").unwrap();

        inst.replace_live(&staging, &live, &backup).unwrap();

        assert!(!backup.exists());
        assert!(live.join("python.exe").is_file());
        assert!(!live.join("junk").exists());
    }

    #[test]
    fn test_restore_interrupted_swap() {
        let temp = TempDir::new().unwrap();
        let inst = installer(&temp);
        let live = inst.live_dir("env");
        let backup = inst.backup_dir("env");
        fs::create_dir_all(&backup).unwrap();
        fs::write(backup.join("python.exe"), "old").unwrap();

        assert!(inst.restore_interrupted_swap(&live, &backup).unwrap());

        assert_eq!(fs::read_to_string(live.join("python.exe")).unwrap(), "old");
        assert!(!backup.exists());
        assert!(!inst.restore_interrupted_swap(&live, &backup).unwrap());
    }

    #[test]
    fn test_failed_swap_after_interruption_keeps_backup_contents() {
        let temp = TempDir::new().unwrap();
        let inst = installer(&temp);
        let live = inst.live_dir("env");
        let backup = inst.backup_dir("env");
        fs::create_dir_all(&backup).unwrap();
        fs::write(backup.join("python.exe"), "old").unwrap();

        let missing_staging = inst.staging_dir("env", "v2.0.0");
        let result = inst.replace_live(&missing_staging, &live, &backup);

        assert!(matches!(result, Err(ProvisionError::ReplaceFailed { .. })));
        assert_eq!(fs::read_to_string(live.join("python.exe")).unwrap(), "old");
    }

    #[test]
    fn test_discard_archive() {
        let temp = TempDir::new().unwrap();
        let inst = installer(&temp);
        let archive = inst.archive_path("env", "v1.0.0");
        fs::write(&archive, b"zip").unwrap();

        inst.discard_archive(&archive).unwrap();
        assert!(!archive.exists());

        // Already gone is fine
        inst.discard_archive(&archive).unwrap();
    }
}
