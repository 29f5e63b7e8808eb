//! Configuration file handling for `<config dir>/moxlaunch/launch.ini`.
//!
//! Parsing lives in [`super::parser`] and serialization in [`super::writer`].

use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;

use super::settings::LaunchConfig;

/// Errors raised while reading or writing `launch.ini`.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("cannot parse launch.ini: {0}")]
    ReadError(#[from] ini::Error),

    #[error("cannot write launch.ini: {0}")]
    WriteError(String),

    /// A key is present but its value is unusable.
    #[error("[{section}] {key} = '{value}': {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    #[error("cannot create the configuration directory: {0}")]
    DirectoryError(std::io::Error),
}

impl LaunchConfig {
    /// Reads [`config_file_path`], or returns defaults when it is absent.
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    /// Reads the INI file at `path`. A missing file yields the shipped defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let ini = Ini::load_from_file(path)?;
        super::parser::parse_ini(&ini)
    }

    /// Writes this config as commented INI, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(ConfigFileError::DirectoryError)?;
        }
        std::fs::write(path, super::writer::to_config_string(self))
            .map_err(|e| ConfigFileError::WriteError(e.to_string()))
    }

    /// Writes this config to `path` unless a file is already there.
    /// Returns `true` when a new file was written.
    pub fn ensure_exists_at(&self, path: &Path) -> Result<bool, ConfigFileError> {
        if path.exists() {
            return Ok(false);
        }
        self.save_to(path)?;
        Ok(true)
    }
}

/// `<config dir>/moxlaunch`, relative to the working directory when the
/// platform has no config dir.
pub fn config_directory() -> PathBuf {
    dirs::config_dir().unwrap_or_default().join("moxlaunch")
}

pub fn config_file_path() -> PathBuf {
    config_directory().join("launch.ini")
}

/// Root for installed resources (`<local data dir>/moxlaunch`).
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir().unwrap_or_default().join("moxlaunch")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ResourceDescriptor, ResourceKind};
    use crate::provision::ResumeNotFoundPolicy;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_default_paths() {
        assert!(config_file_path().ends_with("moxlaunch/launch.ini"));
        assert!(default_data_dir().ends_with("moxlaunch"));
    }

    #[test]
    fn test_load_nonexistent_returns_defaults() {
        let temp = TempDir::new().unwrap();
        let config = LaunchConfig::load_from(&temp.path().join("nonexistent.ini")).unwrap();
        assert_eq!(config, LaunchConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("conf/launch.ini");
        let config = LaunchConfig::new(temp.path().join("data"))
            .with_timeout(Duration::from_secs(42))
            .with_resume_not_found(ResumeNotFoundPolicy::Fail)
            .with_keep_archives(true)
            .with_resource(
                ResourceDescriptor::new(
                    ResourceKind::Agent,
                    "agent_win",
                    "v2.0.0",
                    "https://example.com/agent.zip?rev=1&x=y",
                )
                .with_checksum("ab".repeat(32))
                .with_checksum_required(true),
            );

        config.save_to(&path).unwrap();
        let loaded = LaunchConfig::load_from(&path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_ensure_exists_at_does_not_overwrite() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("launch.ini");

        let config = LaunchConfig::default();
        assert!(config.ensure_exists_at(&path).unwrap());
        std::fs::write(&path, "[launch]\nkeep_archives = true\n").unwrap();
        assert!(!config.ensure_exists_at(&path).unwrap());

        assert!(LaunchConfig::load_from(&path).unwrap().keep_archives);
    }
}
