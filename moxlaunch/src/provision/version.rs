//! Per-resource version records and the version gate.
//!
//! Each resource has a `<name>.info.json` file in the data directory:
//!
//! ```json
//! { "version": "v0.0.1", "updateTime": 1718000000000 }
//! ```
//!
//! The file is written wholesale after a successful install and never
//! patched. A missing or unreadable record means "nothing installed".

use std::fs;
use std::path::{Path, PathBuf};

use semver::Version;
use serde::{Deserialize, Serialize};

use super::error::{ProvisionError, ProvisionResult, VersionError};

/// Version reported when no valid record exists.
pub const SENTINEL_VERSION: &str = "v0.0.0";

/// Persisted version metadata for one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    /// Installed version string, as configured (e.g. `v0.0.1`).
    pub version: String,
    /// Time of the last successful update, in epoch milliseconds.
    #[serde(rename = "updateTime")]
    pub updated_at: i64,
}

/// Reads and writes version records under a data directory.
#[derive(Debug, Clone)]
pub struct VersionStore {
    dir: PathBuf,
}

impl VersionStore {
    /// Create a store rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the record file for a resource.
    pub fn record_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.info.json", name))
    }

    /// Read the record for a resource.
    pub fn read(&self, name: &str) -> Result<VersionRecord, VersionError> {
        let path = self.record_path(name);
        let content = fs::read_to_string(&path).map_err(|e| VersionError::Read {
            path: path.clone(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(|e| VersionError::Parse {
            path,
            reason: e.to_string(),
        })
    }

    /// Installed version of a resource, or [`SENTINEL_VERSION`] if the record
    /// is missing or corrupt.
    pub fn installed_version(&self, name: &str) -> String {
        match self.read(name) {
            Ok(record) => {
                tracing::info!(resource = name, version = %record.version, "Installed version");
                record.version
            }
            Err(e) => {
                tracing::warn!(resource = name, error = %e, "No usable version record");
                SENTINEL_VERSION.to_string()
            }
        }
    }

    /// Record a successful update.
    ///
    /// `updateTime` never moves backwards relative to a previous valid
    /// record, even if the wall clock does.
    pub fn write(&self, name: &str, version: &str) -> ProvisionResult<VersionRecord> {
        let now = chrono::Utc::now().timestamp_millis();
        let updated_at = match self.read(name) {
            Ok(previous) => now.max(previous.updated_at),
            Err(_) => now,
        };
        let record = VersionRecord {
            version: version.to_string(),
            updated_at,
        };

        fs::create_dir_all(&self.dir).map_err(|e| ProvisionError::CreateDirFailed {
            path: self.dir.clone(),
            source: e,
        })?;

        let path = self.record_path(name);
        let content =
            serde_json::to_string_pretty(&record).map_err(|e| ProvisionError::RecordFailed {
                path: path.clone(),
                reason: e.to_string(),
            })?;
        write_replacing(&path, &content)?;

        Ok(record)
    }
}

/// Write `content` to a sibling temp file and rename it over `path`.
fn write_replacing(path: &Path, content: &str) -> ProvisionResult<()> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, content).map_err(|e| ProvisionError::WriteFailed {
        path: tmp.clone(),
        source: e,
    })?;
    fs::rename(&tmp, path).map_err(|e| ProvisionError::WriteFailed {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Parse a version string, accepting a leading `v` or `=`.
pub fn parse_version(s: &str) -> Result<Version, semver::Error> {
    let trimmed = s.trim();
    let trimmed = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('='))
        .unwrap_or(trimmed);
    Version::parse(trimmed)
}

/// Whether `required` is strictly newer than `installed`.
pub fn compare_versions(required: &str, installed: &str) -> Result<bool, VersionError> {
    let compare_err = |e: semver::Error| VersionError::Compare {
        required: required.to_string(),
        installed: installed.to_string(),
        reason: e.to_string(),
    };
    let required_v = parse_version(required).map_err(compare_err)?;
    let installed_v = parse_version(installed).map_err(compare_err)?;
    Ok(required_v > installed_v)
}

/// The version gate: update when `required > installed`, or when the two
/// cannot be compared.
pub fn needs_update(required: &str, installed: &str) -> bool {
    match compare_versions(required, installed) {
        Ok(newer) => newer,
        Err(e) => {
            tracing::warn!(error = %e, "Version comparison failed, assuming update needed");
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_record_yields_sentinel() {
        let temp = TempDir::new().unwrap();
        let store = VersionStore::new(temp.path());

        assert!(matches!(store.read("git"), Err(VersionError::Read { .. })));
        assert_eq!(store.installed_version("git"), SENTINEL_VERSION);
    }

    #[test]
    fn test_corrupt_record_yields_sentinel() {
        let temp = TempDir::new().unwrap();
        let store = VersionStore::new(temp.path());
        fs::write(store.record_path("git"), "{ not json").unwrap();

        assert!(matches!(store.read("git"), Err(VersionError::Parse { .. })));
        assert_eq!(store.installed_version("git"), SENTINEL_VERSION);
    }

    #[test]
    fn test_write_then_read() {
        let temp = TempDir::new().unwrap();
        let store = VersionStore::new(temp.path().join("nested"));

        let written = store.write("git", "v0.0.1").unwrap();
        let read = store.read("git").unwrap();

        assert_eq!(written, read);
        assert_eq!(store.installed_version("git"), "v0.0.1");
        assert!(!store.record_path("git").with_extension("json.tmp").exists());
    }

    #[test]
    fn test_record_uses_update_time_key() {
        let temp = TempDir::new().unwrap();
        let store = VersionStore::new(temp.path());
        store.write("python_env", "v1.2.3").unwrap();

        let raw = fs::read_to_string(store.record_path("python_env")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["version"], "v1.2.3");
        assert!(value["updateTime"].is_i64());
    }

    #[test]
    fn test_update_time_never_decreases() {
        let temp = TempDir::new().unwrap();
        let store = VersionStore::new(temp.path());

        // A record stamped in the future must not be overtaken by "now".
        let future = VersionRecord {
            version: "v0.0.1".to_string(),
            updated_at: i64::MAX / 2,
        };
        fs::write(
            store.record_path("git"),
            serde_json::to_string(&future).unwrap(),
        )
        .unwrap();

        let record = store.write("git", "v0.0.2").unwrap();
        assert_eq!(record.updated_at, future.updated_at);
    }

    #[test]
    fn test_parse_version_prefixes() {
        assert_eq!(parse_version("v0.0.1").unwrap(), Version::new(0, 0, 1));
        assert_eq!(parse_version("=1.2.3").unwrap(), Version::new(1, 2, 3));
        assert_eq!(parse_version(" 2.0.0 ").unwrap(), Version::new(2, 0, 0));
        assert!(parse_version("latest").is_err());
    }

    #[test]
    fn test_needs_update() {
        assert!(needs_update("v0.0.1", SENTINEL_VERSION));
        assert!(needs_update("v0.10.0", "v0.9.9"));
        assert!(!needs_update("v0.0.1", "v0.0.1"));
        assert!(!needs_update("v0.0.1", "v0.0.2"));
        assert!(!needs_update(SENTINEL_VERSION, SENTINEL_VERSION));
    }

    #[test]
    fn test_malformed_version_means_update() {
        assert!(needs_update("v0.0.1", "garbage"));
        assert!(needs_update("not-a-version", "v0.0.1"));
        assert!(matches!(
            compare_versions("v0.0.1", "garbage"),
            Err(VersionError::Compare { .. })
        ));
    }
}
