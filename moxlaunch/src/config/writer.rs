//! INI serialization logic for converting `LaunchConfig` → INI string.
//!
//! Produces the commented representation written to `launch.ini`.

use std::fmt::Write;
use std::path::Path;

use super::descriptor::ResourceKind;
use super::parser::{resource_section, LAUNCH_SECTION};
use super::settings::LaunchConfig;

/// Convert a `LaunchConfig` to a commented INI string for saving.
pub(super) fn to_config_string(config: &LaunchConfig) -> String {
    let mut out = format!(
        r#"[{section}]
; Root directory for installed resources, downloaded archives and
; version records (<name>.info.json)
data_dir = {data_dir}
; HTTP request timeout in seconds
timeout_secs = {timeout}
; Continue partially downloaded archives left by an interrupted run
resume = {resume}
; What a 404 answer to a resumed download means:
;   complete - the bytes already on disk are the whole archive (default)
;   fail     - abort like any other HTTP error
resume_not_found = {resume_not_found}
; Keep downloaded archives after they have been extracted
keep_archives = {keep_archives}
"#,
        section = LAUNCH_SECTION,
        data_dir = path_to_string(&config.data_dir),
        timeout = config.timeout.as_secs(),
        resume = config.resume_downloads,
        resume_not_found = config.resume_not_found,
        keep_archives = config.keep_archives,
    );

    for kind in ResourceKind::ALL {
        let resource = config.resource(kind);
        // Writing to a String cannot fail
        let _ = write!(
            out,
            r#"
[{section}]
; {label}: installed to <data_dir>/<name>
name = {name}
version = {version}
download_url = {url}
; SHA-256 of the archive, checked only when check_sha256 = true
sha256 = {sha256}
check_sha256 = {check}
"#,
            section = resource_section(kind),
            label = kind.label(),
            name = resource.name,
            version = resource.version,
            url = resource.download_url,
            sha256 = resource.checksum.as_deref().unwrap_or(""),
            check = resource.checksum_required,
        );
    }

    out
}

/// rust-ini treats backslashes as escapes, so paths are written with `/`.
fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_every_section() {
        let content = to_config_string(&LaunchConfig::new("/data"));

        assert!(content.contains("[launch]"));
        assert!(content.contains("data_dir = /data"));
        assert!(content.contains("resume_not_found = complete"));
        for kind in ResourceKind::ALL {
            assert!(content.contains(&format!("[resource.{}]", kind.key())));
        }
    }

    #[test]
    fn test_windows_paths_use_forward_slashes() {
        assert_eq!(
            path_to_string(Path::new(r"C:\Users\me\AppData")),
            "C:/Users/me/AppData"
        );
    }
}
