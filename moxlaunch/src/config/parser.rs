//! INI parsing logic for converting `Ini` → `LaunchConfig`.
//!
//! This is the single place where INI key names are mapped to struct fields.

use std::path::PathBuf;
use std::time::Duration;

use ini::{Ini, Properties};

use super::descriptor::{ResourceDescriptor, ResourceKind};
use super::file::ConfigFileError;
use super::settings::LaunchConfig;
use crate::provision::version::parse_version;
use crate::provision::ResumeNotFoundPolicy;

/// Section holding run-wide settings.
pub(super) const LAUNCH_SECTION: &str = "launch";

/// Section name for a resource descriptor.
pub(super) fn resource_section(kind: ResourceKind) -> String {
    format!("resource.{}", kind.key())
}

/// Parse an `Ini` object into a `LaunchConfig`.
///
/// Starts from `LaunchConfig::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<LaunchConfig, ConfigFileError> {
    let mut config = LaunchConfig::default();

    if let Some(section) = ini.section(Some(LAUNCH_SECTION)) {
        if let Some(v) = section.get("data_dir") {
            let v = v.trim();
            if !v.is_empty() {
                config.data_dir = PathBuf::from(v);
            }
        }
        if let Some(v) = section.get("timeout_secs") {
            let secs: u64 = v.trim().parse().ok().filter(|s| *s > 0).ok_or_else(|| {
                invalid(
                    LAUNCH_SECTION,
                    "timeout_secs",
                    v,
                    "must be a positive integer (seconds)",
                )
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(v) = section.get("resume") {
            config.resume_downloads = parse_bool(LAUNCH_SECTION, "resume", v)?;
        }
        if let Some(v) = section.get("resume_not_found") {
            config.resume_not_found = v.parse::<ResumeNotFoundPolicy>().map_err(|_| {
                invalid(
                    LAUNCH_SECTION,
                    "resume_not_found",
                    v,
                    "must be 'complete' or 'fail'",
                )
            })?;
        }
        if let Some(v) = section.get("keep_archives") {
            config.keep_archives = parse_bool(LAUNCH_SECTION, "keep_archives", v)?;
        }
    }

    for kind in ResourceKind::ALL {
        let name = resource_section(kind);
        let Some(section) = ini.section(Some(name.as_str())) else {
            continue;
        };
        let mut descriptor = config.resource(kind).clone();
        apply_resource(&name, section, &mut descriptor)?;
        config.set_resource(descriptor);
    }

    Ok(config)
}

fn apply_resource(
    section_name: &str,
    section: &Properties,
    descriptor: &mut ResourceDescriptor,
) -> Result<(), ConfigFileError> {
    if let Some(v) = section.get("name") {
        let v = v.trim();
        if v.is_empty() || v.contains(['/', '\\']) || v == "." || v == ".." {
            return Err(invalid(
                section_name,
                "name",
                v,
                "must be a plain directory name",
            ));
        }
        descriptor.name = v.to_string();
    }
    if let Some(v) = section.get("version") {
        let v = v.trim();
        parse_version(v).map_err(|e| {
            invalid(
                section_name,
                "version",
                v,
                &format!("not a semantic version: {}", e),
            )
        })?;
        descriptor.version = v.to_string();
    }
    if let Some(v) = section.get("download_url") {
        descriptor.download_url = v.trim().to_string();
    }
    if let Some(v) = section.get("sha256") {
        let v = v.trim();
        if v.is_empty() {
            descriptor.checksum = None;
        } else if v.len() == 64 && v.chars().all(|c| c.is_ascii_hexdigit()) {
            descriptor.checksum = Some(v.to_lowercase());
        } else {
            return Err(invalid(
                section_name,
                "sha256",
                v,
                "must be 64 hexadecimal characters",
            ));
        }
    }
    if let Some(v) = section.get("check_sha256") {
        descriptor.checksum_required = parse_bool(section_name, "check_sha256", v)?;
    }
    Ok(())
}

fn parse_bool(section: &str, key: &str, value: &str) -> Result<bool, ConfigFileError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(invalid(section, key, value, "must be true or false")),
    }
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Result<LaunchConfig, ConfigFileError> {
        parse_ini(&Ini::load_from_str(content).unwrap())
    }

    #[test]
    fn test_empty_ini_gives_defaults() {
        assert_eq!(parse("").unwrap(), LaunchConfig::default());
    }

    #[test]
    fn test_launch_section() {
        let config = parse(
            "[launch]\n\
             data_dir = /srv/moxlaunch\n\
             timeout_secs = 30\n\
             resume = no\n\
             resume_not_found = fail\n\
             keep_archives = yes\n",
        )
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/srv/moxlaunch"));
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(!config.resume_downloads);
        assert_eq!(config.resume_not_found, ResumeNotFoundPolicy::Fail);
        assert!(config.keep_archives);
    }

    #[test]
    fn test_resource_section_overlays_builtin() {
        let config = parse(
            "[resource.python_env]\n\
             version = v0.0.2\n\
             check_sha256 = true\n\
             sha256 = CC1BAC2AD3A353CD98E114DFFE430EA775E30651B7E91FF7F52E5866BBB8D5A6\n",
        )
        .unwrap();

        let env = config.resource(ResourceKind::PythonEnv);
        assert_eq!(env.version, "v0.0.2");
        assert_eq!(env.name, "python_env_win");
        assert!(env.checksum_required);
        assert_eq!(
            env.checksum.as_deref(),
            Some("cc1bac2ad3a353cd98e114dffe430ea775e30651b7e91ff7f52e5866bbb8d5a6")
        );
        assert_eq!(
            config.resource(ResourceKind::Git),
            LaunchConfig::default().resource(ResourceKind::Git)
        );
    }

    #[test]
    fn test_empty_sha256_clears_checksum() {
        let config = parse("[resource.git]\nsha256 =\n").unwrap();
        assert!(config.resource(ResourceKind::Git).checksum.is_none());
    }

    #[test]
    fn test_invalid_values() {
        let cases = [
            ("[launch]\ntimeout_secs = 0\n", "timeout_secs"),
            ("[launch]\nresume = maybe\n", "resume"),
            ("[launch]\nresume_not_found = retry\n", "resume_not_found"),
            ("[resource.git]\nversion = latest\n", "version"),
            ("[resource.git]\nsha256 = abc\n", "sha256"),
            ("[resource.agent]\nname = ../escape\n", "name"),
        ];

        for (content, expected_key) in cases {
            match parse(content) {
                Err(ConfigFileError::InvalidValue { key, .. }) => assert_eq!(key, expected_key),
                other => panic!("expected InvalidValue for {}, got {:?}", expected_key, other),
            }
        }
    }
}
