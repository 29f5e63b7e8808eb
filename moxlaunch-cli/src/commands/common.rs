//! Common types and utilities shared across CLI commands.

use std::path::PathBuf;

use clap::Args;
use moxlaunch::config::{config_file_path, LaunchConfig};
use moxlaunch::logging::{default_log_dir, default_log_file, init_logging, LoggingGuard};

use crate::error::CliError;

/// Options accepted by every command.
#[derive(Debug, Clone, Default, Args)]
pub struct GlobalArgs {
    /// Config file to use instead of the default launch.ini
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the data directory from the config file
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Always download archives from the start
    #[arg(long, global = true)]
    pub no_resume: bool,

    /// Also print log output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl GlobalArgs {
    /// The config file this invocation reads.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(config_file_path)
    }
}

/// Load the config file and apply command-line overrides.
///
/// CLI arguments take precedence over config file values.
pub fn load_config(args: &GlobalArgs) -> Result<LaunchConfig, CliError> {
    let mut config = LaunchConfig::load_from(&args.config_path())?;
    if let Some(dir) = &args.data_dir {
        config.data_dir = dir.clone();
    }
    if args.no_resume {
        config.resume_downloads = false;
    }
    Ok(config)
}

/// Start file logging, mirroring to stderr when `--verbose` is given.
pub fn start_logging(args: &GlobalArgs) -> Result<LoggingGuard, CliError> {
    init_logging(&default_log_dir(), default_log_file(), args.verbose)
        .map_err(|e| CliError::LoggingInit(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_missing_config_gives_defaults_with_overrides() {
        let temp = TempDir::new().unwrap();
        let args = GlobalArgs {
            config: Some(temp.path().join("missing.ini")),
            data_dir: Some(temp.path().join("data")),
            no_resume: true,
            verbose: false,
        };

        let config = load_config(&args).unwrap();

        assert_eq!(config.data_dir, temp.path().join("data"));
        assert!(!config.resume_downloads);
    }

    #[test]
    fn test_cli_overrides_config_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("launch.ini");
        fs::write(&path, "[launch]\ndata_dir = /from/file\nkeep_archives = true\n").unwrap();

        let from_file = load_config(&GlobalArgs {
            config: Some(path.clone()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(from_file.data_dir, PathBuf::from("/from/file"));
        assert!(from_file.keep_archives);
        assert!(from_file.resume_downloads);

        let overridden = load_config(&GlobalArgs {
            config: Some(path),
            data_dir: Some(PathBuf::from("/from/cli")),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(overridden.data_dir, PathBuf::from("/from/cli"));
    }

    #[test]
    fn test_invalid_config_is_reported() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("launch.ini");
        fs::write(&path, "[launch]\ntimeout_secs = soon\n").unwrap();

        let result = load_config(&GlobalArgs {
            config: Some(path),
            ..Default::default()
        });

        assert!(matches!(result, Err(CliError::Config(_))));
    }
}
