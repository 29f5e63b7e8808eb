//! Errors surfaced by `moxlaunch` subcommands, with recovery hints.

use std::fmt;
use std::io;
use std::process;

use moxlaunch::config::ConfigFileError;
use moxlaunch::provision::{LaunchError, ProvisionError, Stage};

#[derive(Debug)]
pub enum CliError {
    LoggingInit(String),
    Config(ConfigFileError),
    /// The HTTP client could not be built.
    Setup(ProvisionError),
    Spawn(io::Error),
    WorkerPanicked,
    /// A resource stage failed; carries the resource and stage.
    Provision(LaunchError),
}

impl CliError {
    /// Prints the error plus a hint where one helps, then exits with status 1.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Config(ConfigFileError::InvalidValue { .. }) => {
                eprintln!();
                eprintln!("Fix the value in the config file, or regenerate it with:");
                eprintln!("  moxlaunch init --force");
            }
            CliError::Provision(e) if e.stage == Stage::Download => {
                eprintln!();
                eprintln!("Check your network connection and run moxlaunch again.");
                eprintln!("Partially downloaded archives are resumed on the next run.");
            }
            CliError::Provision(e) if e.stage == Stage::VerifyChecksum => {
                eprintln!();
                eprintln!("The downloaded archive was deleted. Run moxlaunch again to re-download it.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::Setup(e) => write!(f, "Failed to set up provisioning: {}", e),
            CliError::Spawn(e) => write!(f, "Failed to start provisioning: {}", e),
            CliError::WorkerPanicked => write!(f, "Provisioning thread panicked"),
            CliError::Provision(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::Setup(e) => Some(e),
            CliError::Spawn(e) => Some(e),
            CliError::Provision(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e)
    }
}

impl From<LaunchError> for CliError {
    fn from(e: LaunchError) -> Self {
        CliError::Provision(e)
    }
}
