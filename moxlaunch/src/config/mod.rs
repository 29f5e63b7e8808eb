//! Configuration for a provisioning run.
//!
//! - [`ResourceDescriptor`] says what to install for each [`ResourceKind`]
//! - [`LaunchConfig`] holds run-wide settings and the descriptors
//! - `launch.ini` loading and saving is implemented on `LaunchConfig`
//!
//! # Example
//!
//! ```
//! use moxlaunch::config::{LaunchConfig, ResourceKind};
//! use std::time::Duration;
//!
//! let config = LaunchConfig::new("/tmp/moxlaunch")
//!     .with_timeout(Duration::from_secs(60))
//!     .with_keep_archives(true);
//!
//! assert_eq!(config.resource(ResourceKind::Git).name, "git_portable_win");
//! ```

mod descriptor;
mod file;
mod parser;
mod settings;
mod writer;

pub use descriptor::{ResourceDescriptor, ResourceKind};
pub use file::{config_directory, config_file_path, default_data_dir, ConfigFileError};
pub use settings::{LaunchConfig, DEFAULT_TIMEOUT_SECS};
