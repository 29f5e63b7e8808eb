//! CLI command implementations.

pub mod common;
pub mod init;
pub mod run;
pub mod status;
