//! moxlaunch - first-run provisioning for the mox desktop application.
//!
//! Before the application's window becomes interactive, a fixed set of large
//! portable dependencies (Git, a Python runtime environment and the agent)
//! must be present on disk at the versions the application was built against.
//! This crate provides the pipeline that brings them up to date:
//!
//! ```text
//! Provisioner (orchestrator)
//!     │   for each resource, in fixed order:
//!     ├── VersionStore   check installed version, skip if current
//!     ├── HttpFetcher    resumable download of the archive
//!     ├── checksum       optional SHA-256 verification
//!     ├── ZipExtractor   entry-by-entry extraction into staging
//!     ├── Installer      staging → live directory swap
//!     └── VersionStore   record the new version
//!
//!     every transition ──► EventSink (progress | failed | end)
//! ```
//!
//! The whole run is fail-fast: the first failing stage aborts the run, is
//! reported to the sink as a `failed` event and returned to the caller as a
//! [`provision::LaunchError`].

pub mod config;
pub mod logging;
pub mod provision;
