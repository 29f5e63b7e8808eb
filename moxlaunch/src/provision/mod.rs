//! The provisioning pipeline.
//!
//! Brings the portable git distribution, the Python environment and the agent
//! up to their required versions before the host application starts.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                       Provisioner                        │
//! │  for each resource: version gate → stages → record       │
//! └───┬────────────┬────────────┬────────────┬──────────┬────┘
//!     │            │            │            │          │
//!     ▼            ▼            ▼            ▼          ▼
//! ┌────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌───────┐
//! │Version │ │ Fetcher  │ │ Checksum │ │Extractor │ │Install│
//! │ Store  │ │ (resume) │ │ (SHA256) │ │  (zip)   │ │(swap) │
//! └────────┘ └──────────┘ └──────────┘ └──────────┘ └───────┘
//!                    │
//!                    ▼
//!              EventSink  ──►  progress / failed / end
//! ```
//!
//! # Example
//!
//! ```no_run
//! use moxlaunch::config::LaunchConfig;
//! use moxlaunch::provision::{spawn_provisioning, LaunchEvent, Provisioner};
//!
//! let provisioner = Provisioner::new(LaunchConfig::load()?)?;
//! let (handle, mut events) = spawn_provisioning(provisioner)?;
//! while let Some(event) = events.blocking_recv() {
//!     if let LaunchEvent::Progress(p) = event {
//!         println!("{}/{} {}", p.value, p.max, p.detail);
//!     }
//! }
//! let report = handle.join().expect("provisioning thread panicked")?;
//! println!("{} resources updated", report.updated_count());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod checksum;
mod error;
mod event;
mod extractor;
pub mod fetch;
mod installer;
mod orchestrator;
mod steps;
mod traits;
pub mod version;

pub use error::{LaunchError, ProvisionError, ProvisionResult, VersionError};
pub use event::{format_bytes, EventSink, FailureEvent, LaunchEvent, NoopSink, ProgressEvent};
pub use extractor::{extract_percent, ExtractProgress, ZipExtractor};
pub use fetch::{DownloadState, HttpFetcher, ResumeNotFoundPolicy};
pub use installer::Installer;
pub use orchestrator::{
    spawn_provisioning, ProvisionReport, Provisioner, ResourceOutcome, ResourceReport,
    ResourceStatus,
};
pub use steps::{Stage, Step, ALL_DONE, PROGRESS_MAX, STEPS};
pub use traits::{ArchiveExtractor, ArchiveFetcher};
pub use version::{needs_update, VersionRecord, VersionStore, SENTINEL_VERSION};
