//! Provisioning run orchestration.
//!
//! For each resource, in the fixed order of [`ResourceKind::ALL`]:
//!
//! ```text
//! CheckVersion ─┬─ current ──────────────────────────────────────► next resource
//!               └─ outdated ─► Download ─► VerifyChecksum? ─► Extract ─► Install
//! ```
//!
//! The first failing stage ends the run: a single `failed` event is emitted,
//! later resources are never started, and the error is returned. A run that
//! reaches the end emits `AllDone` progress followed by `end`.

use std::io;
use std::thread::{self, JoinHandle};

use tokio::sync::mpsc::{self, UnboundedReceiver};

use super::checksum::verify_or_discard;
use super::error::{LaunchError, ProvisionError, ProvisionResult};
use super::event::{format_bytes, EventSink, FailureEvent, LaunchEvent, ProgressEvent};
use super::extractor::{ExtractProgress, ZipExtractor};
use super::fetch::{DownloadState, HttpFetcher};
use super::installer::Installer;
use super::steps::{Stage, Step, ALL_DONE, PROGRESS_MAX};
use super::traits::{ArchiveExtractor, ArchiveFetcher};
use super::version::{needs_update, VersionStore, SENTINEL_VERSION};
use crate::config::{LaunchConfig, ResourceDescriptor, ResourceKind};

/// What a run did for one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceOutcome {
    /// Installed version already satisfied the requirement.
    Current { installed: String },
    /// A new version was installed.
    Updated {
        from: String,
        to: String,
        bytes_downloaded: u64,
        files_extracted: usize,
    },
}

/// Outcome for one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceReport {
    pub kind: ResourceKind,
    pub name: String,
    pub outcome: ResourceOutcome,
}

/// Result of a successful provisioning run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisionReport {
    /// One entry per resource, in provisioning order.
    pub resources: Vec<ResourceReport>,
}

impl ProvisionReport {
    /// Number of resources that were updated.
    pub fn updated_count(&self) -> usize {
        self.resources
            .iter()
            .filter(|r| matches!(r.outcome, ResourceOutcome::Updated { .. }))
            .count()
    }
}

/// Installed vs required version of one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceStatus {
    pub kind: ResourceKind,
    pub name: String,
    /// Recorded version, or the sentinel if there is no usable record.
    pub installed: String,
    pub required: String,
    /// Whether the next run would download this resource.
    pub update_pending: bool,
}

/// Runs the provisioning pipeline.
pub struct Provisioner<F: ArchiveFetcher = HttpFetcher, E: ArchiveExtractor = ZipExtractor> {
    config: LaunchConfig,
    fetcher: F,
    extractor: E,
    installer: Installer,
    store: VersionStore,
}

impl Provisioner {
    /// Create a provisioner with an HTTP fetcher built from `config`.
    pub fn new(config: LaunchConfig) -> ProvisionResult<Self> {
        let fetcher = HttpFetcher::with_timeout(config.timeout)?
            .with_resume_not_found(config.resume_not_found);
        Ok(Self::with_components(config, fetcher, ZipExtractor::new()))
    }
}

impl<F: ArchiveFetcher, E: ArchiveExtractor> Provisioner<F, E> {
    /// Create a provisioner with custom I/O components.
    pub fn with_components(config: LaunchConfig, fetcher: F, extractor: E) -> Self {
        let installer = Installer::new(&config.data_dir);
        let store = VersionStore::new(&config.data_dir);
        Self {
            config,
            fetcher,
            extractor,
            installer,
            store,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &LaunchConfig {
        &self.config
    }

    /// Installed and required versions, without touching anything on disk.
    pub fn status(&self) -> Vec<ResourceStatus> {
        self.config
            .resources()
            .iter()
            .map(|descriptor| {
                let installed = match self.store.read(&descriptor.name) {
                    Ok(record) => record.version,
                    Err(e) => {
                        tracing::debug!(resource = %descriptor.name, error = %e, "No version record");
                        SENTINEL_VERSION.to_string()
                    }
                };
                let update_pending = needs_update(&descriptor.version, &installed);
                ResourceStatus {
                    kind: descriptor.kind,
                    name: descriptor.name.clone(),
                    installed,
                    required: descriptor.version.clone(),
                    update_pending,
                }
            })
            .collect()
    }

    /// Bring every resource up to its required version.
    ///
    /// Progress is reported through `sink`; the outcome is returned. Stops at
    /// the first failing stage.
    pub fn run_provisioning(&self, sink: &dyn EventSink) -> Result<ProvisionReport, LaunchError> {
        tracing::info!(data_dir = %self.config.data_dir.display(), "Provisioning started");

        let mut report = ProvisionReport::default();
        for kind in ResourceKind::ALL {
            let descriptor = self.config.resource(kind);
            let outcome = self.provision_resource(descriptor, sink)?;
            report.resources.push(ResourceReport {
                kind,
                name: descriptor.name.clone(),
                outcome,
            });
        }

        sink.emit(LaunchEvent::Progress(ProgressEvent {
            stage: None,
            resource: None,
            tip: "Ready".to_string(),
            detail: "All resources are up to date".to_string(),
            value: ALL_DONE,
            max: PROGRESS_MAX,
        }));
        sink.emit(LaunchEvent::End);

        tracing::info!(updated = report.updated_count(), "Provisioning finished");
        Ok(report)
    }

    fn provision_resource(
        &self,
        descriptor: &ResourceDescriptor,
        sink: &dyn EventSink,
    ) -> Result<ResourceOutcome, LaunchError> {
        let mut reporter = StepReporter::new(sink, descriptor);
        let live = self.installer.live_dir(&descriptor.name);
        let backup = self.installer.backup_dir(&descriptor.name);
        if let Err(e) = self.installer.restore_interrupted_swap(&live, &backup) {
            tracing::warn!(resource = descriptor.label(), error = %e, "Could not restore previous directory");
        }

        reporter.progress(
            Stage::CheckVersion,
            format!("Checking {} version", descriptor.label()),
        );
        let installed = self.store.installed_version(&descriptor.name);
        if !needs_update(&descriptor.version, &installed) {
            tracing::info!(
                resource = descriptor.label(),
                installed = %installed,
                required = %descriptor.version,
                "Up to date"
            );
            return Ok(ResourceOutcome::Current { installed });
        }

        tracing::info!(
            resource = descriptor.label(),
            from = %installed,
            to = %descriptor.version,
            "Updating"
        );
        reporter.begin_update(&installed);

        // Download
        let archive = self
            .installer
            .archive_path(&descriptor.name, &descriptor.version);
        reporter.progress(Stage::Download, "starting download");
        let mut last_percent = None;
        let download = self
            .fetcher
            .fetch(
                &descriptor.download_url,
                &archive,
                self.config.resume_downloads,
                &mut |state: &DownloadState| {
                    let percent = state.percent();
                    if state.bytes_total > 0 && last_percent == Some(percent) {
                        return;
                    }
                    last_percent = Some(percent);
                    reporter.progress(Stage::Download, download_detail(state));
                },
            )
            .map_err(|e| reporter.fail(Stage::Download, e))?;
        tracing::info!(
            resource = descriptor.label(),
            bytes = download.bytes_received,
            "Download complete"
        );
        reporter.progress(Stage::Download, "download complete");

        // VerifyChecksum
        if descriptor.checksum_required {
            reporter.progress(Stage::VerifyChecksum, "checking sha256");
            self.verify(descriptor, &download)
                .map_err(|e| reporter.fail(Stage::VerifyChecksum, e))?;
        }

        // Extract
        let staging = self
            .installer
            .staging_dir(&descriptor.name, &descriptor.version);
        self.installer
            .prepare_staging(&staging)
            .map_err(|e| reporter.fail(Stage::Extract, e))?;
        let files_extracted = self
            .extractor
            .extract(&archive, &staging, &mut |p: &ExtractProgress| {
                reporter.progress(
                    Stage::Extract,
                    format!(
                        "extracting: {}% ({}/{})",
                        p.percent(),
                        p.extracted_count,
                        p.total_count
                    ),
                );
            })
            .map_err(|e| reporter.fail(Stage::Extract, e))?;
        reporter.progress(Stage::Extract, "extraction complete");

        if !self.config.keep_archives {
            if let Err(e) = self.installer.discard_archive(&archive) {
                tracing::warn!(error = %e, "Could not delete archive");
            }
        }

        // Install
        reporter.progress(Stage::Install, "installing");
        self.installer
            .replace_live(&staging, &live, &backup)
            .map_err(|e| reporter.fail(Stage::Install, e))?;
        self.store
            .write(&descriptor.name, &descriptor.version)
            .map_err(|e| reporter.fail(Stage::Install, e))?;

        Ok(ResourceOutcome::Updated {
            from: installed,
            to: descriptor.version.clone(),
            bytes_downloaded: download.bytes_received,
            files_extracted,
        })
    }

    fn verify(
        &self,
        descriptor: &ResourceDescriptor,
        download: &DownloadState,
    ) -> ProvisionResult<()> {
        match descriptor.checksum.as_deref() {
            Some(expected) => verify_or_discard(&download.archive_path, expected),
            None => {
                self.installer.discard_archive(&download.archive_path)?;
                Err(ProvisionError::ChecksumMissing {
                    resource: descriptor.name.clone(),
                })
            }
        }
    }
}

fn download_detail(state: &DownloadState) -> String {
    if state.bytes_total == 0 {
        return format!("downloading: {}", format_bytes(state.bytes_received));
    }
    format!(
        "downloading: {}% ({}/{})",
        state.percent(),
        format_bytes(state.bytes_received),
        format_bytes(state.bytes_total)
    )
}

/// Turns stage transitions of one resource into launch events.
struct StepReporter<'a> {
    sink: &'a dyn EventSink,
    descriptor: &'a ResourceDescriptor,
    tip: String,
    prefix: String,
}

impl<'a> StepReporter<'a> {
    fn new(sink: &'a dyn EventSink, descriptor: &'a ResourceDescriptor) -> Self {
        Self {
            sink,
            descriptor,
            tip: "Checking for updates...".to_string(),
            prefix: String::new(),
        }
    }

    /// Switch to update messages: `Updating Git...`, `[v0.0.0 -> v0.0.1] ...`.
    fn begin_update(&mut self, installed: &str) {
        self.tip = format!("Updating {}...", self.descriptor.label());
        self.prefix = format!("[{} -> {}] ", installed, self.descriptor.version);
    }

    fn value(&self, stage: Stage) -> u32 {
        Step::new(self.descriptor.kind, stage).number()
    }

    fn progress(&self, stage: Stage, detail: impl AsRef<str>) {
        self.sink.emit(LaunchEvent::Progress(ProgressEvent {
            stage: Some(stage),
            resource: Some(self.descriptor.label().to_string()),
            tip: self.tip.clone(),
            detail: format!("{}{}", self.prefix, detail.as_ref()),
            value: self.value(stage),
            max: PROGRESS_MAX,
        }));
    }

    fn fail(&self, stage: Stage, source: ProvisionError) -> LaunchError {
        let err = LaunchError::new(self.descriptor.label(), stage, source);
        tracing::error!(
            resource = self.descriptor.label(),
            stage = stage.name(),
            error = %err.source,
            "Provisioning failed"
        );
        self.sink.emit(LaunchEvent::Failed(FailureEvent {
            stage,
            resource: err.resource.clone(),
            tip: self.tip.clone(),
            detail: format!("{}{} failed: {}", self.prefix, stage, err.source),
            value: self.value(stage),
            max: PROGRESS_MAX,
            err_msg: err.source.to_string(),
        }));
        err
    }
}

/// Run `provisioner` on a dedicated thread.
///
/// Returns the thread handle and the receiving end of the event channel. The
/// channel closes when the run ends.
pub fn spawn_provisioning<F, E>(
    provisioner: Provisioner<F, E>,
) -> io::Result<(
    JoinHandle<Result<ProvisionReport, LaunchError>>,
    UnboundedReceiver<LaunchEvent>,
)>
where
    F: ArchiveFetcher + 'static,
    E: ArchiveExtractor + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = thread::Builder::new()
        .name("moxlaunch-provision".to_string())
        .spawn(move || provisioner.run_provisioning(&tx))?;
    Ok((handle, rx))
}
