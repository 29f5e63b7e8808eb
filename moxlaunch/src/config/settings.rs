//! Runtime settings for a provisioning run.

use std::path::PathBuf;
use std::time::Duration;

use super::descriptor::{ResourceDescriptor, ResourceKind};
use super::file::default_data_dir;
use crate::provision::ResumeNotFoundPolicy;

/// Default HTTP timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Settings for a provisioning run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchConfig {
    /// Root for live directories, archives and version records.
    pub data_dir: PathBuf,

    /// HTTP request timeout.
    pub timeout: Duration,

    /// Continue partial downloads left by an earlier run.
    pub resume_downloads: bool,

    /// How a 404 on a resumed request is interpreted.
    pub resume_not_found: ResumeNotFoundPolicy,

    /// Keep downloaded archives after a successful extraction.
    pub keep_archives: bool,

    resources: [ResourceDescriptor; 3],
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self::new(default_data_dir())
    }
}

impl LaunchConfig {
    /// Create a configuration with the built-in descriptors.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            resume_downloads: true,
            resume_not_found: ResumeNotFoundPolicy::default(),
            keep_archives: false,
            resources: ResourceKind::ALL.map(ResourceDescriptor::builtin),
        }
    }

    /// Descriptor for one resource.
    pub fn resource(&self, kind: ResourceKind) -> &ResourceDescriptor {
        &self.resources[kind.index()]
    }

    /// All descriptors in provisioning order.
    pub fn resources(&self) -> &[ResourceDescriptor] {
        &self.resources
    }

    /// Replace the descriptor for `descriptor.kind`.
    pub fn with_resource(mut self, descriptor: ResourceDescriptor) -> Self {
        self.set_resource(descriptor);
        self
    }

    pub(crate) fn set_resource(&mut self, descriptor: ResourceDescriptor) {
        let index = descriptor.kind.index();
        self.resources[index] = descriptor;
    }

    /// Set the data directory.
    pub fn with_data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_dir = path.into();
        self
    }

    /// Set the HTTP timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enable or disable resuming partial downloads.
    pub fn with_resume_downloads(mut self, resume: bool) -> Self {
        self.resume_downloads = resume;
        self
    }

    /// Set the 404-on-resume policy.
    pub fn with_resume_not_found(mut self, policy: ResumeNotFoundPolicy) -> Self {
        self.resume_not_found = policy;
        self
    }

    /// Enable or disable keeping downloaded archives.
    pub fn with_keep_archives(mut self, keep: bool) -> Self {
        self.keep_archives = keep;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LaunchConfig::new("/data");
        assert_eq!(config.data_dir, PathBuf::from("/data"));
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert!(config.resume_downloads);
        assert_eq!(config.resume_not_found, ResumeNotFoundPolicy::Complete);
        assert!(!config.keep_archives);

        let kinds: Vec<_> = config.resources().iter().map(|r| r.kind).collect();
        assert_eq!(kinds, ResourceKind::ALL.to_vec());
    }

    #[test]
    fn test_builder_pattern() {
        let agent = ResourceDescriptor::new(
            ResourceKind::Agent,
            "agent",
            "v1.2.0",
            "https://example.com/agent.zip",
        );
        let config = LaunchConfig::new("/data")
            .with_data_dir("/other")
            .with_timeout(Duration::from_secs(60))
            .with_resume_downloads(false)
            .with_resume_not_found(ResumeNotFoundPolicy::Fail)
            .with_keep_archives(true)
            .with_resource(agent.clone());

        assert_eq!(config.data_dir, PathBuf::from("/other"));
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert!(!config.resume_downloads);
        assert_eq!(config.resume_not_found, ResumeNotFoundPolicy::Fail);
        assert!(config.keep_archives);
        assert_eq!(config.resource(ResourceKind::Agent), &agent);
        assert_eq!(
            config.resource(ResourceKind::Git),
            &ResourceDescriptor::builtin(ResourceKind::Git)
        );
    }
}
