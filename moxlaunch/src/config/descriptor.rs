//! The managed resources and their download descriptors.

use std::fmt;

/// The resources provisioned before launch, in provisioning order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    /// Portable git distribution.
    Git,
    /// Portable Python runtime environment.
    PythonEnv,
    /// Agent component.
    Agent,
}

impl ResourceKind {
    /// Every resource, in the fixed order they are provisioned.
    pub const ALL: [ResourceKind; 3] = [Self::Git, Self::PythonEnv, Self::Agent];

    /// Position in [`ResourceKind::ALL`].
    pub fn index(&self) -> usize {
        match self {
            Self::Git => 0,
            Self::PythonEnv => 1,
            Self::Agent => 2,
        }
    }

    /// Display label used in progress messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Git => "Git",
            Self::PythonEnv => "Python environment",
            Self::Agent => "Agent",
        }
    }

    /// Key used in config section names (`[resource.<key>]`).
    pub fn key(&self) -> &'static str {
        match self {
            Self::Git => "git",
            Self::PythonEnv => "python_env",
            Self::Agent => "agent",
        }
    }

    /// Default install directory and record name.
    pub fn default_name(&self) -> &'static str {
        match self {
            Self::Git => "git_portable_win",
            Self::PythonEnv => "python_env_win",
            Self::Agent => "agent",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub(crate) const GIT_VERSION: &str = "v0.0.1";
pub(crate) const GIT_URL: &str = "https://www.modelscope.cn/api/v1/models/moxying/base-git-model-v0.0.1/repo?Revision=master&FilePath=git_portable_win_v0.0.1.zip";
pub(crate) const GIT_SHA256: &str =
    "c6e6334804777ea9239b4bfb9028beea6d98b6a9e51c0082a28aa6d01bbc6ea7";

pub(crate) const PYTHON_ENV_VERSION: &str = "v0.0.1";
pub(crate) const PYTHON_ENV_URL: &str = "https://www.modelscope.cn/api/v1/models/moxying/base-win-model-v0.0.1/repo?Revision=master&FilePath=python_env_win_v0.0.1.zip";
pub(crate) const PYTHON_ENV_SHA256: &str =
    "cc1bac2ad3a353cd98e114dffe430ea775e30651b7e91ff7f52e5866bbb8d5a6";

/// Where and what to download for one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDescriptor {
    /// Which resource this describes.
    pub kind: ResourceKind,
    /// Directory and record name under the data directory.
    pub name: String,
    /// Required version, e.g. `v0.0.1`.
    pub version: String,
    /// Archive URL.
    pub download_url: String,
    /// Expected SHA-256 of the archive, lowercase or uppercase hex.
    pub checksum: Option<String>,
    /// Whether the archive must be verified before extraction.
    pub checksum_required: bool,
}

impl ResourceDescriptor {
    /// Create a descriptor without checksum verification.
    pub fn new(
        kind: ResourceKind,
        name: impl Into<String>,
        version: impl Into<String>,
        download_url: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            version: version.into(),
            download_url: download_url.into(),
            checksum: None,
            checksum_required: false,
        }
    }

    /// The descriptor shipped with the launcher.
    ///
    /// The agent has no published archive yet; its required version is the
    /// sentinel so it is always current.
    pub fn builtin(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::Git => Self::new(kind, kind.default_name(), GIT_VERSION, GIT_URL)
                .with_checksum(GIT_SHA256),
            ResourceKind::PythonEnv => {
                Self::new(kind, kind.default_name(), PYTHON_ENV_VERSION, PYTHON_ENV_URL)
                    .with_checksum(PYTHON_ENV_SHA256)
            }
            ResourceKind::Agent => Self::new(kind, kind.default_name(), "v0.0.0", ""),
        }
    }

    /// Set the expected checksum.
    pub fn with_checksum(mut self, sha256: impl Into<String>) -> Self {
        self.checksum = Some(sha256.into());
        self
    }

    /// Enable or disable checksum verification.
    pub fn with_checksum_required(mut self, required: bool) -> Self {
        self.checksum_required = required;
        self
    }

    /// Display label of the resource.
    pub fn label(&self) -> &'static str {
        self.kind.label()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_order_and_index() {
        for (i, kind) in ResourceKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
        assert!(ResourceKind::Git < ResourceKind::PythonEnv);
        assert!(ResourceKind::PythonEnv < ResourceKind::Agent);
    }

    #[test]
    fn test_builtin_descriptors() {
        let git = ResourceDescriptor::builtin(ResourceKind::Git);
        assert_eq!(git.name, "git_portable_win");
        assert_eq!(git.version, "v0.0.1");
        assert!(git.download_url.ends_with("git_portable_win_v0.0.1.zip"));
        assert_eq!(git.checksum.as_deref(), Some(GIT_SHA256));
        assert!(!git.checksum_required);

        let env = ResourceDescriptor::builtin(ResourceKind::PythonEnv);
        assert_eq!(env.name, "python_env_win");
        assert!(env.download_url.ends_with("python_env_win_v0.0.1.zip"));

        let agent = ResourceDescriptor::builtin(ResourceKind::Agent);
        assert_eq!(agent.version, "v0.0.0");
        assert!(agent.download_url.is_empty());
    }
}
