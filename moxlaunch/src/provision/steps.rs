//! Named pipeline steps and their stable progress numbering.
//!
//! Every (resource, stage) pair has exactly one entry in [`STEPS`]. The
//! numeric value reported to the event sink is the entry's position in that
//! list (1-based), and [`PROGRESS_MAX`] is the list length plus the terminal
//! `AllDone` marker. Reordering resources or stages changes the numbers only
//! by editing this list.

use std::fmt;

use serde::Serialize;

use crate::config::ResourceKind;

/// A stage within one resource's provisioning sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Reading the installed version and deciding whether to update.
    CheckVersion,
    /// Downloading the archive.
    Download,
    /// Verifying the archive checksum.
    VerifyChecksum,
    /// Extracting the archive into the staging directory.
    Extract,
    /// Swapping staging into the live directory and recording the version.
    Install,
}

impl Stage {
    /// Stages in execution order.
    pub const ALL: [Stage; 5] = [
        Stage::CheckVersion,
        Stage::Download,
        Stage::VerifyChecksum,
        Stage::Extract,
        Stage::Install,
    ];

    /// Get a human-readable name for the stage.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CheckVersion => "Version check",
            Self::Download => "Download",
            Self::VerifyChecksum => "Checksum verification",
            Self::Extract => "Extraction",
            Self::Install => "Install",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::CheckVersion => "version check",
            Self::Download => "download",
            Self::VerifyChecksum => "checksum verification",
            Self::Extract => "extraction",
            Self::Install => "install",
        };
        f.write_str(s)
    }
}

/// One numbered step of a provisioning run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Step {
    pub resource: ResourceKind,
    pub stage: Stage,
}

impl Step {
    /// The step for `stage` of `resource`.
    pub const fn new(resource: ResourceKind, stage: Stage) -> Self {
        Self { resource, stage }
    }

    /// The 1-based progress value for this step.
    pub fn number(&self) -> u32 {
        STEPS
            .iter()
            .position(|s| s == self)
            .map(|i| i as u32 + 1)
            .unwrap_or(ALL_DONE)
    }
}

/// All steps in the order they are reported.
pub const STEPS: [Step; 15] = [
    Step::new(ResourceKind::Git, Stage::CheckVersion),
    Step::new(ResourceKind::Git, Stage::Download),
    Step::new(ResourceKind::Git, Stage::VerifyChecksum),
    Step::new(ResourceKind::Git, Stage::Extract),
    Step::new(ResourceKind::Git, Stage::Install),
    Step::new(ResourceKind::PythonEnv, Stage::CheckVersion),
    Step::new(ResourceKind::PythonEnv, Stage::Download),
    Step::new(ResourceKind::PythonEnv, Stage::VerifyChecksum),
    Step::new(ResourceKind::PythonEnv, Stage::Extract),
    Step::new(ResourceKind::PythonEnv, Stage::Install),
    Step::new(ResourceKind::Agent, Stage::CheckVersion),
    Step::new(ResourceKind::Agent, Stage::Download),
    Step::new(ResourceKind::Agent, Stage::VerifyChecksum),
    Step::new(ResourceKind::Agent, Stage::Extract),
    Step::new(ResourceKind::Agent, Stage::Install),
];

/// Upper bound of the progress scale: every step plus `AllDone`.
pub const PROGRESS_MAX: u32 = STEPS.len() as u32 + 1;

/// Progress value of the terminal `AllDone` marker.
pub const ALL_DONE: u32 = PROGRESS_MAX;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_max_counts_all_done() {
        assert_eq!(PROGRESS_MAX, 16);
        assert_eq!(ALL_DONE, PROGRESS_MAX);
    }

    #[test]
    fn test_step_numbers_are_stable() {
        assert_eq!(Step::new(ResourceKind::Git, Stage::CheckVersion).number(), 1);
        assert_eq!(Step::new(ResourceKind::Git, Stage::Install).number(), 5);
        assert_eq!(
            Step::new(ResourceKind::PythonEnv, Stage::CheckVersion).number(),
            6
        );
        assert_eq!(Step::new(ResourceKind::Agent, Stage::Install).number(), 15);
    }

    #[test]
    fn test_every_resource_stage_pair_is_listed_once() {
        for kind in ResourceKind::ALL {
            for stage in Stage::ALL {
                let step = Step::new(kind, stage);
                assert_eq!(STEPS.iter().filter(|s| **s == step).count(), 1);
            }
        }
    }

    #[test]
    fn test_steps_follow_resource_order() {
        let numbers: Vec<u32> = ResourceKind::ALL
            .iter()
            .flat_map(|kind| Stage::ALL.iter().map(move |stage| Step::new(*kind, *stage)))
            .map(|step| step.number())
            .collect();
        assert!(numbers.windows(2).all(|w| w[0] < w[1]));
        assert!(numbers.iter().all(|n| *n < ALL_DONE));
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::VerifyChecksum.to_string(), "checksum verification");
        assert_eq!(Stage::Extract.name(), "Extraction");
    }
}
