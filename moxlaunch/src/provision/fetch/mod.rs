//! Resumable HTTP download of resource archives.
//!
//! - Single archive downloads with `Range` resume support (`http`)
//! - Per-download byte accounting (`state`)
//!
//! There is no retry and no mirror fallback: a failed transfer fails the
//! download stage.

mod http;
mod state;

use std::fmt;
use std::str::FromStr;

pub use http::HttpFetcher;
pub use state::DownloadState;

/// What a `404 Not Found` means for a resumed request.
///
/// Some object stores answer a range request past the end of an expired or
/// already-complete object with 404 instead of 416. With `Complete` the bytes
/// already on disk are accepted as the whole archive; any later checksum
/// stage still guards against truncation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResumeNotFoundPolicy {
    /// Treat the download as finished.
    #[default]
    Complete,
    /// Fail like any other error status.
    Fail,
}

impl ResumeNotFoundPolicy {
    /// Config file spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::Fail => "fail",
        }
    }
}

impl fmt::Display for ResumeNotFoundPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResumeNotFoundPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "complete" => Ok(Self::Complete),
            "fail" => Ok(Self::Fail),
            other => Err(format!("unknown resume policy '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_round_trips_through_str() {
        for policy in [ResumeNotFoundPolicy::Complete, ResumeNotFoundPolicy::Fail] {
            assert_eq!(policy.as_str().parse::<ResumeNotFoundPolicy>(), Ok(policy));
        }
        assert_eq!(
            " FAIL ".parse::<ResumeNotFoundPolicy>(),
            Ok(ResumeNotFoundPolicy::Fail)
        );
        assert!("retry".parse::<ResumeNotFoundPolicy>().is_err());
    }

    #[test]
    fn test_policy_default_is_complete() {
        assert_eq!(ResumeNotFoundPolicy::default(), ResumeNotFoundPolicy::Complete);
    }
}
