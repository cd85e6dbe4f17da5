//! Exit code logic for the snapgrab process.
//!
//! Single responsibility: map run results and fatal errors to process exit codes.

use snapgrab_core::{ManifestError, StorageError};
use thiserror::Error;

use crate::ProcessExit;

/// Conditions that abort the run before or between items.
///
/// Each variant family has its own exit code so scripts can tell
/// misconfiguration apart from a flaky remote service.
#[derive(Debug, Error)]
pub(crate) enum FatalError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("invalid configuration: {0:#}")]
    Config(anyhow::Error),
}

impl FatalError {
    pub(crate) fn exit_code(&self) -> u8 {
        match self {
            Self::Storage(StorageError::NotADirectory { .. }) => 3,
            Self::Storage(StorageError::CreateDir { .. }) => 4,
            Self::Storage(StorageError::Inspect { .. }) => 7,
            Self::Manifest(err) if err.is_fetch_failure() => 6,
            Self::Manifest(_) => 5,
            Self::Config(_) => 8,
        }
    }
}

/// Determines the process exit outcome from downloaded and failed item counts.
pub(crate) fn determine_exit_outcome(downloaded: usize, failed: usize) -> ProcessExit {
    if failed == 0 {
        ProcessExit::Success
    } else if downloaded > 0 {
        ProcessExit::Partial
    } else {
        ProcessExit::Failure
    }
}
