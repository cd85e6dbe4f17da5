//! Error types for manifest loading, saving, and fetching.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while obtaining or persisting a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest file could not be read.
    #[error("cannot read manifest {path}: {source}")]
    Read {
        /// Manifest file path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The manifest content is not a valid manifest document.
    #[error("malformed manifest from {origin}: {source}")]
    Parse {
        /// File path or URL the content came from.
        origin: String,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The manifest could not be written back to disk.
    #[error("cannot write manifest {path}: {source}")]
    Write {
        /// Manifest file path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The manifest request failed at the transport level.
    #[error("manifest request to {url} failed: {source}")]
    Fetch {
        /// Manifest endpoint.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The manifest endpoint answered with a non-200 status.
    #[error("manifest request to {url} returned HTTP {status}")]
    FetchStatus {
        /// Manifest endpoint.
        url: String,
        /// The HTTP status code.
        status: u16,
    },
}

impl ManifestError {
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub fn parse(origin: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Parse {
            origin: origin.into(),
            source,
        }
    }

    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    pub fn fetch(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Fetch {
            url: url.into(),
            source,
        }
    }

    pub fn fetch_status(url: impl Into<String>, status: u16) -> Self {
        Self::FetchStatus {
            url: url.into(),
            status,
        }
    }

    /// True for failures of the remote manifest request, as opposed to local file problems.
    #[must_use]
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, Self::Fetch { .. } | Self::FetchStatus { .. })
    }
}
