//! [`DownloadError`] describes what went wrong inside a single fetch attempt.
//! The retrying fetcher folds each error into a [`FetchOutcome`](super::FetchOutcome)
//! instead of propagating it, so these never abort a batch on their own.

use std::path::PathBuf;

use thiserror::Error;

/// Why a single image request or write did not complete.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// DNS, connect, TLS, or body-stream failure.
    #[error("transport failure fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// No complete response within the configured timeout.
    #[error("timed out fetching {url}")]
    Timeout { url: String },

    /// Any status other than 200.
    #[error("{url} answered HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    /// A validated body could not be written to its local path.
    #[error("cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The manifest listed something that is not an absolute URL.
    #[error("not a fetchable URL: {url}")]
    InvalidUrl { url: String },

    #[error("cannot build HTTP client: {source}")]
    Client {
        #[source]
        source: reqwest::Error,
    },

    /// A header value (usually the auth token) contains bytes HTTP does not allow.
    #[error("invalid value for header {name}")]
    InvalidHeader {
        /// Header name.
        name: &'static str,
    },
}

impl DownloadError {
    /// Wraps a reqwest error, turning timeouts into [`DownloadError::Timeout`].
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout { url: url.into() }
        } else {
            Self::Network {
                url: url.into(),
                source,
            }
        }
    }

    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }
}
