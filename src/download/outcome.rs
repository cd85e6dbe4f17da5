//! Per-attempt results of an image fetch.

use std::fmt;

use super::DownloadError;
use super::constants::RATE_LIMIT_SUSPECT_STATUSES;
use super::retry::FailureType;

/// What a single fetch attempt produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The body passed validation and was written; carries its length.
    Success(u64),
    /// HTTP 200 whose body is not a complete image (error page, truncated payload).
    InvalidContent,
    /// A non-200 response.
    HttpStatus(u16),
    /// Timeout or other transport failure.
    TransientNetwork(String),
    /// Anything not anticipated: invalid URL, local write failure, client misconfiguration.
    Fatal(String),
}

impl FetchOutcome {
    /// Folds an attempt error into an outcome.
    #[must_use]
    pub fn from_error(error: &DownloadError) -> Self {
        match error {
            DownloadError::HttpStatus { status, .. } => Self::HttpStatus(*status),
            DownloadError::Timeout { .. } | DownloadError::Network { .. } => {
                Self::TransientNetwork(error.to_string())
            }
            DownloadError::Io { .. }
            | DownloadError::InvalidUrl { .. }
            | DownloadError::Client { .. }
            | DownloadError::InvalidHeader { .. } => Self::Fatal(error.to_string()),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Classifies a failed attempt for the retry policy. `None` for success.
    #[must_use]
    pub fn failure_type(&self) -> Option<FailureType> {
        match self {
            Self::Success(_) => None,
            Self::HttpStatus(status) if RATE_LIMIT_SUSPECT_STATUSES.contains(status) => {
                Some(FailureType::RateLimited)
            }
            Self::InvalidContent | Self::HttpStatus(_) | Self::TransientNetwork(_) => {
                Some(FailureType::Transient)
            }
            Self::Fatal(_) => Some(FailureType::Unexpected),
        }
    }
}

impl fmt::Display for FetchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success(bytes) => write!(f, "downloaded {bytes} bytes"),
            Self::InvalidContent => f.write_str("incomplete or non-image content"),
            Self::HttpStatus(status) if RATE_LIMIT_SUSPECT_STATUSES.contains(status) => {
                write!(f, "HTTP {status} (possible rate limit or expired token)")
            }
            Self::HttpStatus(status) => write!(f, "HTTP {status}"),
            Self::TransientNetwork(detail) => write!(f, "network: {detail}"),
            Self::Fatal(detail) => write!(f, "unexpected: {detail}"),
        }
    }
}
