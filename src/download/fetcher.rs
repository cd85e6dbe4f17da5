//! Bounded-retry fetch of a single pending item.
//!
//! One attempt is: GET the image into memory, validate it, and only then write
//! it next to its local path and rename it into place. Every failure (transport, status, invalid body, local
//! write) becomes a [`FetchOutcome`] and consumes one unit of the item's retry
//! budget. Running out of budget ends the item, never the batch.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, instrument, warn};

use super::client::HttpClient;
use super::error::DownloadError;
use super::outcome::FetchOutcome;
use super::retry::{FailureType, RetryDecision, RetryPolicy};
use crate::select::PendingItem;
use crate::validate::{ContentSample, ContentValidator};

/// Appended to the local file name while a body is being written.
const PARTIAL_SUFFIX: &str = ".part";

/// Terminal result of fetching one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchReport {
    /// Attempts made (0 when nothing was fetched, e.g. in a dry run).
    pub attempts: u32,
    /// Outcome of the last attempt; `Success` unless the budget ran out.
    pub outcome: FetchOutcome,
    /// Failed attempts that looked like throttling or a bad token.
    pub rate_limited: u32,
    /// Failed attempts with an unanticipated cause.
    pub unexpected: u32,
}

impl FetchReport {
    /// Whether the item ended up on disk.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.outcome.is_success()
    }

    /// Report for an item that was listed but not fetched.
    #[must_use]
    pub fn not_attempted() -> Self {
        Self {
            attempts: 0,
            outcome: FetchOutcome::Success(0),
            rate_limited: 0,
            unexpected: 0,
        }
    }
}

/// Fetches items one at a time with a per-item retry budget.
///
/// Owns the response buffer, which is cleared before every attempt and reused
/// across items.
#[derive(Debug)]
pub struct RetryingFetcher {
    client: HttpClient,
    validator: ContentValidator,
    policy: RetryPolicy,
    buffer: Vec<u8>,
}

impl RetryingFetcher {
    #[must_use]
    pub fn new(client: HttpClient, validator: ContentValidator, policy: RetryPolicy) -> Self {
        Self {
            client,
            validator,
            policy,
            buffer: Vec::new(),
        }
    }

    #[must_use]
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Runs the retry loop for `item` until it succeeds or the budget is spent.
    #[instrument(skip(self, item), fields(ordinal = item.ordinal, url = %item.source_url))]
    pub async fn fetch(&mut self, item: &PendingItem) -> FetchReport {
        let mut attempt = 0u32;
        let mut rate_limited = 0u32;
        let mut unexpected = 0u32;

        loop {
            attempt += 1;
            debug!(attempt, "attempting download");

            let outcome = self.attempt(item).await;
            let Some(failure_type) = outcome.failure_type() else {
                info!(
                    ordinal = item.ordinal,
                    path = %item.local_path.display(),
                    attempts = attempt,
                    "{outcome}"
                );
                return FetchReport {
                    attempts: attempt,
                    outcome,
                    rate_limited,
                    unexpected,
                };
            };

            match failure_type {
                FailureType::RateLimited => {
                    rate_limited += 1;
                    warn!(
                        ordinal = item.ordinal,
                        attempt,
                        "{outcome}; backing off"
                    );
                }
                FailureType::Unexpected => {
                    unexpected += 1;
                    error!(ordinal = item.ordinal, attempt, "{outcome}");
                }
                FailureType::Transient => {
                    info!(ordinal = item.ordinal, attempt, "attempt failed: {outcome}");
                }
            }

            match self.policy.should_retry(failure_type, attempt) {
                RetryDecision::Retry { delay, attempt: next } => {
                    debug!(
                        next_attempt = next,
                        max_attempts = self.policy.max_attempts(),
                        delay_ms = delay.as_millis(),
                        "retrying download"
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
                RetryDecision::DoNotRetry { reason } => {
                    warn!(
                        ordinal = item.ordinal,
                        url = %item.source_url,
                        attempts = attempt,
                        %reason,
                        "giving up on item: {outcome}"
                    );
                    return FetchReport {
                        attempts: attempt,
                        outcome,
                        rate_limited,
                        unexpected,
                    };
                }
            }
        }
    }

    /// One GET + validate + persist cycle.
    async fn attempt(&mut self, item: &PendingItem) -> FetchOutcome {
        let len = match self.client.get_into(&item.source_url, &mut self.buffer).await {
            Ok(len) => len,
            Err(e) => return FetchOutcome::from_error(&e),
        };

        if !self
            .validator
            .accepts(ContentSample::from_buffer(&self.buffer))
        {
            debug!(bytes = len, "body failed validation, not persisting");
            return FetchOutcome::InvalidContent;
        }

        match persist(&item.local_path, &self.buffer).await {
            Ok(()) => FetchOutcome::Success(len),
            Err(e) => FetchOutcome::from_error(&e),
        }
    }
}

/// Sibling path the body is written to before it is moved into place.
fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(PARTIAL_SUFFIX);
    path.with_file_name(name)
}

/// Writes `body` to `path` so that `path` only ever holds a complete body.
///
/// A failed write or rename removes the partial file and leaves whatever was
/// at `path` before untouched.
async fn persist(path: &Path, body: &[u8]) -> Result<(), DownloadError> {
    let partial = partial_path(path);
    let result = match tokio::fs::write(&partial, body).await {
        Ok(()) => tokio::fs::rename(&partial, path)
            .await
            .map_err(|e| DownloadError::io(path, e)),
        Err(e) => Err(DownloadError::io(&partial, e)),
    };
    if result.is_err() {
        debug!(path = %partial.display(), "cleaning up partial file after error");
        let _ = tokio::fs::remove_file(&partial).await;
    }
    result
}
