//! Sequential image downloading with per-item retries and pacing.
//!
//! This module provides everything between a list of pending items and files
//! on disk:
//!
//! - [`HttpClient`] - one configured `reqwest` client per run
//! - [`request_headers`] - the fixed browser-like header set
//! - [`RetryingFetcher`] - bounded-retry fetch, validate, persist for one item
//! - [`DownloadOrchestrator`] - strictly ordered, paced processing of a run
//!
//! Bodies are buffered in memory and validated before anything is written,
//! so a failed or truncated fetch never leaves a partial file behind.

mod client;
mod constants;
mod error;
mod fetcher;
mod headers;
mod orchestrator;
mod outcome;
mod retry;

pub use client::HttpClient;
pub use constants::{
    DEFAULT_ITEM_DELAY, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_SECS, RATE_LIMIT_SUSPECT_STATUSES,
};
pub use error::DownloadError;
pub use fetcher::{FetchReport, RetryingFetcher};
pub use headers::{BROWSER_USER_AGENT, IMAGE_ACCEPT, TOKEN_COOKIE_NAME, request_headers};
pub use orchestrator::{
    DownloadOrchestrator, FailedItem, ItemEvent, ItemFetcher, RunSummary, needs_delay_before,
};
pub use outcome::FetchOutcome;
pub use retry::{FailureType, RetryDecision, RetryPolicy};
