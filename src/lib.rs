//! Snapgrab Core Library
//!
//! Resumable, strictly sequential downloading of image collections described
//! by a JSON manifest. Re-running against the same manifest and directory
//! picks up where the previous run stopped: every entry maps to a
//! deterministic local path, and files already there are verified rather than
//! fetched again.
//!
//! # Architecture
//!
//! - [`manifest`] - Manifest documents: parsing, saving, remote fetch
//! - [`select`] - Newest-first selection of entries that still need fetching
//! - [`validate`] - Completeness checks on image bytes
//! - [`storage`] - Target directory preparation and existing-file probes
//! - [`download`] - HTTP client, retrying fetcher, paced orchestrator

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod download;
pub mod manifest;
pub mod select;
pub mod storage;
pub mod validate;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use download::{
    DEFAULT_MAX_RETRIES, DownloadError, DownloadOrchestrator, FailureType, FetchOutcome,
    FetchReport, HttpClient, ItemEvent, ItemFetcher, RetryDecision, RetryPolicy, RetryingFetcher,
    RunSummary, request_headers,
};
pub use manifest::{ManifestClient, ManifestDocument, ManifestEntry, ManifestError};
pub use select::{ManifestIndexer, PendingItem, ScanMark, Selection, SelectionWindow};
pub use storage::{
    ExistingFile, StorageError, ensure_target_dir, inspect_target_dir, probe_existing,
};
pub use validate::{ContentValidator, ValidationMode, is_valid_image};
