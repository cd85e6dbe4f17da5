//! Sequential, paced processing of the pending items of a run.
//!
//! The orchestrator owns pacing and sequencing only. Retries live entirely in
//! the [`ItemFetcher`]; an item that exhausts its budget is recorded and the
//! run moves on.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use snapgrab_core::download::{
//!     DownloadOrchestrator, HttpClient, RetryPolicy, RetryingFetcher, request_headers,
//! };
//! use snapgrab_core::select::PendingItem;
//! use snapgrab_core::validate::ContentValidator;
//!
//! # async fn example(items: Vec<PendingItem>) -> Result<(), Box<dyn std::error::Error>> {
//! let headers = request_headers(None, "https://gallery.example/")?;
//! let client = HttpClient::new(Duration::from_secs(30), headers)?;
//! let mut fetcher = RetryingFetcher::new(client, ContentValidator::Signature, RetryPolicy::default());
//!
//! let orchestrator = DownloadOrchestrator::new(Duration::from_secs(1), false);
//! let summary = orchestrator.run_all(&items, &mut fetcher, &mut |_| {}).await;
//! println!("Downloaded: {}, Failed: {}", summary.downloaded(), summary.failed());
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use super::constants::DEFAULT_ITEM_DELAY;
use super::fetcher::{FetchReport, RetryingFetcher};
use super::outcome::FetchOutcome;
use crate::select::PendingItem;

/// Anything that can drive one item to a terminal outcome.
#[async_trait]
pub trait ItemFetcher: Send {
    /// Fetches `item`, retrying internally, and reports how it ended.
    async fn fetch(&mut self, item: &PendingItem) -> FetchReport;
}

#[async_trait]
impl ItemFetcher for RetryingFetcher {
    async fn fetch(&mut self, item: &PendingItem) -> FetchReport {
        RetryingFetcher::fetch(self, item).await
    }
}

/// Progress notifications emitted while a run is processed.
#[derive(Debug)]
pub enum ItemEvent<'a> {
    /// About to pace and fetch `item`; `position` is 1-based within the run.
    Starting {
        item: &'a PendingItem,
        position: usize,
        total: usize,
    },
    /// `item` reached a terminal outcome.
    Finished {
        item: &'a PendingItem,
        report: &'a FetchReport,
    },
}

/// An item that exhausted its retry budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedItem {
    pub ordinal: usize,
    pub source_url: String,
    pub attempts: u32,
    pub last_outcome: FetchOutcome,
}

/// Totals from one orchestrated run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    downloaded: usize,
    bytes: u64,
    retried: u64,
    rate_limited: u64,
    failures: Vec<FailedItem>,
    dry_run: bool,
}

impl RunSummary {
    /// Items that ended on disk (or would have, in a dry run).
    #[must_use]
    pub fn downloaded(&self) -> usize {
        self.downloaded
    }

    /// Items that exhausted their retry budget.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.downloaded + self.failed()
    }

    /// Attempts beyond the first, summed over all items.
    #[must_use]
    pub fn retried(&self) -> u64 {
        self.retried
    }

    /// Attempts that failed with a rate-limit-suspected status.
    #[must_use]
    pub fn rate_limited(&self) -> u64 {
        self.rate_limited
    }

    /// Bytes written by successful fetches.
    #[must_use]
    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    #[must_use]
    pub fn failures(&self) -> &[FailedItem] {
        &self.failures
    }

    #[must_use]
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn record(&mut self, item: &PendingItem, report: &FetchReport) {
        self.retried += u64::from(report.attempts.saturating_sub(1));
        self.rate_limited += u64::from(report.rate_limited);
        match &report.outcome {
            FetchOutcome::Success(bytes) => {
                self.downloaded += 1;
                self.bytes += bytes;
            }
            other => self.failures.push(FailedItem {
                ordinal: item.ordinal,
                source_url: item.source_url.clone(),
                attempts: report.attempts,
                last_outcome: other.clone(),
            }),
        }
    }
}

/// Whether the item at `index` (0-based) of a `total`-item run waits first.
///
/// The first and last items go straight through, except that in a two-item
/// run both wait. A single item never waits.
#[must_use]
pub fn needs_delay_before(index: usize, total: usize) -> bool {
    match total {
        0 | 1 => false,
        2 => true,
        _ => index != 0 && index + 1 != total,
    }
}

/// Drives pending items through a fetcher one at a time.
#[derive(Debug, Clone, Copy)]
pub struct DownloadOrchestrator {
    item_delay: Duration,
    dry_run: bool,
}

impl Default for DownloadOrchestrator {
    fn default() -> Self {
        Self::new(DEFAULT_ITEM_DELAY, false)
    }
}

impl DownloadOrchestrator {
    #[must_use]
    pub fn new(item_delay: Duration, dry_run: bool) -> Self {
        Self {
            item_delay,
            dry_run,
        }
    }

    #[must_use]
    pub fn item_delay(&self) -> Duration {
        self.item_delay
    }

    #[must_use]
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Processes `items` strictly in order.
    ///
    /// In a dry run nothing is paced or fetched and every item counts as
    /// downloaded.
    #[instrument(
        skip(self, items, fetcher, on_event),
        fields(items = items.len(), dry_run = self.dry_run)
    )]
    pub async fn run_all(
        &self,
        items: &[PendingItem],
        fetcher: &mut dyn ItemFetcher,
        on_event: &mut (dyn for<'a> FnMut(ItemEvent<'a>) + Send),
    ) -> RunSummary {
        let total = items.len();
        let mut summary = RunSummary {
            dry_run: self.dry_run,
            ..RunSummary::default()
        };

        for (index, item) in items.iter().enumerate() {
            on_event(ItemEvent::Starting {
                item,
                position: index + 1,
                total,
            });

            let report = if self.dry_run {
                info!(
                    ordinal = item.ordinal,
                    url = %item.source_url,
                    path = %item.local_path.display(),
                    "would download"
                );
                FetchReport::not_attempted()
            } else {
                if needs_delay_before(index, total) && !self.item_delay.is_zero() {
                    debug!(delay_ms = self.item_delay.as_millis(), "pacing before next item");
                    tokio::time::sleep(self.item_delay).await;
                }
                fetcher.fetch(item).await
            };

            summary.record(item, &report);
            on_event(ItemEvent::Finished {
                item,
                report: &report,
            });
        }

        info!(
            downloaded = summary.downloaded(),
            failed = summary.failed(),
            retried = summary.retried(),
            "run complete"
        );
        summary
    }
}
