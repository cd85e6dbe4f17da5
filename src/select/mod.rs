//! Selection of the manifest entries that still need downloading.
//!
//! The manifest lists entries oldest-first; selection walks them newest-first,
//! drops `offset` entries outright, verifies whatever already sits at each
//! candidate's local path, drops `skip` of the remaining candidates, and stops
//! as soon as `limit` items are pending. Verification touches the disk, so
//! nothing past the limit is examined.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use snapgrab_core::manifest::ManifestDocument;
//! use snapgrab_core::select::{ManifestIndexer, SelectionWindow};
//! use snapgrab_core::validate::ContentValidator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let manifest = ManifestDocument::load(Path::new("manifest.json")).await?;
//! let indexer = ManifestIndexer::new(SelectionWindow::default(), ContentValidator::Signature);
//! let selection = indexer
//!     .select(manifest.entries(), Path::new("./images"), &mut |_| {})
//!     .await?;
//! println!("{} pending, {} already present", selection.pending.len(), selection.existing);
//! # Ok(())
//! # }
//! ```

mod filename;

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::manifest::ManifestEntry;
use crate::storage::{ExistingFile, StorageError, probe_existing};
use crate::validate::ContentValidator;

pub use filename::{FALLBACK_EXTENSION, local_file_name, normalize_timestamp};

/// An entry chosen for download in this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingItem {
    /// Remote image URL.
    pub source_url: String,
    /// Where the validated image will be written.
    pub local_path: PathBuf,
    /// 1-based position in the newest-first manifest.
    pub ordinal: usize,
}

impl PendingItem {
    /// File name component of the local path, for display.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.local_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Narrows which manifest entries become pending items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionWindow {
    /// Newest-first entries ignored before any verification.
    pub offset: usize,
    /// Candidates (entries that still need fetching) dropped after verification.
    pub skip: usize,
    /// Maximum number of pending items; `None` for no cap.
    pub limit: Option<usize>,
}

/// What the indexer saw for one candidate, for liveness feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMark {
    /// No file at the derived path.
    Missing,
    /// A complete file is already present.
    Present,
    /// A file is present but fails validation and will be replaced.
    Corrupt,
}

impl From<ExistingFile> for ScanMark {
    fn from(state: ExistingFile) -> Self {
        match state {
            ExistingFile::Absent => Self::Missing,
            ExistingFile::Valid => Self::Present,
            ExistingFile::Invalid => Self::Corrupt,
        }
    }
}

/// Result of a selection pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Items to download, newest-first.
    pub pending: Vec<PendingItem>,
    /// Verified files found among the examined entries.
    pub existing: usize,
    /// Existing files that failed validation and will be overwritten.
    pub corrupt: usize,
    /// Candidates dropped by `skip`.
    pub skipped: usize,
}

/// Turns a manifest plus filesystem state into an ordered pending list.
#[derive(Debug, Clone, Copy)]
pub struct ManifestIndexer {
    window: SelectionWindow,
    validator: ContentValidator,
}

impl ManifestIndexer {
    #[must_use]
    pub fn new(window: SelectionWindow, validator: ContentValidator) -> Self {
        Self { window, validator }
    }

    #[must_use]
    pub fn window(&self) -> SelectionWindow {
        self.window
    }

    /// Selects pending items from chronologically ordered `entries`.
    ///
    /// `on_scan` is called once per verified candidate.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Inspect`] if an existing file cannot be examined;
    /// the run should stop, since the storage itself is in trouble.
    #[instrument(
        skip(self, entries, on_scan),
        fields(entries = entries.len(), target_dir = %target_dir.display())
    )]
    pub async fn select(
        &self,
        entries: &[ManifestEntry],
        target_dir: &Path,
        on_scan: &mut (dyn FnMut(ScanMark) + Send),
    ) -> Result<Selection, StorageError> {
        let limit = self.window.limit.unwrap_or(usize::MAX);
        let mut selection = Selection::default();
        let mut skip_remaining = self.window.skip;

        for (index, entry) in entries.iter().rev().enumerate().skip(self.window.offset) {
            if selection.pending.len() >= limit {
                debug!(ordinal = index + 1, "limit reached, stopping scan");
                break;
            }

            let local_path = target_dir.join(local_file_name(entry));
            let state = probe_existing(&local_path, self.validator).await?;
            on_scan(ScanMark::from(state));

            match state {
                ExistingFile::Valid => {
                    selection.existing += 1;
                    continue;
                }
                ExistingFile::Invalid => {
                    debug!(path = %local_path.display(), "existing file failed validation");
                    selection.corrupt += 1;
                }
                ExistingFile::Absent => {}
            }

            if skip_remaining > 0 {
                skip_remaining -= 1;
                selection.skipped += 1;
                continue;
            }

            selection.pending.push(PendingItem {
                source_url: entry.url.clone(),
                local_path,
                ordinal: index + 1,
            });
        }

        info!(
            pending = selection.pending.len(),
            existing = selection.existing,
            corrupt = selection.corrupt,
            skipped = selection.skipped,
            "selection complete"
        );
        Ok(selection)
    }
}
