//! Liveness feedback on stderr: scan dots and the download progress bar.

use std::io::Write;

use indicatif::{ProgressBar, ProgressStyle};
use snapgrab_core::{ItemEvent, ScanMark};

/// Prints one marker per verified candidate while the indexer scans.
pub(crate) struct ScanDots {
    enabled: bool,
    printed: usize,
}

impl ScanDots {
    pub(crate) fn new(enabled: bool) -> Self {
        Self {
            enabled,
            printed: 0,
        }
    }

    pub(crate) fn mark(&mut self, mark: ScanMark) {
        if !self.enabled {
            return;
        }
        let symbol = match mark {
            ScanMark::Missing | ScanMark::Present => ".",
            ScanMark::Corrupt => "x",
        };
        let mut stderr = std::io::stderr();
        let _ = stderr.write_all(symbol.as_bytes());
        let _ = stderr.flush();
        self.printed += 1;
    }

    /// Ends the dot line, if any dots were printed.
    pub(crate) fn finish(&self) {
        if self.enabled && self.printed > 0 {
            eprintln!();
        }
    }
}

/// Builds the per-run progress bar; hidden when progress is disabled.
pub(crate) fn download_bar(enabled: bool, total: usize) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(total as u64);
    bar.set_style(
        ProgressStyle::with_template("[{pos}/{len}] {bar:30} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar
}

/// Applies an orchestrator event to the bar.
pub(crate) fn apply_event(bar: &ProgressBar, event: &ItemEvent<'_>) {
    match event {
        ItemEvent::Starting { item, .. } => bar.set_message(item.file_name()),
        ItemEvent::Finished { .. } => bar.inc(1),
    }
}
