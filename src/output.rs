//! CLI output formatting and display helpers.

use std::path::Path;

use snapgrab_core::{RunSummary, Selection};

use crate::ProcessExit;

/// Returns terminal width from COLUMNS, or 80 if unset/invalid.
pub fn terminal_width() -> usize {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|width| *width >= 20)
        .unwrap_or(80)
}

/// Truncates text to at most `width` chars, appending ellipsis if truncated.
pub fn truncate_to_width(text: &str, width: usize) -> String {
    let text_len = text.chars().count();
    if text_len <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    if width == 1 {
        return "…".to_string();
    }

    let mut output: String = text.chars().take(width - 1).collect();
    output.push('…');
    output
}

/// Final result headline.
pub(crate) fn result_line(exit: ProcessExit, dry_run: bool) -> &'static str {
    match (exit, dry_run) {
        (_, true) => "Dry run complete: nothing was downloaded",
        (ProcessExit::Success, false) => "All selected items downloaded",
        (ProcessExit::Partial, false) => "Finished with failures: run again to retry them",
        (ProcessExit::Failure, false) => "Every selected item failed",
    }
}

/// Lines of the end-of-run summary.
pub(crate) fn render_summary_lines(
    output_dir: &Path,
    selection: &Selection,
    summary: &RunSummary,
    exit: ProcessExit,
    width: usize,
) -> Vec<String> {
    let mut lines = vec![
        format!("Output directory: {}", output_dir.display()),
        format!("Already present:  {}", selection.existing),
    ];
    if selection.corrupt > 0 {
        lines.push(format!("Replaced corrupt: {}", selection.corrupt));
    }
    if selection.skipped > 0 {
        lines.push(format!("Skipped:          {}", selection.skipped));
    }
    let downloaded_label = if summary.is_dry_run() {
        "Would download:  "
    } else {
        "Downloaded:      "
    };
    lines.push(format!("{downloaded_label} {}", summary.downloaded()));
    lines.push(format!("Failed:           {}", summary.failed()));

    for failure in summary.failures() {
        let line = format!(
            "  #{} after {} attempt(s): {} ({})",
            failure.ordinal, failure.attempts, failure.last_outcome, failure.source_url
        );
        lines.push(truncate_to_width(&line, width));
    }

    lines.push(result_line(exit, summary.is_dry_run()).to_string());
    lines
}

/// Prints the end-of-run summary to stdout.
pub(crate) fn print_run_summary(
    output_dir: &Path,
    selection: &Selection,
    summary: &RunSummary,
    exit: ProcessExit,
) {
    for line in render_summary_lines(output_dir, selection, summary, exit, terminal_width()) {
        println!("{line}");
    }
}
