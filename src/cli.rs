//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;
use snapgrab_core::ValidationMode;

/// Download every image listed in a manifest, resuming where the last run stopped.
///
/// Entries are processed newest-first, one at a time, with a pause between
/// requests. Files already present and complete are left alone.
#[derive(Parser, Debug)]
#[command(name = "snapgrab")]
#[command(author, version, about)]
pub struct Args {
    /// Manifest file to read (and to write with --save-manifest) [default: <OUTPUT_DIR>/manifest.json]
    #[arg(short = 'm', long, value_name = "FILE")]
    pub manifest: Option<PathBuf>,

    /// Fetch the manifest from this endpoint instead of reading the file
    #[arg(long, value_name = "URL")]
    pub manifest_url: Option<String>,

    /// Save the fetched manifest, including the token, to the manifest path
    #[arg(long, requires = "manifest_url")]
    pub save_manifest: bool,

    /// Auth token sent as a cookie with every request
    #[arg(long, env = "SNAPGRAB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Directory the images are written to [default: .]
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Attempts per item before giving up on it [default: 100]
    #[arg(short = 'r', long, value_parser = clap::value_parser!(u32).range(1..=10_000))]
    pub max_retries: Option<u32>,

    /// Per-request timeout in seconds, for connect and read [default: 30]
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub timeout: Option<u64>,

    /// Pause between items in milliseconds [default: 1000]
    #[arg(short = 'd', long, value_name = "MS", value_parser = clap::value_parser!(u64).range(0..=600_000))]
    pub delay: Option<u64>,

    /// Newest-first entries to ignore entirely
    #[arg(long, default_value_t = 0)]
    pub offset: usize,

    /// Entries still needing download to pass over before selecting
    #[arg(long, default_value_t = 0)]
    pub skip: usize,

    /// Maximum number of items to download in this run
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// How downloaded content is judged complete: signature or min-size [default: signature]
    #[arg(long, value_name = "MODE")]
    pub validation: Option<ValidationMode>,

    /// Minimum byte count for the min-size validation policy [default: 10240]
    #[arg(long, value_name = "BYTES", value_parser = clap::value_parser!(u64).range(1..))]
    pub min_size: Option<u64>,

    /// Referer header [default: origin of the manifest URL or first entry]
    #[arg(long, value_name = "URL")]
    pub referer: Option<String>,

    /// List what would be downloaded without fetching anything
    #[arg(long)]
    pub dry_run: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored log output
    #[arg(long)]
    pub no_color: bool,
}
