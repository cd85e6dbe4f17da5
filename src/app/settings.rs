//! Merges CLI flags, the config file, and built-in defaults into one run configuration.
//!
//! Precedence: CLI flag > config file > built-in default.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, bail};
use snapgrab_core::download::{DEFAULT_ITEM_DELAY, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_SECS};
use snapgrab_core::validate::DEFAULT_MIN_SIZE_BYTES;
use snapgrab_core::{ContentValidator, SelectionWindow, ValidationMode};
use url::Url;

use crate::app_config::FileConfig;
use crate::cli::Args;

/// Manifest file name used when no path is configured.
pub(crate) const DEFAULT_MANIFEST_FILE_NAME: &str = "manifest.json";

/// Where the manifest comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ManifestSource {
    /// Read from the manifest path.
    File,
    /// Fetched from a remote endpoint, optionally saved to the manifest path.
    Remote { url: String, save: bool },
}

/// Everything a run needs, resolved and validated.
#[derive(Debug, Clone)]
pub(crate) struct RunSettings {
    pub(crate) output_dir: PathBuf,
    pub(crate) manifest_path: PathBuf,
    pub(crate) manifest_source: ManifestSource,
    pub(crate) token: Option<String>,
    pub(crate) referer: Option<String>,
    pub(crate) max_retries: u32,
    pub(crate) timeout: Duration,
    pub(crate) item_delay: Duration,
    pub(crate) window: SelectionWindow,
    pub(crate) validator: ContentValidator,
    pub(crate) dry_run: bool,
    pub(crate) verbose: u8,
    pub(crate) quiet: bool,
    pub(crate) no_color: bool,
}

impl RunSettings {
    /// Resolves `args` against an optional config file.
    pub(crate) fn resolve(args: Args, file: Option<&FileConfig>) -> Result<Self> {
        let file = file.cloned().unwrap_or_default();

        let output_dir = args
            .output_dir
            .or(file.output_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        let manifest_path = args
            .manifest
            .or(file.manifest)
            .unwrap_or_else(|| output_dir.join(DEFAULT_MANIFEST_FILE_NAME));

        let manifest_source = match args.manifest_url {
            Some(url) => {
                if Url::parse(&url).is_err() {
                    bail!("Invalid manifest URL: '{url}'");
                }
                ManifestSource::Remote {
                    url,
                    save: args.save_manifest,
                }
            }
            None => ManifestSource::File,
        };

        let mode = args
            .validation
            .or(file.validation)
            .unwrap_or(ValidationMode::Signature);
        let min_size = args
            .min_size
            .or(file.min_size_bytes)
            .unwrap_or(DEFAULT_MIN_SIZE_BYTES);

        Ok(Self {
            output_dir,
            manifest_path,
            manifest_source,
            token: args
                .token
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
            referer: args.referer.or(file.referer),
            max_retries: args
                .max_retries
                .or(file.max_retries)
                .unwrap_or(DEFAULT_MAX_RETRIES),
            timeout: Duration::from_secs(
                args.timeout
                    .or(file.timeout_secs)
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
            item_delay: args
                .delay
                .or(file.delay_ms)
                .map_or(DEFAULT_ITEM_DELAY, Duration::from_millis),
            window: SelectionWindow {
                offset: args.offset,
                skip: args.skip,
                limit: args.limit,
            },
            validator: mode.validator(min_size),
            dry_run: args.dry_run,
            verbose: args.verbose,
            quiet: args.quiet,
            no_color: args.no_color,
        })
    }

    /// Default tracing level. Priority: quiet flag > verbose count > info.
    pub(crate) fn default_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        }
    }

    /// Referer to send: configured value, else the origin of `fallback_url`.
    pub(crate) fn referer_or_origin_of(&self, fallback_url: Option<&str>) -> String {
        if let Some(referer) = &self.referer {
            return referer.clone();
        }
        fallback_url.and_then(origin_referer).unwrap_or_default()
    }
}

/// `scheme://host[:port]/` of `url`, if it has one.
pub(crate) fn origin_referer(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let origin = parsed.origin();
    if !origin.is_tuple() {
        return None;
    }
    Some(format!("{}/", origin.ascii_serialization()))
}
