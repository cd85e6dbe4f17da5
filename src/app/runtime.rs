use std::io::{self, IsTerminal};

use clap::Parser;
use snapgrab_core::{
    DownloadOrchestrator, HttpClient, ManifestClient, ManifestDocument, ManifestError,
    ManifestIndexer, RetryPolicy, RetryingFetcher, ensure_target_dir, inspect_target_dir,
    request_headers,
};
use tracing::{debug, info, warn};

use crate::app::exit_handler::{self, FatalError};
use crate::app::settings::{ManifestSource, RunSettings};
use crate::app::{progress, terminal};
use crate::cli::Args;
use crate::{ProcessExit, app_config, output};

pub(crate) async fn run_snapgrab() -> Result<ProcessExit, FatalError> {
    let args = Args::parse();

    let loaded = app_config::load_default_file_config().map_err(FatalError::Config)?;
    let settings =
        RunSettings::resolve(args, loaded.config.as_ref()).map_err(FatalError::Config)?;

    terminal::init_tracing(
        settings.default_log_level(),
        terminal::is_no_color_requested(&settings),
    );
    if let Some(path) = loaded.path.as_deref().filter(|_| loaded.config.is_some()) {
        debug!(path = %path.display(), "Loaded config file");
    }
    debug!(
        output_dir = %settings.output_dir.display(),
        manifest = %settings.manifest_path.display(),
        max_retries = settings.max_retries,
        timeout_secs = settings.timeout.as_secs(),
        delay_ms = settings.item_delay.as_millis(),
        window = ?settings.window,
        validator = ?settings.validator,
        has_token = settings.token.is_some(),
        dry_run = settings.dry_run,
        "Run settings resolved"
    );
    info!("Snapgrab starting");

    if settings.dry_run {
        inspect_target_dir(&settings.output_dir).await?;
    } else {
        ensure_target_dir(&settings.output_dir).await?;
    }

    let (manifest, client) = obtain_manifest(&settings).await?;
    info!(
        entries = manifest.entries().len(),
        total = manifest.total(),
        "Manifest ready"
    );

    let show_progress = terminal::should_show_progress(
        io::stderr().is_terminal(),
        settings.quiet,
        terminal::is_dumb_terminal(),
    );

    let indexer = ManifestIndexer::new(settings.window, settings.validator);
    let mut dots = progress::ScanDots::new(show_progress);
    let selection = indexer
        .select(manifest.entries(), &settings.output_dir, &mut |mark| {
            dots.mark(mark);
        })
        .await;
    dots.finish();
    let selection = selection?;

    info!(
        pending = selection.pending.len(),
        existing = selection.existing,
        corrupt = selection.corrupt,
        skipped = selection.skipped,
        "Selection complete"
    );

    let mut fetcher = RetryingFetcher::new(
        client,
        settings.validator,
        RetryPolicy::with_max_attempts(settings.max_retries),
    );
    let orchestrator = DownloadOrchestrator::new(settings.item_delay, settings.dry_run);

    let bar = progress::download_bar(show_progress, selection.pending.len());
    let summary = orchestrator
        .run_all(&selection.pending, &mut fetcher, &mut |event| {
            progress::apply_event(&bar, &event);
        })
        .await;
    bar.finish_and_clear();

    if summary.rate_limited() > 0 {
        warn!(
            rate_limited = summary.rate_limited(),
            "Some requests were refused; the token may have expired or the service is throttling"
        );
    }

    let exit = exit_handler::determine_exit_outcome(summary.downloaded(), summary.failed());
    if !settings.quiet {
        output::print_run_summary(&settings.output_dir, &selection, &summary, exit);
    }
    Ok(exit)
}

/// Loads or fetches the manifest and builds the HTTP client used for images.
async fn obtain_manifest(
    settings: &RunSettings,
) -> Result<(ManifestDocument, HttpClient), FatalError> {
    match &settings.manifest_source {
        ManifestSource::File => {
            let manifest = ManifestDocument::load(&settings.manifest_path).await?;
            let token = settings.token.as_deref().or(manifest.token());
            let first_url = manifest.entries().first().map(|e| e.url.as_str());
            let client = build_client(settings, token, first_url)?;
            Ok((manifest, client))
        }
        ManifestSource::Remote { url, save } => {
            let stored = if settings.token.is_none() {
                stored_token(settings).await
            } else {
                None
            };
            let token = settings.token.clone().or(stored);
            let client = build_client(settings, token.as_deref(), Some(url.as_str()))?;
            let manifest = ManifestClient::new(client.clone())
                .fetch(url, token.as_deref())
                .await?;
            if *save {
                if settings.dry_run {
                    info!(path = %settings.manifest_path.display(), "Dry run: manifest not saved");
                } else {
                    manifest.save(&settings.manifest_path).await?;
                    info!(path = %settings.manifest_path.display(), "Manifest saved");
                }
            }
            Ok((manifest, client))
        }
    }
}

fn build_client(
    settings: &RunSettings,
    token: Option<&str>,
    referer_source: Option<&str>,
) -> Result<HttpClient, FatalError> {
    let referer = settings.referer_or_origin_of(referer_source);
    let headers =
        request_headers(token, &referer).map_err(|e| FatalError::Config(e.into()))?;
    HttpClient::new(settings.timeout, headers).map_err(|e| FatalError::Config(e.into()))
}

/// Token saved in an existing manifest file, used when none was passed.
async fn stored_token(settings: &RunSettings) -> Option<String> {
    match ManifestDocument::load(&settings.manifest_path).await {
        Ok(previous) => previous.token().map(str::to_string),
        Err(ManifestError::Read { .. }) => None,
        Err(e) => {
            debug!(error = %e, "Ignoring unreadable stored manifest");
            None
        }
    }
}
