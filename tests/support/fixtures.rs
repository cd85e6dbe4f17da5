//! Shared fixtures: image bodies, manifests on disk, and scripted HTTP responders.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use snapgrab_core::validate::{JPEG_EOI, PNG_IEND};
use snapgrab_core::{
    ContentValidator, HttpClient, ManifestDocument, ManifestEntry, RetryPolicy, RetryingFetcher,
    request_headers,
};
use wiremock::{Request, Respond, ResponseTemplate};

/// A small body that passes signature validation as a JPEG.
pub fn jpeg_body() -> Vec<u8> {
    let mut body = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
    body.extend_from_slice(b"JFIF-fixture-payload");
    body.extend_from_slice(&JPEG_EOI);
    body
}

/// A small body that passes signature validation as a PNG.
pub fn png_body() -> Vec<u8> {
    let mut body = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    body.extend_from_slice(b"png-fixture-payload");
    body.extend_from_slice(&PNG_IEND);
    body
}

/// `count` entries in chronological order; entry `i` (1-based) is `{base}/img/{i}.jpg`
/// with a timestamp `i` minutes after 2024-03-01 00:00, so every entry gets its
/// own local file name.
pub fn chronological_entries(base: &str, count: usize) -> Vec<ManifestEntry> {
    (1..=count)
        .map(|i| {
            let (day, hour, minute) = (1 + i / 1440, i / 60 % 24, i % 60);
            ManifestEntry::new(
                format!("{base}/img/{i}.jpg"),
                format!("2024-03-{day:02} {hour:02}:{minute:02}:00"),
            )
        })
        .collect()
}

/// Writes a manifest for `entries` into `dir/manifest.json` and returns the path.
pub async fn write_manifest(dir: &Path, entries: Vec<ManifestEntry>) -> PathBuf {
    let path = dir.join("manifest.json");
    ManifestDocument::new(entries)
        .save(&path)
        .await
        .expect("write manifest fixture");
    path
}

/// A fetcher that retries immediately, for tests that only care about attempt counts.
pub fn immediate_fetcher(max_attempts: u32, token: Option<&str>) -> RetryingFetcher {
    let headers = request_headers(token, "https://gallery.example/").expect("fixture headers");
    let client = HttpClient::new(Duration::from_secs(5), headers).expect("fixture client");
    RetryingFetcher::new(
        client,
        ContentValidator::Signature,
        RetryPolicy::immediate(max_attempts),
    )
}

/// Responds with `failure` for the first `fail_count` requests, then 200 with `success_body`.
pub struct FlakyResponder {
    request_count: Arc<AtomicUsize>,
    fail_count: usize,
    failure: ResponseTemplate,
    success_body: Vec<u8>,
}

impl FlakyResponder {
    pub fn new(fail_count: usize, failure: ResponseTemplate, success_body: Vec<u8>) -> Self {
        Self {
            request_count: Arc::new(AtomicUsize::new(0)),
            fail_count,
            failure,
            success_body,
        }
    }

    /// Handle to the number of requests seen so far.
    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.request_count)
    }
}

impl Respond for FlakyResponder {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let n = self.request_count.fetch_add(1, Ordering::SeqCst);
        if n < self.fail_count {
            self.failure.clone()
        } else {
            ResponseTemplate::new(200).set_body_bytes(self.success_body.clone())
        }
    }
}
