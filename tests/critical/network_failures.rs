//! Transient failures consume the per-item budget and never abort the batch.

use std::time::Duration;

use snapgrab_core::{
    ContentValidator, DownloadOrchestrator, FetchOutcome, HttpClient, PendingItem, RetryPolicy,
    RetryingFetcher, request_headers,
};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::support::fixtures::{FlakyResponder, immediate_fetcher, jpeg_body};
use crate::support::socket_guard::start_mock_server_or_skip;

fn item(base: &str, name: &str, dir: &TempDir, ordinal: usize) -> PendingItem {
    PendingItem {
        source_url: format!("{base}/img/{name}"),
        local_path: dir.path().join(name),
        ordinal,
    }
}

#[tokio::test]
async fn p0_persistent_server_error_exhausts_exactly_max_attempts() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    let temp_dir = TempDir::new().expect("temp dir");

    Mock::given(method("GET"))
        .and(path("/img/a.jpg"))
        .respond_with(ResponseTemplate::new(500))
        .expect(7)
        .mount(&mock_server)
        .await;

    let item = item(&mock_server.uri(), "a.jpg", &temp_dir, 1);
    let report = immediate_fetcher(7, None).fetch(&item).await;

    assert_eq!(report.attempts, 7);
    assert_eq!(report.outcome, FetchOutcome::HttpStatus(500));
    assert!(!item.local_path.exists());
}

#[tokio::test]
async fn p0_flaky_server_recovers_within_budget() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    let temp_dir = TempDir::new().expect("temp dir");

    Mock::given(method("GET"))
        .and(path("/img/a.jpg"))
        .respond_with(FlakyResponder::new(
            3,
            ResponseTemplate::new(502),
            jpeg_body(),
        ))
        .mount(&mock_server)
        .await;

    let item = item(&mock_server.uri(), "a.jpg", &temp_dir, 1);
    let report = immediate_fetcher(4, None).fetch(&item).await;

    assert!(report.succeeded());
    assert_eq!(report.attempts, 4);
}

#[tokio::test]
async fn p0_timeouts_are_retried_as_transient() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    let temp_dir = TempDir::new().expect("temp dir");

    Mock::given(method("GET"))
        .and(path("/img/slow.jpg"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(jpeg_body())
                .set_delay(Duration::from_secs(3)),
        )
        .expect(2)
        .mount(&mock_server)
        .await;

    let headers = request_headers(None, "").expect("headers");
    let client = HttpClient::new(Duration::from_millis(250), headers).expect("client");
    let mut fetcher = RetryingFetcher::new(
        client,
        ContentValidator::Signature,
        RetryPolicy::immediate(2),
    );

    let item = item(&mock_server.uri(), "slow.jpg", &temp_dir, 1);
    let report = fetcher.fetch(&item).await;

    assert_eq!(report.attempts, 2);
    assert!(
        matches!(report.outcome, FetchOutcome::TransientNetwork(_)),
        "expected transient network outcome, got {:?}",
        report.outcome
    );
}

#[tokio::test]
async fn p0_failed_item_does_not_stop_the_batch() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    let temp_dir = TempDir::new().expect("temp dir");

    Mock::given(method("GET"))
        .and(path("/img/bad.jpg"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/img/good.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(jpeg_body()))
        .mount(&mock_server)
        .await;

    let items = vec![
        item(&mock_server.uri(), "bad.jpg", &temp_dir, 1),
        item(&mock_server.uri(), "good.jpg", &temp_dir, 2),
    ];
    let mut fetcher = immediate_fetcher(2, None);
    let summary = DownloadOrchestrator::new(Duration::ZERO, false)
        .run_all(&items, &mut fetcher, &mut |_| {})
        .await;

    assert_eq!(summary.downloaded(), 1);
    assert_eq!(summary.failed(), 1);
    assert_eq!(summary.failures()[0].ordinal, 1);
    assert_eq!(summary.failures()[0].attempts, 2);
    assert!(temp_dir.path().join("good.jpg").exists());
    assert!(!temp_dir.path().join("bad.jpg").exists());
}

#[tokio::test]
async fn p0_unreachable_host_is_transient() {
    let temp_dir = TempDir::new().expect("temp dir");
    // Port 9 (discard) on localhost is expected to refuse connections.
    let item = item("http://127.0.0.1:9", "x.jpg", &temp_dir, 1);

    let report = immediate_fetcher(2, None).fetch(&item).await;

    assert_eq!(report.attempts, 2);
    assert!(!report.succeeded());
    assert!(!item.local_path.exists());
}
