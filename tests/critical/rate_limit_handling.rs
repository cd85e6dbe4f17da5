//! Throttling and stale-token statuses are retried and reported distinctly.

use std::time::Duration;

use snapgrab_core::{
    ContentValidator, FailureType, FetchOutcome, HttpClient, PendingItem, RetryPolicy,
    RetryingFetcher, request_headers,
};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::support::fixtures::{FlakyResponder, immediate_fetcher, jpeg_body};
use crate::support::socket_guard::start_mock_server_or_skip;

#[test]
fn p0_suspect_statuses_classify_as_rate_limited() {
    for status in [403, 429, 520] {
        assert_eq!(
            FetchOutcome::HttpStatus(status).failure_type(),
            Some(FailureType::RateLimited),
            "status {status}"
        );
    }
    assert_eq!(
        FetchOutcome::HttpStatus(503).failure_type(),
        Some(FailureType::Transient)
    );
}

#[tokio::test]
async fn p0_forbidden_is_retried_and_counted() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    let temp_dir = TempDir::new().expect("temp dir");

    Mock::given(method("GET"))
        .and(path("/img/a.jpg"))
        .respond_with(ResponseTemplate::new(403))
        .expect(3)
        .mount(&mock_server)
        .await;

    let item = PendingItem {
        source_url: format!("{}/img/a.jpg", mock_server.uri()),
        local_path: temp_dir.path().join("a.jpg"),
        ordinal: 1,
    };
    let report = immediate_fetcher(3, None).fetch(&item).await;

    assert_eq!(report.attempts, 3);
    assert_eq!(report.rate_limited, 3);
    assert_eq!(report.outcome, FetchOutcome::HttpStatus(403));
}

#[tokio::test]
async fn p1_rate_limited_retry_waits_the_backoff_cap() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    let temp_dir = TempDir::new().expect("temp dir");

    Mock::given(method("GET"))
        .and(path("/img/a.jpg"))
        .respond_with(FlakyResponder::new(
            1,
            ResponseTemplate::new(429),
            jpeg_body(),
        ))
        .mount(&mock_server)
        .await;

    let headers = request_headers(None, "").expect("headers");
    let client = HttpClient::new(Duration::from_secs(5), headers).expect("client");
    let policy = RetryPolicy::new(3, Duration::ZERO, Duration::from_millis(300), 2.0);
    let mut fetcher = RetryingFetcher::new(client, ContentValidator::Signature, policy);

    let item = PendingItem {
        source_url: format!("{}/img/a.jpg", mock_server.uri()),
        local_path: temp_dir.path().join("a.jpg"),
        ordinal: 1,
    };
    let started = std::time::Instant::now();
    let report = fetcher.fetch(&item).await;

    assert!(report.succeeded());
    assert_eq!(report.rate_limited, 1);
    assert!(
        started.elapsed() >= Duration::from_millis(300),
        "rate-limited retry should wait at least the cap"
    );
}
