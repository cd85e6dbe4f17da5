//! The auth token travels only in the cookie header and never shows up in errors.

use snapgrab_core::download::TOKEN_COOKIE_NAME;
use snapgrab_core::{FetchOutcome, PendingItem, request_headers};
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::support::fixtures::{immediate_fetcher, jpeg_body};
use crate::support::socket_guard::start_mock_server_or_skip;

const SECRET: &str = "s3cr3t-token-value";

#[test]
fn p0_cookie_header_is_marked_sensitive() {
    let headers = request_headers(Some(SECRET), "https://gallery.example/").expect("headers");
    let cookie = headers.get("cookie").expect("cookie header");

    assert!(cookie.is_sensitive());
    assert!(!format!("{headers:?}").contains(SECRET));
    assert_eq!(cookie, &format!("{TOKEN_COOKIE_NAME}={SECRET}"));
}

#[tokio::test]
async fn p0_token_is_sent_with_image_requests() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    let temp_dir = TempDir::new().expect("temp dir");

    Mock::given(method("GET"))
        .and(path("/img/a.jpg"))
        .and(header("cookie", format!("token={SECRET}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(jpeg_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let item = PendingItem {
        source_url: format!("{}/img/a.jpg", mock_server.uri()),
        local_path: temp_dir.path().join("a.jpg"),
        ordinal: 1,
    };
    let report = immediate_fetcher(1, Some(SECRET)).fetch(&item).await;

    assert!(report.succeeded(), "{report:?}");
}

#[tokio::test]
async fn p0_failure_outcomes_do_not_echo_the_token() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    let temp_dir = TempDir::new().expect("temp dir");

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&mock_server)
        .await;

    let item = PendingItem {
        source_url: format!("{}/img/a.jpg", mock_server.uri()),
        local_path: temp_dir.path().join("a.jpg"),
        ordinal: 1,
    };
    let report = immediate_fetcher(1, Some(SECRET)).fetch(&item).await;

    assert_eq!(report.outcome, FetchOutcome::HttpStatus(403));
    assert!(!report.outcome.to_string().contains(SECRET));
    assert!(!format!("{report:?}").contains(SECRET));
}
