//! Invalid payloads never reach disk; corrupt files on disk get replaced.

use snapgrab_core::select::local_file_name;
use snapgrab_core::{
    ContentValidator, DownloadOrchestrator, FetchOutcome, ManifestIndexer, PendingItem,
    SelectionWindow,
};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::support::fixtures::{
    FlakyResponder, chronological_entries, immediate_fetcher, jpeg_body, png_body,
};
use crate::support::socket_guard::start_mock_server_or_skip;

#[tokio::test]
async fn p0_html_error_page_with_200_is_never_written() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    let temp_dir = TempDir::new().expect("temp dir");

    Mock::given(method("GET"))
        .and(path("/img/1.jpg"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<html><body>Session expired</body></html>"),
        )
        .expect(3)
        .mount(&mock_server)
        .await;

    let item = PendingItem {
        source_url: format!("{}/img/1.jpg", mock_server.uri()),
        local_path: temp_dir.path().join("a.jpg"),
        ordinal: 1,
    };
    let report = immediate_fetcher(3, None).fetch(&item).await;

    assert_eq!(report.outcome, FetchOutcome::InvalidContent);
    assert_eq!(report.attempts, 3);
    assert!(!item.local_path.exists(), "invalid body must not be persisted");
}

#[tokio::test]
async fn p0_truncated_then_complete_body_is_accepted() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    let temp_dir = TempDir::new().expect("temp dir");

    let full = png_body();
    let truncated = full[..full.len() - 4].to_vec();
    let responder =
        FlakyResponder::new(2, ResponseTemplate::new(200).set_body_bytes(truncated), full.clone());
    let counter = responder.counter();

    Mock::given(method("GET"))
        .and(path("/img/1.png"))
        .respond_with(responder)
        .mount(&mock_server)
        .await;

    let item = PendingItem {
        source_url: format!("{}/img/1.png", mock_server.uri()),
        local_path: temp_dir.path().join("a.png"),
        ordinal: 1,
    };
    let report = immediate_fetcher(5, None).fetch(&item).await;

    assert!(report.succeeded(), "{report:?}");
    assert_eq!(report.attempts, 3);
    assert_eq!(counter.load(std::sync::atomic::Ordering::SeqCst), 3);
    assert_eq!(std::fs::read(&item.local_path).expect("read"), full);
}

#[tokio::test]
async fn p0_corrupt_file_on_disk_is_reselected_and_overwritten() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    let temp_dir = TempDir::new().expect("temp dir");
    let entries = chronological_entries(&mock_server.uri(), 1);
    let target = temp_dir.path().join(local_file_name(&entries[0]));
    std::fs::write(&target, b"partial jpeg without end marker").expect("seed corrupt file");

    Mock::given(method("GET"))
        .and(path("/img/1.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(jpeg_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let indexer = ManifestIndexer::new(SelectionWindow::default(), ContentValidator::Signature);
    let selection = indexer
        .select(&entries, temp_dir.path(), &mut |_| {})
        .await
        .expect("select");
    assert_eq!(selection.corrupt, 1);
    assert_eq!(selection.pending.len(), 1);

    let mut fetcher = immediate_fetcher(2, None);
    let summary = DownloadOrchestrator::new(std::time::Duration::ZERO, false)
        .run_all(&selection.pending, &mut fetcher, &mut |_| {})
        .await;

    assert_eq!(summary.downloaded(), 1);
    assert_eq!(std::fs::read(&target).expect("read"), jpeg_body());
}
