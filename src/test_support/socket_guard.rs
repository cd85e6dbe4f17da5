use std::net::TcpListener;

use wiremock::MockServer;

/// Starts a mock server unless localhost cannot be bound here.
///
/// Skipping panics instead when `SNAPGRAB_REQUIRE_SOCKET_TESTS` is `1`/`true`/`yes`.
#[track_caller]
pub fn start_mock_server_or_skip() -> impl std::future::Future<Output = Option<MockServer>> {
    let skip = TcpListener::bind("127.0.0.1:0").is_err() && {
        let at = std::panic::Location::caller();
        let required = std::env::var("SNAPGRAB_REQUIRE_SOCKET_TESTS")
            .is_ok_and(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"));
        assert!(
            !required,
            "[socket-bound-test] {}:{} cannot bind localhost",
            at.file(),
            at.line()
        );
        eprintln!(
            "[socket-bound-test] {}:{} cannot bind localhost; skipping",
            at.file(),
            at.line()
        );
        true
    };
    async move {
        if skip {
            None
        } else {
            Some(MockServer::start().await)
        }
    }
}
