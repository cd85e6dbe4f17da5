//! Skips wiremock-backed tests on hosts that forbid binding localhost.
//!
//! Set `SNAPGRAB_REQUIRE_SOCKET_TESTS=1` in CI so a missing socket fails the
//! test instead of silently skipping it.

use std::net::TcpListener;
use std::panic::Location;

use wiremock::MockServer;

const REQUIRE_ENV: &str = "SNAPGRAB_REQUIRE_SOCKET_TESTS";

fn sockets_required() -> bool {
    std::env::var(REQUIRE_ENV)
        .is_ok_and(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
}

/// `true` when localhost cannot be bound and skipping is allowed.
#[track_caller]
pub fn cannot_bind_localhost() -> bool {
    if TcpListener::bind("127.0.0.1:0").is_ok() {
        return false;
    }
    let at = Location::caller();
    let note = format!(
        "[socket-bound-test] {}:{} needs a localhost listener and none could be bound",
        at.file(),
        at.line()
    );
    assert!(!sockets_required(), "{note}; {REQUIRE_ENV} is set");
    eprintln!("{note}; skipping");
    true
}

/// Starts a mock server, or returns `None` when the test should be skipped.
pub async fn start_mock_server_or_skip() -> Option<MockServer> {
    if cannot_bind_localhost() {
        None
    } else {
        Some(MockServer::start().await)
    }
}

/// Return value for a skipped test, whatever its signature.
pub trait SkipValue {
    fn skipped() -> Self;
}

impl SkipValue for () {
    fn skipped() -> Self {}
}

impl<E> SkipValue for Result<(), E> {
    fn skipped() -> Self {
        Ok(())
    }
}

pub fn socket_skip_return<T: SkipValue>() -> T {
    T::skipped()
}
