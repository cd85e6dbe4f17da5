//! Constants for the download module (timeouts, pacing, retry budget).

use std::time::Duration;

/// Default per-request timeout, applied to connect and read alike (30 seconds).
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default delay inserted between sequential items (1 second).
pub const DEFAULT_ITEM_DELAY: Duration = Duration::from_millis(1000);

/// Default number of attempts per item before it is abandoned.
pub const DEFAULT_MAX_RETRIES: u32 = 100;

/// HTTP statuses that suggest throttling or an authentication problem.
///
/// 520 is the "origin error" some CDNs return when the upstream refuses a client.
pub const RATE_LIMIT_SUSPECT_STATUSES: &[u16] = &[403, 429, 520];
