//! Request headers attached to every manifest and image request.
//!
//! The remote service expects browser-like requests; the header set is a pure
//! function of the auth token and the referer so every request of a run looks
//! the same.

use reqwest::header::{ACCEPT, COOKIE, HeaderMap, HeaderValue, REFERER, USER_AGENT};

use super::DownloadError;

/// Browser User-Agent sent with every request.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Accept header preferring the image formats the validator recognizes.
pub const IMAGE_ACCEPT: &str = "image/avif,image/webp,image/png,image/jpeg,image/*,*/*;q=0.8";

/// Cookie name carrying the auth token.
pub const TOKEN_COOKIE_NAME: &str = "token";

/// Builds the fixed header set for a run.
///
/// A blank `referer` leaves the header out.
///
/// # Errors
///
/// Returns [`DownloadError::InvalidHeader`] if the token or referer contains
/// bytes that cannot appear in an HTTP header.
pub fn request_headers(token: Option<&str>, referer: &str) -> Result<HeaderMap, DownloadError> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(ACCEPT, HeaderValue::from_static(IMAGE_ACCEPT));
    let referer = referer.trim();
    if !referer.is_empty() {
        headers.insert(
            REFERER,
            HeaderValue::from_str(referer)
                .map_err(|_| DownloadError::InvalidHeader { name: "referer" })?,
        );
    }

    if let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) {
        let mut cookie = HeaderValue::from_str(&format!("{TOKEN_COOKIE_NAME}={token}"))
            .map_err(|_| DownloadError::InvalidHeader { name: "cookie" })?;
        cookie.set_sensitive(true);
        headers.insert(COOKIE, cookie);
    }

    Ok(headers)
}
