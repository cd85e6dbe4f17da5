//! HTTP client wrapper for fetching images into memory.
//!
//! This module provides the `HttpClient` struct which holds one configured
//! `reqwest` client for the whole run: the same timeout for connect and read,
//! gzip decoding, and the run's fixed header set.

use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument};
use url::Url;

use super::error::DownloadError;

/// HTTP client for sequential image downloads.
///
/// Created once per run and reused for every request, taking advantage of
/// connection pooling.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a client with a single timeout for connect and read, sending
    /// `headers` with every request.
    ///
    /// The read timeout bounds each wait for data, not the whole transfer, so
    /// a large image on a slow but live connection still completes.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Client`] if the underlying client cannot be built
    /// (for example when the TLS backend fails to initialize).
    #[instrument(level = "debug", skip(headers), fields(timeout_secs = timeout.as_secs()))]
    pub fn new(timeout: Duration, headers: HeaderMap) -> Result<Self, DownloadError> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .gzip(true)
            .default_headers(headers)
            .build()
            .map_err(|source| DownloadError::Client { source })?;
        Ok(Self { client })
    }

    /// Issues a GET and reads the full body into `buffer`.
    ///
    /// `buffer` is cleared first; on error its content is unspecified. Only an
    /// HTTP 200 response is read, any other status is returned as
    /// [`DownloadError::HttpStatus`] without touching the body.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::InvalidUrl`], [`DownloadError::Timeout`],
    /// [`DownloadError::Network`] or [`DownloadError::HttpStatus`].
    #[instrument(level = "debug", skip(self, buffer), fields(url = %url))]
    pub async fn get_into(&self, url: &str, buffer: &mut Vec<u8>) -> Result<u64, DownloadError> {
        buffer.clear();
        let parsed = Url::parse(url).map_err(|_| DownloadError::invalid_url(url))?;

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| DownloadError::network(url, e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(DownloadError::http_status(url, status.as_u16()));
        }

        if let Some(expected) = response.content_length() {
            buffer.reserve(usize::try_from(expected).unwrap_or(0));
        }

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| DownloadError::network(url, e))?;
            buffer.extend_from_slice(&chunk);
        }

        debug!(bytes = buffer.len(), "response body received");
        Ok(buffer.len() as u64)
    }

    /// Returns a reference to the underlying reqwest client.
    #[must_use]
    pub fn inner(&self) -> &Client {
        &self.client
    }
}
