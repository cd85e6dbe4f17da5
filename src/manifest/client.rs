//! Retrieval of a manifest from the remote listing endpoint.

use reqwest::StatusCode;
use reqwest::header::{ACCEPT, HeaderValue};
use tracing::{debug, info, instrument};

use super::{ManifestDocument, ManifestError};
use crate::download::HttpClient;

/// Fetches manifests with the run's shared HTTP client.
///
/// The endpoint is queried with a `POST` carrying an empty JSON object; the
/// auth token travels in the cookie header configured on the client.
#[derive(Debug, Clone)]
pub struct ManifestClient {
    http: HttpClient,
}

impl ManifestClient {
    #[must_use]
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Requests the manifest at `url`.
    ///
    /// When `token` is given it is stored in the returned document, so a
    /// saved manifest can be reused later without passing the token again.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Fetch`] on transport failure,
    /// [`ManifestError::FetchStatus`] for any status other than 200, and
    /// [`ManifestError::Parse`] if the body is not a manifest.
    #[instrument(skip(self, token), fields(url = %url, has_token = token.is_some()))]
    pub async fn fetch(
        &self,
        url: &str,
        token: Option<&str>,
    ) -> Result<ManifestDocument, ManifestError> {
        let response = self
            .http
            .inner()
            .post(url)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .json(&serde_json::Map::new())
            .send()
            .await
            .map_err(|e| ManifestError::fetch(url, e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ManifestError::fetch_status(url, status.as_u16()));
        }

        let text = response
            .text()
            .await
            .map_err(|e| ManifestError::fetch(url, e))?;
        debug!(bytes = text.len(), "manifest body received");

        let mut document = ManifestDocument::from_json_str(&text, url)?;
        if let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) {
            document = document.with_token(token);
        }
        info!(
            entries = document.entries().len(),
            total = document.total(),
            "manifest fetched"
        );
        Ok(document)
    }
}
