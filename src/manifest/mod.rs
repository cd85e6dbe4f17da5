//! Manifest documents listing the remote images of a collection.
//!
//! A manifest is a JSON document shaped like:
//!
//! ```json
//! {
//!   "result": {
//!     "total": 2,
//!     "list": [
//!       { "url": "https://cdn.example.com/a.jpg", "timestamp": "2023-05-01 12:00:00" },
//!       { "url": "https://cdn.example.com/b.png", "timestamp": "2023-05-02 08:30:15" }
//!     ]
//!   },
//!   "token": "optional stored credential"
//! }
//! ```
//!
//! Entries are delivered oldest-first. Fields other than `url` and
//! `timestamp` are ignored.

mod client;
mod error;

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

pub use client::ManifestClient;
pub use error::ManifestError;

/// One remote image listed by the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Source URL of the image.
    pub url: String,
    /// Capture timestamp, used to derive the local filename.
    pub timestamp: String,
}

impl ManifestEntry {
    #[must_use]
    pub fn new(url: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timestamp: timestamp.into(),
        }
    }
}

/// The `result` object of a manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestResult {
    /// Total count reported by the remote service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    /// Entries in chronological order.
    #[serde(default)]
    pub list: Vec<ManifestEntry>,
}

/// A parsed manifest, optionally carrying the credential it was fetched with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestDocument {
    pub result: ManifestResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
}

impl ManifestDocument {
    /// Creates a document from chronologically ordered entries.
    #[must_use]
    pub fn new(entries: Vec<ManifestEntry>) -> Self {
        Self {
            result: ManifestResult {
                total: Some(entries.len() as u64),
                list: entries,
            },
            token: None,
        }
    }

    /// Parses a manifest from JSON text. `origin` names the source in errors.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Parse`] if the text is not a manifest document.
    pub fn from_json_str(text: &str, origin: &str) -> Result<Self, ManifestError> {
        serde_json::from_str(text).map_err(|e| ManifestError::parse(origin, e))
    }

    /// Reads and parses a manifest file.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Read`] if the file cannot be read and
    /// [`ManifestError::Parse`] if its content is malformed.
    #[instrument(fields(path = %path.display()))]
    pub async fn load(path: &Path) -> Result<Self, ManifestError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ManifestError::read(path, e))?;
        let document = Self::from_json_str(&text, &path.display().to_string())?;
        debug!(
            entries = document.entries().len(),
            has_token = document.token.is_some(),
            "manifest loaded"
        );
        Ok(document)
    }

    /// Writes the manifest, including any stored token, as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Write`] if the file cannot be written.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn save(&self, path: &Path) -> Result<(), ManifestError> {
        let json = serde_json::to_vec_pretty(self)
            .map_err(|e| ManifestError::write(path, std::io::Error::other(e)))?;
        tokio::fs::write(path, json)
            .await
            .map_err(|e| ManifestError::write(path, e))?;
        debug!("manifest saved");
        Ok(())
    }

    /// Entries in chronological (oldest-first) order.
    #[must_use]
    pub fn entries(&self) -> &[ManifestEntry] {
        &self.result.list
    }

    /// Reported total, falling back to the number of listed entries.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.result
            .total
            .unwrap_or(self.result.list.len() as u64)
    }

    /// The stored credential, if any.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Attaches a credential to the document.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}
