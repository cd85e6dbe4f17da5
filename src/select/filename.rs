//! Deterministic local filenames for manifest entries.
//!
//! The name depends only on the entry's timestamp and the extension of its
//! URL, so every run maps an entry to the same path. That is what makes
//! re-running against the same manifest resume instead of duplicating.

use url::Url;

use crate::manifest::ManifestEntry;

/// Extension used when the URL does not carry one.
pub const FALLBACK_EXTENSION: &str = ".jpg";

/// Separators substituted for the first two colons of a timestamp.
const COLON_SEPARATORS: [char; 2] = ['h', 'm'];

/// Builds the local filename for an entry: normalized timestamp + URL extension.
///
/// ```
/// use snapgrab_core::manifest::ManifestEntry;
/// use snapgrab_core::select::local_file_name;
///
/// let entry = ManifestEntry::new("https://cdn.example.com/x/IMG_1.PNG?sig=1", "2023-05-01 12:34:56");
/// assert_eq!(local_file_name(&entry), "2023-05-01_12h34m56.png");
/// ```
#[must_use]
pub fn local_file_name(entry: &ManifestEntry) -> String {
    let stem = normalize_timestamp(&entry.timestamp);
    let extension =
        extension_from_url(&entry.url).unwrap_or_else(|| FALLBACK_EXTENSION.to_string());
    format!("{stem}{extension}")
}

/// Makes a timestamp usable as a filename on every platform.
///
/// Spaces become `_`, the first two colons become `h` and `m`, any later colon
/// becomes `-`, and path separators become `-`.
#[must_use]
pub fn normalize_timestamp(timestamp: &str) -> String {
    let mut colons_seen = 0usize;
    timestamp
        .trim()
        .chars()
        .map(|ch| match ch {
            ' ' => '_',
            ':' => {
                let mapped = COLON_SEPARATORS.get(colons_seen).copied().unwrap_or('-');
                colons_seen += 1;
                mapped
            }
            '/' | '\\' => '-',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

pub(crate) fn extension_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let last_segment = parsed.path_segments()?.next_back()?;
    let dot_index = last_segment.rfind('.')?;
    let ext = &last_segment[dot_index..];
    if ext.len() <= 1 || ext.len() > 6 || !ext[1..].chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
