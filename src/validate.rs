//! Structural completeness checks for downloaded images.
//!
//! A download is accepted only when its trailing bytes carry a recognized
//! end-of-image signature, or (under the size policy) when it is at least a
//! configured number of bytes long. Both policies work from a
//! [`ContentSample`], so a full in-memory buffer and the last few bytes of a
//! file on disk go through the same check.
//!
//! # Example
//!
//! ```
//! use snapgrab_core::validate::{ContentSample, ContentValidator};
//!
//! let body = [0xFF, 0xD8, 0x00, 0x00, 0xFF, 0xD9];
//! assert!(ContentValidator::Signature.accepts(ContentSample::from_buffer(&body)));
//! assert!(!ContentValidator::MinSize(1024).accepts(ContentSample::from_buffer(&body)));
//! ```

use std::fmt;
use std::str::FromStr;

/// JPEG end-of-image marker.
pub const JPEG_EOI: [u8; 2] = [0xFF, 0xD9];

/// PNG `IEND` chunk: zero length, chunk type, and its fixed CRC.
pub const PNG_IEND: [u8; 12] = [
    0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

/// Number of trailing bytes needed to recognize any supported signature.
pub const TAIL_LEN: usize = PNG_IEND.len();

/// Default threshold for [`ContentValidator::MinSize`] (10 KiB).
pub const DEFAULT_MIN_SIZE_BYTES: u64 = 10 * 1024;

/// Returns true when `tail` ends with a JPEG or PNG end signature.
///
/// Buffers shorter than a signature never match it.
#[must_use]
pub fn is_valid_image(tail: &[u8]) -> bool {
    tail.ends_with(&JPEG_EOI) || tail.ends_with(&PNG_IEND)
}

/// The bytes a validator is allowed to look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentSample<'a> {
    /// Trailing bytes of the content (may be the whole buffer).
    pub tail: &'a [u8],
    /// Total content length in bytes.
    pub len: u64,
}

impl<'a> ContentSample<'a> {
    /// Wraps a complete in-memory buffer.
    #[must_use]
    pub fn from_buffer(buffer: &'a [u8]) -> Self {
        Self {
            tail: buffer,
            len: buffer.len() as u64,
        }
    }

    /// Wraps the trailing window of a file whose total size is `len`.
    #[must_use]
    pub fn from_tail(tail: &'a [u8], len: u64) -> Self {
        Self { tail, len }
    }
}

/// Policy used to decide whether content is a complete image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentValidator {
    /// Content must end with a JPEG or PNG end signature.
    Signature,
    /// Content must be at least this many bytes long.
    MinSize(u64),
}

impl Default for ContentValidator {
    fn default() -> Self {
        Self::Signature
    }
}

impl ContentValidator {
    /// Applies the policy to a sample.
    #[must_use]
    pub fn accepts(self, sample: ContentSample<'_>) -> bool {
        match self {
            Self::Signature => is_valid_image(sample.tail),
            Self::MinSize(threshold) => sample.len >= threshold,
        }
    }

    /// Whether the policy needs the file's trailing bytes, or only its size.
    #[must_use]
    pub fn needs_tail(self) -> bool {
        matches!(self, Self::Signature)
    }
}

/// Policy name as accepted on the command line and in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    #[default]
    Signature,
    MinSize,
}

impl ValidationMode {
    /// Builds the validator for this mode.
    #[must_use]
    pub fn validator(self, min_size_bytes: u64) -> ContentValidator {
        match self {
            Self::Signature => ContentValidator::Signature,
            Self::MinSize => ContentValidator::MinSize(min_size_bytes),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Signature => "signature",
            Self::MinSize => "min-size",
        }
    }
}

impl fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidationMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "signature" => Ok(Self::Signature),
            "min-size" | "min_size" | "size" => Ok(Self::MinSize),
            other => Err(format!(
                "unknown validation mode '{other}' (expected 'signature' or 'min-size')"
            )),
        }
    }
}
