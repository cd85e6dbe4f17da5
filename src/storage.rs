//! Local storage checks: the target directory and files already downloaded.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::{debug, info, instrument};

use crate::validate::{ContentSample, ContentValidator, TAIL_LEN};

/// Errors from the local filesystem that make continuing pointless.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The target path exists but is a file or something else.
    #[error("target path {path} exists but is not a directory")]
    NotADirectory {
        /// Target directory path.
        path: PathBuf,
    },

    /// The target directory could not be created.
    #[error("cannot create target directory {path}: {source}")]
    CreateDir {
        /// Target directory path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// An existing download could not be inspected.
    #[error("cannot inspect {path}: {source}")]
    Inspect {
        /// File path being verified.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    pub fn inspect(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Inspect {
            path: path.into(),
            source,
        }
    }
}

/// State of a previously downloaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExistingFile {
    /// Nothing at the path.
    Absent,
    /// A file that passes the validator; it will not be fetched again.
    Valid,
    /// A file that fails the validator; it will be overwritten.
    Invalid,
}

/// Checks the target path without changing anything.
///
/// Returns `true` if it is an existing directory and `false` if nothing is
/// there yet.
///
/// # Errors
///
/// Returns [`StorageError::NotADirectory`] if the path is occupied by a
/// non-directory and [`StorageError::Inspect`] if it cannot be examined.
pub async fn inspect_target_dir(path: &Path) -> Result<bool, StorageError> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_dir() => Ok(true),
        Ok(_) => Err(StorageError::NotADirectory {
            path: path.to_path_buf(),
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(StorageError::inspect(path, e)),
    }
}

/// Makes sure `path` is a usable directory, creating it when missing.
///
/// Returns `true` when the directory was created by this call.
///
/// # Errors
///
/// Returns [`StorageError::NotADirectory`] if the path is occupied by a
/// non-directory, [`StorageError::CreateDir`] if creation fails, and
/// [`StorageError::Inspect`] if the path cannot be examined.
#[instrument(fields(path = %path.display()))]
pub async fn ensure_target_dir(path: &Path) -> Result<bool, StorageError> {
    if inspect_target_dir(path).await? {
        return Ok(false);
    }
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|source| StorageError::CreateDir {
            path: path.to_path_buf(),
            source,
        })?;
    info!("created target directory");
    Ok(true)
}

/// Checks whether a file already at `path` is a complete download.
///
/// Under the signature policy only the last [`TAIL_LEN`] bytes are read.
///
/// # Errors
///
/// Returns [`StorageError::Inspect`] if the path cannot be stat'ed or read,
/// or if something other than a regular file occupies it.
pub async fn probe_existing(
    path: &Path,
    validator: ContentValidator,
) -> Result<ExistingFile, StorageError> {
    let meta = match tokio::fs::metadata(path).await {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(ExistingFile::Absent),
        Err(e) => return Err(StorageError::inspect(path, e)),
    };
    if !meta.is_file() {
        return Err(StorageError::inspect(
            path,
            std::io::Error::other("not a regular file"),
        ));
    }

    let len = meta.len();
    let tail = if validator.needs_tail() {
        read_tail(path, len).await?
    } else {
        Vec::new()
    };

    let state = if validator.accepts(ContentSample::from_tail(&tail, len)) {
        ExistingFile::Valid
    } else {
        ExistingFile::Invalid
    };
    debug!(path = %path.display(), len, ?state, "checked existing file");
    Ok(state)
}

async fn read_tail(path: &Path, len: u64) -> Result<Vec<u8>, StorageError> {
    let mut file = tokio::fs::File::open(path)
        .await
        .map_err(|e| StorageError::inspect(path, e))?;
    let start = len.saturating_sub(TAIL_LEN as u64);
    file.seek(SeekFrom::Start(start))
        .await
        .map_err(|e| StorageError::inspect(path, e))?;
    let mut tail = Vec::with_capacity(TAIL_LEN);
    file.read_to_end(&mut tail)
        .await
        .map_err(|e| StorageError::inspect(path, e))?;
    Ok(tail)
}
