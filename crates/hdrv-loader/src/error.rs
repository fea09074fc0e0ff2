//! Loader error types.

use hdrv_io::IoError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the loader's fallible entry points.
///
/// Per-load decode failures never appear here; they are logged on the
/// decode thread and the load completes with no images.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// Filesystem access failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Decoding failed.
    #[error(transparent)]
    Decode(#[from] IoError),

    /// A zip archive could not be read.
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A directory could not be watched.
    #[error("cannot watch '{path}': {source}")]
    Watch {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The recent-files list could not be read or written.
    #[error("recent files '{path}': {source}")]
    Recent {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// No recent file at that index.
    #[error("no recent file at index {0}")]
    NoRecent(usize),
}

/// Result type for loader operations.
pub type LoaderResult<T> = Result<T, LoaderError>;
