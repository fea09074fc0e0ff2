//! Error types for decoding.

use hdrv_core::CoreError;
use std::io;
use thiserror::Error;

/// Decode failure for a single load.
#[derive(Debug, Error)]
pub enum IoError {
    /// Reading the stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// No enabled probe recognized the stream.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A probe recognized the stream but could not decode it.
    #[error("decode error: {0}")]
    DecodeError(String),

    /// Decoded data does not form a valid image.
    #[error("invalid image: {0}")]
    InvalidImage(String),
}

impl From<CoreError> for IoError {
    fn from(e: CoreError) -> Self {
        Self::InvalidImage(e.to_string())
    }
}

/// Result type for decoding.
pub type IoResult<T> = Result<T, IoError>;
