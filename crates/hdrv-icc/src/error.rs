//! ICC error types.

use thiserror::Error;

/// Result type for ICC operations.
pub type IccResult<T> = Result<T, IccError>;

/// Errors raised while reading a color profile.
///
/// These are always recoverable for the caller: a profile that fails to
/// yield primaries or a tone curve is skipped in favor of the next
/// metadata source.
#[derive(Debug, Error)]
pub enum IccError {
    /// lcms2 rejected the data.
    #[error("invalid profile data: {0}")]
    InvalidProfile(String),

    /// A tag required for the requested information is absent.
    #[error("profile has no usable '{0}' tag")]
    MissingTag(&'static str),

    /// Only RGB and gray profiles describe a linearizable encoding.
    #[error("unsupported profile color space: {0}")]
    UnsupportedColorSpace(String),

    /// Colorants or adaptation matrix could not be inverted.
    #[error("degenerate profile: {0}")]
    Degenerate(&'static str),

    /// Failed to build a profile.
    #[error("failed to create profile: {0}")]
    CreateFailed(String),
}
