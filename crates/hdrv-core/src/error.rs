//! Error types for the image model.

use thiserror::Error;

/// Result alias using [`CoreError`].
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Errors raised while finalizing an image.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The image has no channels.
    #[error("image must have at least one channel")]
    NoChannels,

    /// A channel's size differs from the data window.
    #[error("channel '{name}' is {width}x{height}, data window is {expected_width}x{expected_height}")]
    SizeMismatch {
        /// Channel name.
        name: String,
        /// Channel width.
        width: usize,
        /// Channel height.
        height: usize,
        /// Data window width.
        expected_width: usize,
        /// Data window height.
        expected_height: usize,
    },

    /// Two channels share a name.
    #[error("duplicate channel name '{0}'")]
    DuplicateChannel(String),

    /// Layer/group bookkeeping does not add up.
    #[error("inconsistent channel grouping: {0}")]
    Inconsistent(String),
}
