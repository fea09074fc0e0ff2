//! # hdrv-icc
//!
//! Reads embedded ICC profiles far enough to recover what the color
//! resolver needs: the primaries and native white point of a matrix/TRC
//! RGB profile, and its tone curve as a [`TransferFunction`].
//!
//! Parsing goes through [`lcms2`]. The `chad` tag is decoded directly from
//! the tag table so colorants can be un-adapted from D50.
//!
//! Every failure is an [`IccError`]; callers treat it as "no usable
//! profile" and move on to the next metadata source.
//!
//! [`TransferFunction`]: hdrv_transfer::TransferFunction

mod error;
mod profile;
mod standard;
mod tags;

pub use error::{IccError, IccResult};
pub use profile::{IccProfile, PCS_WHITE};
pub use standard::{rgb_profile, srgb_profile};
