//! # hdrv-color
//!
//! Turns whatever color metadata a decoder found into two things:
//!
//! - a [`TransferFunction`] used to linearize the decoded samples, and
//! - the native [`Chromaticities`], from which a [`ColorTransform`] derives
//!   the 3x3 matrix into the working space (linear Rec.709).
//!
//! Sources are consulted in priority order: caller override, embedded ICC
//! profile, CICP code points, format-native records, and finally an
//! assumed sRGB/Rec.709 encoding. See [`resolve`].
//!
//! ```rust
//! use hdrv_color::{resolve, ColorMetadata, ColorOverrides, ColorSource};
//!
//! let resolved = resolve(&ColorMetadata::default(), &ColorOverrides::default());
//! assert_eq!(resolved.transfer_source, ColorSource::Assumed);
//! assert!(resolved.transform().matrix().is_identity(1e-5));
//! ```
//!
//! [`TransferFunction`]: hdrv_transfer::TransferFunction
//! [`Chromaticities`]: hdrv_primaries::Chromaticities

mod metadata;
mod pixels;
mod resolve;
mod transform;

pub use metadata::{Cicp, ColorMetadata};
pub use pixels::{apply_matrix_interleaved, linearize_interleaved};
pub use resolve::{resolve, ColorOverrides, ColorSource, ResolvedColor};
pub use transform::ColorTransform;

pub use hdrv_math::{AdaptationMethod, Mat3};
pub use hdrv_primaries::{Chromaticities, ColorGamut, WhitePoint};
pub use hdrv_transfer::TransferFunction;
