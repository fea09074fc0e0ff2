//! # hdrv-io
//!
//! Format probes and the decoder registry for HDR image ingestion.
//!
//! Every decoder is a [`Probe`]: a cheap magic-number check followed by a
//! full decode into one or more [`hdrv_core::Image`]s. Color is resolved
//! per image from the container's metadata and the caller's
//! [`LoadOptions`]; samples come out linear and the matrix into the
//! working space is attached to the image.
//!
//! Built-in probes:
//!
//! - **OpenEXR** - multi-part, arbitrary channels, chromaticities
//! - **PNG** - 8/16-bit, gAMA/cHRM/sRGB/iCCP/cICP
//! - **JPEG** - grayscale, RGB, CMYK, embedded ICC
//! - **Radiance HDR** - RGBE with RLE scanlines
//! - **PFM** - little and big endian float maps
//! - **PNM** - binary 8/16-bit PGM and PPM
//! - **TIFF** - multi-page, integer and float samples (feature `tiff`)
//! - **WebP, QOI, BMP, TGA** - through the `image` crate (features `webp`,
//!   `qoi`, `bmp`, `tga`)
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use hdrv_io::{DecoderRegistry, LoadOptions};
//!
//! let registry = DecoderRegistry::default();
//! let images = registry.decode_file("beauty.exr", &LoadOptions::default())?;
//! for image in &images {
//!     println!("{image}");
//! }
//! # Ok::<(), hdrv_io::IoError>(())
//! ```

pub mod error;
pub mod options;
pub mod probe;
pub mod registry;

pub mod exr;
pub mod hdr;
pub mod jpeg;
pub mod pfm;
pub mod png;
pub mod pnm;
#[cfg(any(feature = "webp", feature = "qoi", feature = "bmp", feature = "tga"))]
pub mod raster;
#[cfg(feature = "tiff")]
pub mod tiff;

pub use error::{IoError, IoResult};
pub use options::LoadOptions;
pub use probe::{Probe, ReadSeek};
pub use registry::DecoderRegistry;

pub use self::exr::ExrProbe;
pub use self::hdr::HdrProbe;
pub use self::jpeg::JpegProbe;
pub use self::pfm::PfmProbe;
pub use self::png::PngProbe;
pub use self::pnm::PnmProbe;
#[cfg(any(feature = "webp", feature = "qoi", feature = "bmp", feature = "tga"))]
pub use self::raster::RasterProbe;
#[cfg(feature = "tiff")]
pub use self::tiff::TiffProbe;
