//! 8/16-bit raster formats decoded through the `image` crate.
//!
//! One [`RasterProbe`] per container; each checks its own signature and
//! hands the stream to `image` with the format fixed, so detection never
//! depends on the file extension.

use crate::error::{IoError, IoResult};
use crate::options::LoadOptions;
use crate::probe::{linear_image, sample_count, sniff, Probe, ReadSeek};
use hdrv_color::ColorMetadata;
use hdrv_core::Image;
use image::{DynamicImage, ImageDecoder, ImageError, ImageFormat, ImageReader};
use std::io::BufReader;
use tracing::{debug, info};

const HEADER_LEN: usize = 18;

/// A format decoded by the `image` crate, with its own signature check.
#[derive(Debug, Clone)]
pub struct RasterProbe {
    name: &'static str,
    format: ImageFormat,
    extensions: &'static [&'static str],
    signature: fn(&[u8; HEADER_LEN]) -> bool,
}

impl RasterProbe {
    /// Lossy and lossless WebP, still images only.
    #[cfg(feature = "webp")]
    pub fn webp() -> Self {
        Self {
            name: "WebP",
            format: ImageFormat::WebP,
            extensions: &["webp"],
            signature: |h| &h[..4] == b"RIFF" && &h[8..12] == b"WEBP",
        }
    }

    /// Quite OK Image format.
    #[cfg(feature = "qoi")]
    pub fn qoi() -> Self {
        Self { name: "QOI", format: ImageFormat::Qoi, extensions: &["qoi"], signature: |h| &h[..4] == b"qoif" }
    }

    /// Windows bitmap.
    #[cfg(feature = "bmp")]
    pub fn bmp() -> Self {
        Self {
            name: "BMP",
            format: ImageFormat::Bmp,
            extensions: &["bmp"],
            signature: |h| {
                let dib = u32::from_le_bytes([h[14], h[15], h[16], h[17]]);
                &h[..2] == b"BM" && matches!(dib, 12 | 40 | 52 | 56 | 64 | 108 | 124)
            },
        }
    }

    /// Truevision TGA. The format has no magic number, so the header is
    /// checked for plausible values; register it after the other probes.
    #[cfg(feature = "tga")]
    pub fn tga() -> Self {
        Self {
            name: "TGA",
            format: ImageFormat::Tga,
            extensions: &["tga"],
            signature: |h| {
                let width = u16::from_le_bytes([h[12], h[13]]);
                let height = u16::from_le_bytes([h[14], h[15]]);
                h[1] <= 1
                    && matches!(h[2], 1 | 2 | 3 | 9 | 10 | 11)
                    && matches!(h[16], 8 | 15 | 16 | 24 | 32)
                    && width > 0
                    && height > 0
            },
        }
    }
}

impl Probe for RasterProbe {
    fn name(&self) -> &'static str {
        self.name
    }

    fn extensions(&self) -> &'static [&'static str] {
        self.extensions
    }

    fn try_decode(
        &self,
        stream: &mut dyn ReadSeek,
        filename: &str,
        options: &LoadOptions,
    ) -> IoResult<Option<Vec<Image>>> {
        if !(self.signature)(&sniff::<HEADER_LEN>(stream)?) {
            return Ok(None);
        }

        let mut decoder = ImageReader::with_format(BufReader::new(stream), self.format)
            .into_decoder()
            .map_err(decode_error)?;
        let icc_profile = decoder.icc_profile().map_err(decode_error)?;
        let decoded = DynamicImage::from_decoder(decoder).map_err(decode_error)?;

        let (width, height) = (decoded.width() as usize, decoded.height() as usize);
        let color = decoded.color();
        let channels = color.channel_count() as usize;
        let data = match channels {
            1 => decoded.to_luma32f().into_raw(),
            2 => decoded.to_luma_alpha32f().into_raw(),
            3 => decoded.to_rgb32f().into_raw(),
            _ => decoded.to_rgba32f().into_raw(),
        };
        let channels = channels.min(4);
        if data.len() != sample_count(width, height, channels)? {
            return Err(IoError::DecodeError(format!("{} pixel data is truncated", self.name)));
        }

        if let Some(icc) = &icc_profile {
            debug!("{} ICC profile, {} bytes", self.name, icc.len());
        }
        let meta = ColorMetadata { icc_profile, ..Default::default() };

        info!("{} {}x{} {:?}", self.name, width, height, color);
        let mut image = linear_image(filename, width, height, channels, data, &meta, options);
        image.metadata.insert("loader".into(), self.name.into());
        image.metadata.insert("color type".into(), format!("{color:?}"));
        Ok(Some(vec![image]))
    }
}

fn decode_error(e: ImageError) -> IoError {
    match e {
        ImageError::IoError(e) => IoError::Io(e),
        other => IoError::DecodeError(other.to_string()),
    }
}
