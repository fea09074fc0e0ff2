//! JPEG probe.

use crate::error::{IoError, IoResult};
use crate::options::LoadOptions;
use crate::probe::{linear_image, sniff, Probe, ReadSeek};
use hdrv_color::ColorMetadata;
use hdrv_core::Image;
use jpeg_decoder::PixelFormat;
use std::io::BufReader;
use tracing::{debug, info};

/// JPEG/JFIF, 8-bit gray, RGB or CMYK and 16-bit gray.
#[derive(Debug, Default)]
pub struct JpegProbe;

impl Probe for JpegProbe {
    fn name(&self) -> &'static str {
        "JPEG"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["jpg", "jpeg"]
    }

    fn try_decode(
        &self,
        stream: &mut dyn ReadSeek,
        filename: &str,
        options: &LoadOptions,
    ) -> IoResult<Option<Vec<Image>>> {
        if sniff::<3>(stream)? != [0xFF, 0xD8, 0xFF] {
            return Ok(None);
        }

        let mut decoder = jpeg_decoder::Decoder::new(BufReader::new(stream));
        let pixels = decoder.decode().map_err(|e| IoError::DecodeError(e.to_string()))?;
        let info = decoder
            .info()
            .ok_or_else(|| IoError::DecodeError("missing JPEG info".into()))?;
        let (width, height) = (info.width as usize, info.height as usize);

        let (channels, data): (usize, Vec<f32>) = match info.pixel_format {
            PixelFormat::L8 => (1, pixels.iter().map(|&v| v as f32 / 255.0).collect()),
            PixelFormat::L16 => (
                1,
                pixels
                    .chunks_exact(2)
                    .map(|b| u16::from_be_bytes([b[0], b[1]]) as f32 / 65535.0)
                    .collect(),
            ),
            PixelFormat::RGB24 => (3, pixels.iter().map(|&v| v as f32 / 255.0).collect()),
            PixelFormat::CMYK32 => (
                3,
                pixels
                    .chunks_exact(4)
                    .flat_map(|p| {
                        let k = 1.0 - p[3] as f32 / 255.0;
                        [0, 1, 2].map(|i| (1.0 - p[i] as f32 / 255.0) * k)
                    })
                    .collect(),
            ),
        };
        if data.len() != width * height * channels {
            return Err(IoError::DecodeError("JPEG pixel data is truncated".into()));
        }

        let meta = ColorMetadata { icc_profile: decoder.icc_profile(), ..Default::default() };
        if let Some(icc) = &meta.icc_profile {
            debug!("JPEG ICC profile, {} bytes", icc.len());
        }

        info!("JPEG {}x{} {:?}", width, height, info.pixel_format);
        let mut image = linear_image(filename, width, height, channels, data, &meta, options);
        image.metadata.insert("loader".into(), "JPEG".into());
        image.metadata.insert("pixel format".into(), format!("{:?}", info.pixel_format));
        Ok(Some(vec![image]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn rejects_foreign_data() {
        let mut c = Cursor::new(vec![0x89, b'P', b'N', b'G']);
        assert!(JpegProbe.try_decode(&mut c, "x", &LoadOptions::default()).unwrap().is_none());
    }

    #[test]
    fn corrupt_after_magic_is_an_error() {
        let mut c = Cursor::new(vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x02]);
        assert!(JpegProbe.try_decode(&mut c, "x.jpg", &LoadOptions::default()).is_err());
    }
}
