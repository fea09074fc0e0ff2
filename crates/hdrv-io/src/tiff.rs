//! TIFF probe.
//!
//! Every page of a multi-page file becomes its own image. Integer samples
//! are normalized to `[0, 1]` and assumed sRGB unless the file carries a
//! profile; float samples are taken as linear.

use crate::error::{IoError, IoResult};
use crate::options::LoadOptions;
use crate::probe::{linear_image, sample_count, sniff, Probe, ReadSeek};
use hdrv_color::ColorMetadata;
use hdrv_core::Image;
use std::io::BufReader;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;
use tiff::{ColorType, TiffError};
use tracing::{debug, info};

const ICC_PROFILE_TAG: u16 = 34675;

/// Baseline TIFF and BigTIFF, 8/16/32-bit integer and float samples.
#[derive(Debug, Default)]
pub struct TiffProbe;

impl Probe for TiffProbe {
    fn name(&self) -> &'static str {
        "TIFF"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["tif", "tiff"]
    }

    fn try_decode(
        &self,
        stream: &mut dyn ReadSeek,
        filename: &str,
        options: &LoadOptions,
    ) -> IoResult<Option<Vec<Image>>> {
        let magic = sniff::<4>(stream)?;
        if !matches!(&magic, b"II*\0" | b"MM\0*" | b"II+\0" | b"MM\0+") {
            return Ok(None);
        }

        let mut decoder = Decoder::new(BufReader::new(stream)).map_err(decode_error)?;
        let mut images = vec![read_page(&mut decoder, filename, options)?];
        while decoder.more_images() {
            decoder.next_image().map_err(decode_error)?;
            images.push(read_page(&mut decoder, filename, options)?);
        }

        if images.len() > 1 {
            for (index, image) in images.iter_mut().enumerate() {
                image.partname = format!("page {index}");
            }
        }
        info!("TIFF with {} page(s)", images.len());
        Ok(Some(images))
    }
}

fn read_page<R: std::io::Read + std::io::Seek>(
    decoder: &mut Decoder<R>,
    filename: &str,
    options: &LoadOptions,
) -> IoResult<Image> {
    let (width, height) = decoder.dimensions().map_err(decode_error)?;
    let (width, height) = (width as usize, height as usize);
    let color_type = decoder.colortype().map_err(decode_error)?;

    let stored = match color_type {
        ColorType::Gray(_) => 1,
        ColorType::GrayA(_) => 2,
        ColorType::RGB(_) => 3,
        ColorType::RGBA(_) | ColorType::CMYK(_) => 4,
        other => return Err(IoError::DecodeError(format!("unsupported TIFF color type {other:?}"))),
    };
    let expected = sample_count(width, height, stored)?;

    let icc_profile = decoder.get_tag_u8_vec(Tag::from_u16_exhaustive(ICC_PROFILE_TAG)).ok();
    if let Some(icc) = &icc_profile {
        debug!("TIFF ICC profile, {} bytes", icc.len());
    }

    let (samples, is_float): (Vec<f32>, bool) = match decoder.read_image().map_err(decode_error)? {
        DecodingResult::U8(buf) => (buf.iter().map(|&v| v as f32 / 255.0).collect(), false),
        DecodingResult::U16(buf) => (buf.iter().map(|&v| v as f32 / 65535.0).collect(), false),
        DecodingResult::U32(buf) => (buf.iter().map(|&v| (v as f64 / u32::MAX as f64) as f32).collect(), false),
        DecodingResult::F32(buf) => (buf, true),
        DecodingResult::F64(buf) => (buf.iter().map(|&v| v as f32).collect(), true),
        _ => return Err(IoError::DecodeError(format!("unsupported TIFF sample format for {color_type:?}"))),
    };
    if samples.len() < expected {
        return Err(IoError::DecodeError(format!(
            "TIFF page has {} samples, expected {expected}",
            samples.len()
        )));
    }

    let (channels, data) = match color_type {
        ColorType::CMYK(_) => (
            3,
            samples
                .chunks_exact(4)
                .flat_map(|p| {
                    let k = 1.0 - p[3];
                    [0, 1, 2].map(|i| (1.0 - p[i]) * k)
                })
                .collect(),
        ),
        _ => (stored, samples),
    };

    let meta = if is_float {
        ColorMetadata { icc_profile, ..ColorMetadata::linear() }
    } else {
        ColorMetadata { icc_profile, ..Default::default() }
    };
    debug!("TIFF page {}x{} {:?}", width, height, color_type);
    let mut image = linear_image(filename, width, height, channels, data, &meta, options);
    image.metadata.insert("loader".into(), "TIFF".into());
    image.metadata.insert("color type".into(), format!("{color_type:?}"));
    Ok(image)
}

fn decode_error(e: TiffError) -> IoError {
    match e {
        TiffError::IoError(e) => IoError::Io(e),
        other => IoError::DecodeError(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tiff::encoder::{colortype, TiffEncoder};

    #[test]
    fn rgb16_page() {
        let mut file = Cursor::new(Vec::new());
        let data: Vec<u16> = [0u16, 65535, 32768].repeat(6);
        TiffEncoder::new(&mut file)
            .unwrap()
            .write_image::<colortype::RGB16>(3, 2, &data)
            .unwrap();
        let mut file = Cursor::new(file.into_inner());

        let opts = LoadOptions { tf_override: Some(hdrv_color::TransferFunction::Linear), ..Default::default() };
        let imgs = TiffProbe.try_decode(&mut file, "x.tif", &opts).unwrap().unwrap();
        assert_eq!(imgs.len(), 1);
        let img = &imgs[0];
        assert_eq!(img.size(), (3, 2));
        assert_eq!(img.channels.len(), 3);
        assert_eq!(img.partname, "");
        assert_eq!(img.channels[0].data()[0], 0.0);
        assert_eq!(img.channels[1].data()[5], 1.0);
    }

    #[test]
    fn float_pages_are_linear_parts() {
        let mut file = Cursor::new(Vec::new());
        let mut encoder = TiffEncoder::new(&mut file).unwrap();
        encoder.write_image::<colortype::Gray32Float>(2, 2, &[0.5; 4]).unwrap();
        encoder.write_image::<colortype::Gray32Float>(1, 1, &[4.0]).unwrap();
        drop(encoder);
        let mut file = Cursor::new(file.into_inner());

        let imgs = TiffProbe.try_decode(&mut file, "x.tif", &LoadOptions::default()).unwrap().unwrap();
        let parts: Vec<_> = imgs.iter().map(|i| i.partname.as_str()).collect();
        assert_eq!(parts, ["page 0", "page 1"]);
        assert_eq!(imgs[0].channels[0].data(), &[0.5; 4]);
        assert_eq!(imgs[1].channels[0].data(), &[4.0]);
    }

    #[test]
    fn rejects_foreign_data() {
        let mut c = Cursor::new(b"BM\0\0".to_vec());
        assert!(TiffProbe.try_decode(&mut c, "x", &LoadOptions::default()).unwrap().is_none());
    }

    #[test]
    fn corrupt_after_magic_is_an_error() {
        let mut c = Cursor::new(b"II*\0\xff\xff\xff\x7f".to_vec());
        assert!(TiffProbe.try_decode(&mut c, "x.tif", &LoadOptions::default()).is_err());
    }
}
