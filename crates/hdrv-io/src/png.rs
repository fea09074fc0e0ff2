//! PNG probe.
//!
//! Decodes 1-16 bit gray, gray+alpha, RGB, RGBA and palette images to
//! `f32`, reading color metadata from `gAMA`, `cHRM`, `sRGB`, `iCCP` and
//! `cICP`. A `cICP` chunk takes precedence over an embedded profile.

use crate::error::{IoError, IoResult};
use crate::options::LoadOptions;
use crate::probe::{alloc_buffer, linear_image, sniff, Probe, ReadSeek};
use hdrv_color::{Chromaticities, Cicp, ColorGamut, ColorMetadata, TransferFunction};
use hdrv_core::Image;
use std::io::BufReader;
use tracing::{debug, info};

const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Portable Network Graphics.
#[derive(Debug, Default)]
pub struct PngProbe;

impl Probe for PngProbe {
    fn name(&self) -> &'static str {
        "PNG"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["png"]
    }

    fn try_decode(
        &self,
        stream: &mut dyn ReadSeek,
        filename: &str,
        options: &LoadOptions,
    ) -> IoResult<Option<Vec<Image>>> {
        if sniff::<8>(stream)? != PNG_MAGIC {
            return Ok(None);
        }
        decode(stream, filename, options).map(|img| Some(vec![img]))
    }
}

fn decode(stream: &mut dyn ReadSeek, filename: &str, options: &LoadOptions) -> IoResult<Image> {
    let mut decoder = png::Decoder::new(BufReader::new(stream));
    decoder.set_transformations(png::Transformations::EXPAND);
    let mut reader = decoder.read_info().map_err(|e| IoError::DecodeError(e.to_string()))?;

    let meta = color_metadata(reader.info());

    let size = reader
        .output_buffer_size()
        .ok_or_else(|| IoError::DecodeError("cannot determine output buffer size".into()))?;
    let mut buf: Vec<u8> = alloc_buffer(size)?;
    let frame = reader.next_frame(&mut buf).map_err(|e| IoError::DecodeError(e.to_string()))?;

    let (width, height) = (frame.width as usize, frame.height as usize);
    let channels = frame.color_type.samples();
    let bytes = &buf[..frame.buffer_size()];
    let data: Vec<f32> = match frame.bit_depth {
        png::BitDepth::Sixteen => bytes
            .chunks_exact(2)
            .map(|b| u16::from_be_bytes([b[0], b[1]]) as f32 / 65535.0)
            .collect(),
        png::BitDepth::Eight => bytes.iter().map(|&b| b as f32 / 255.0).collect(),
        depth => return Err(IoError::DecodeError(format!("unexpected bit depth {depth:?} after expansion"))),
    };
    if data.len() != width * height * channels {
        return Err(IoError::DecodeError(format!(
            "expected {} samples, decoded {}",
            width * height * channels,
            data.len()
        )));
    }

    info!("PNG {}x{} {:?} {:?}", width, height, frame.color_type, frame.bit_depth);
    let mut image = linear_image(filename, width, height, channels, data, &meta, options);
    image.metadata.insert("loader".into(), "PNG".into());
    image.metadata.insert("bit depth".into(), format!("{}", frame.bit_depth as u8));
    image.metadata.insert("color type".into(), format!("{:?}", frame.color_type));
    Ok(image)
}

fn color_metadata(info: &png::Info<'_>) -> ColorMetadata {
    let mut meta = ColorMetadata::default();

    if let Some(gamma) = info.source_gamma {
        let g = gamma.into_value();
        debug!("PNG gAMA {g:.5}");
        if g > 0.0 {
            // gAMA stores the encoding exponent, 1/gamma
            meta.transfer = Some(TransferFunction::Gamma(1.0 / g));
        }
    }

    if let Some(c) = &info.source_chromaticities {
        let xy = |p: (png::ScaledFloat, png::ScaledFloat)| (p.0.into_value(), p.1.into_value());
        let chroma = Chromaticities::new(xy(c.red), xy(c.green), xy(c.blue), xy(c.white));
        debug!("PNG cHRM {chroma}");
        meta.chromaticities = Some(chroma);
    }

    if info.srgb.is_some() {
        debug!("PNG sRGB chunk");
        meta.transfer = Some(TransferFunction::Srgb);
        meta.chromaticities = Some(ColorGamut::Bt709.chromaticities());
    }

    if let Some(cicp) = &info.coding_independent_code_points {
        debug!(
            "PNG cICP primaries {} transfer {} matrix {}",
            cicp.color_primaries, cicp.transfer_function, cicp.matrix_coefficients
        );
        meta.cicp = Some(Cicp {
            primaries: cicp.color_primaries,
            transfer: cicp.transfer_function,
            matrix: cicp.matrix_coefficients,
            full_range: cicp.is_video_full_range_image,
        });
    } else if let Some(icc) = &info.icc_profile {
        debug!("PNG iCCP, {} bytes", icc.len());
        meta.icc_profile = Some(icc.to_vec());
    }

    meta
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::io::Cursor;

    fn encode(width: u32, height: u32, color: png::ColorType, depth: png::BitDepth, data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut enc = png::Encoder::new(&mut out, width, height);
            enc.set_color(color);
            enc.set_depth(depth);
            let mut w = enc.write_header().unwrap();
            w.write_image_data(data).unwrap();
        }
        out
    }

    #[test]
    fn rejects_foreign_data() {
        let mut c = Cursor::new(b"not a png at all".to_vec());
        assert!(PngProbe.try_decode(&mut c, "x", &LoadOptions::default()).unwrap().is_none());
        let mut empty = Cursor::new(Vec::new());
        assert!(PngProbe.try_decode(&mut empty, "x", &LoadOptions::default()).unwrap().is_none());
    }

    #[test]
    fn rgba8_is_linearized_except_alpha() {
        let bytes = encode(2, 1, png::ColorType::Rgba, png::BitDepth::Eight, &[255, 128, 0, 128, 0, 0, 0, 255]);
        let imgs = PngProbe
            .try_decode(&mut Cursor::new(bytes), "a.png", &LoadOptions::default())
            .unwrap()
            .unwrap();
        let img = &imgs[0];
        assert_eq!(img.channels.len(), 4);
        assert_eq!(img.channels[0].data()[0], 1.0);
        assert_abs_diff_eq!(img.channels[1].data()[0], 0.2158605, epsilon = 1e-4);
        assert_abs_diff_eq!(img.channels[3].data()[0], 128.0 / 255.0, epsilon = 1e-6);
        assert_eq!(img.metadata["loader"], "PNG");
    }

    #[test]
    fn gray16_with_override() {
        let bytes = encode(1, 1, png::ColorType::Grayscale, png::BitDepth::Sixteen, &[0x80, 0x00]);
        let opts = LoadOptions { tf_override: Some(TransferFunction::Linear), ..Default::default() };
        let imgs = PngProbe.try_decode(&mut Cursor::new(bytes), "g.png", &opts).unwrap().unwrap();
        assert_eq!(imgs[0].channels[0].name, "Y");
        assert_abs_diff_eq!(imgs[0].channels[0].data()[0], 32768.0 / 65535.0, epsilon = 1e-6);
    }

    #[test]
    fn truncated_is_an_error() {
        let mut bytes = encode(4, 4, png::ColorType::Rgb, png::BitDepth::Eight, &[7; 48]);
        bytes.truncate(40);
        assert!(PngProbe.try_decode(&mut Cursor::new(bytes), "t.png", &LoadOptions::default()).is_err());
    }
}
