//! Portable Float Map probe.

use crate::error::{IoError, IoResult};
use crate::options::LoadOptions;
use crate::pnm::{parse_token, read_token};
use crate::probe::{alloc_buffer, ensure_remaining, linear_image, sample_count, sniff, Probe, ReadSeek};
use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use hdrv_color::ColorMetadata;
use hdrv_core::Image;
use std::io::BufReader;
use tracing::info;

/// PFM: `Pf` gray, `PF` RGB, `PF4` RGBA, 32-bit float samples.
///
/// A negative scale marks little-endian data. Rows are stored bottom to
/// top and flipped on load.
#[derive(Debug, Default)]
pub struct PfmProbe;

impl Probe for PfmProbe {
    fn name(&self) -> &'static str {
        "PFM"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["pfm"]
    }

    fn try_decode(
        &self,
        stream: &mut dyn ReadSeek,
        filename: &str,
        options: &LoadOptions,
    ) -> IoResult<Option<Vec<Image>>> {
        let magic = sniff::<4>(stream)?;
        if magic[0] != b'P' || !matches!(magic[1], b'f' | b'F') {
            return Ok(None);
        }
        let ws = |b: u8| b.is_ascii_whitespace();
        let channels = match (magic[1], magic[2], magic[3]) {
            (b'f', c, _) if ws(c) => 1,
            (b'F', c, _) if ws(c) => 3,
            (b'F', b'4', c) if ws(c) => 4,
            _ => return Ok(None),
        };

        let mut reader = BufReader::new(stream);
        read_token(&mut reader)?;
        let width: usize = parse_token(&mut reader, "width")?;
        let height: usize = parse_token(&mut reader, "height")?;
        let scale: f32 = parse_token(&mut reader, "scale")?;
        if width == 0 || height == 0 || !scale.is_finite() || scale == 0.0 {
            return Err(IoError::DecodeError(format!("invalid PFM header {width}x{height} scale {scale}")));
        }

        let row = width * channels;
        let samples = sample_count(width, height, channels)?;
        ensure_remaining(&mut reader, samples as u64 * 4)?;
        let mut data: Vec<f32> = alloc_buffer(samples)?;
        if scale > 0.0 {
            reader.read_f32_into::<BigEndian>(&mut data)?;
        } else {
            reader.read_f32_into::<LittleEndian>(&mut data)?;
        }
        let scale = scale.abs();
        let mut flipped = Vec::new();
        flipped
            .try_reserve_exact(data.len())
            .map_err(|e| IoError::DecodeError(e.to_string()))?;
        for line in data.chunks_exact(row).rev() {
            flipped.extend(line.iter().map(|v| v * scale));
        }

        info!("PFM {}x{}x{}", width, height, channels);
        let mut image = linear_image(filename, width, height, channels, flipped, &ColorMetadata::linear(), options);
        image.metadata.insert("loader".into(), "PFM".into());
        Ok(Some(vec![image]))
    }
}
