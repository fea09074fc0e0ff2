//! Binary Netpbm (`P5` gray, `P6` RGB) probe.

use crate::error::{IoError, IoResult};
use crate::options::LoadOptions;
use crate::probe::{alloc_buffer, ensure_remaining, linear_image, sample_count, sniff, Probe, ReadSeek};
use hdrv_color::ColorMetadata;
use hdrv_core::Image;
use std::io::{BufRead, BufReader, Read};
use tracing::info;

/// Binary PGM/PPM, 8 or 16 bits per sample.
#[derive(Debug, Default)]
pub struct PnmProbe;

impl Probe for PnmProbe {
    fn name(&self) -> &'static str {
        "PNM"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["ppm", "pgm", "pnm"]
    }

    fn try_decode(
        &self,
        stream: &mut dyn ReadSeek,
        filename: &str,
        options: &LoadOptions,
    ) -> IoResult<Option<Vec<Image>>> {
        let magic = sniff::<3>(stream)?;
        let channels = match &magic[..2] {
            b"P5" => 1,
            b"P6" => 3,
            _ => return Ok(None),
        };
        if !magic[2].is_ascii_whitespace() {
            return Ok(None);
        }

        let mut reader = BufReader::new(stream);
        read_token(&mut reader)?;
        let width: usize = parse_token(&mut reader, "width")?;
        let height: usize = parse_token(&mut reader, "height")?;
        let maxval: u32 = parse_token(&mut reader, "maxval")?;
        if width == 0 || height == 0 || !(1..=65535).contains(&maxval) {
            return Err(IoError::DecodeError(format!("invalid PNM header {width}x{height} max {maxval}")));
        }

        let samples = sample_count(width, height, channels)?;
        let bytes_per_sample = if maxval < 256 { 1 } else { 2 };
        ensure_remaining(&mut reader, (samples * bytes_per_sample) as u64)?;
        let mut raw: Vec<u8> = alloc_buffer(samples * bytes_per_sample)?;
        reader.read_exact(&mut raw)?;

        let scale = 1.0 / maxval as f32;
        let data: Vec<f32> = if bytes_per_sample == 1 {
            raw.iter().map(|&v| v as f32 * scale).collect()
        } else {
            raw.chunks_exact(2).map(|b| u16::from_be_bytes([b[0], b[1]]) as f32 * scale).collect()
        };

        info!("PNM {}x{}x{} max {}", width, height, channels, maxval);
        let mut image = linear_image(filename, width, height, channels, data, &ColorMetadata::default(), options);
        image.metadata.insert("loader".into(), "PNM".into());
        image.metadata.insert("maxval".into(), maxval.to_string());
        Ok(Some(vec![image]))
    }
}

/// Reads one whitespace-delimited header token, skipping `#` comments.
/// Consumes exactly one whitespace byte after the token.
pub(crate) fn read_token<R: BufRead>(reader: &mut R) -> IoResult<String> {
    let mut token = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        if reader.read(&mut byte)? == 0 {
            break;
        }
        match byte[0] {
            b'#' if token.is_empty() => {
                let mut comment = Vec::new();
                reader.read_until(b'\n', &mut comment)?;
            }
            c if c.is_ascii_whitespace() => {
                if !token.is_empty() {
                    break;
                }
            }
            c => {
                token.push(c);
                if token.len() > 32 {
                    return Err(IoError::DecodeError("header token too long".into()));
                }
            }
        }
    }
    if token.is_empty() {
        return Err(IoError::DecodeError("unexpected end of header".into()));
    }
    String::from_utf8(token).map_err(|_| IoError::DecodeError("header is not ASCII".into()))
}

/// Reads and parses one header token.
pub(crate) fn parse_token<R: BufRead, T: std::str::FromStr>(reader: &mut R, what: &str) -> IoResult<T> {
    let token = read_token(reader)?;
    token
        .parse()
        .map_err(|_| IoError::DecodeError(format!("invalid {what} '{token}'")))
}
