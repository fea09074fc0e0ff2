//! Radiance RGBE (`.hdr`, `.pic`) probe.

use crate::error::{IoError, IoResult};
use crate::options::LoadOptions;
use crate::probe::{alloc_buffer, ensure_remaining, linear_image, sample_count, sniff, Probe, ReadSeek};
use hdrv_color::{Chromaticities, ColorMetadata};
use hdrv_core::Image;
use std::collections::BTreeMap;
use std::io::{BufRead, BufReader, Read};
use tracing::{debug, info};

/// Radiance HDR with flat or run-length encoded scanlines.
#[derive(Debug, Default)]
pub struct HdrProbe;

impl Probe for HdrProbe {
    fn name(&self) -> &'static str {
        "Radiance HDR"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["hdr", "pic"]
    }

    fn try_decode(
        &self,
        stream: &mut dyn ReadSeek,
        filename: &str,
        options: &LoadOptions,
    ) -> IoResult<Option<Vec<Image>>> {
        if &sniff::<2>(stream)? != b"#?" {
            return Ok(None);
        }

        let mut reader = BufReader::new(stream);
        let header = read_header(&mut reader)?;
        // every scanline starts with at least four bytes
        ensure_remaining(&mut reader, header.height as u64 * 4)?;
        let data = read_pixels(&mut reader, header.width, header.height)?;

        let meta = ColorMetadata { chromaticities: header.primaries, ..ColorMetadata::linear() };
        info!("Radiance HDR {}x{}", header.width, header.height);
        let mut image = linear_image(filename, header.width, header.height, 3, data, &meta, options);
        image.metadata.insert("loader".into(), "Radiance HDR".into());
        image.metadata.extend(header.attrs);
        Ok(Some(vec![image]))
    }
}

struct Header {
    width: usize,
    height: usize,
    primaries: Option<Chromaticities>,
    attrs: BTreeMap<String, String>,
}

fn read_header<R: BufRead>(reader: &mut R) -> IoResult<Header> {
    let mut attrs = BTreeMap::new();
    let mut primaries = None;
    let mut line = String::new();

    reader.read_line(&mut line)?;
    let program = trim_line(&line).trim_start_matches("#?");
    if !program.is_empty() {
        attrs.insert("program".to_string(), program.to_string());
    }

    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Err(IoError::DecodeError("HDR header ends before resolution line".into()));
        }
        let line = trim_line(&line);
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('+') || line.starts_with('-') {
            let (width, height) = parse_resolution(line)
                .ok_or_else(|| IoError::DecodeError(format!("invalid HDR resolution line '{line}'")))?;
            return Ok(Header { width, height, primaries, attrs });
        }

        let Some((key, value)) = line.split_once('=') else { continue };
        let (key, value) = (key.trim().to_uppercase(), value.trim());
        match key.as_str() {
            "FORMAT" if value != "32-bit_rle_rgbe" => {
                return Err(IoError::DecodeError(format!("unsupported HDR pixel format '{value}'")));
            }
            "PRIMARIES" => {
                primaries = parse_primaries(value);
                debug!("HDR primaries {:?}", primaries);
            }
            _ => {}
        }
        attrs.insert(key.to_lowercase(), value.to_string());
    }
}

fn parse_primaries(value: &str) -> Option<Chromaticities> {
    let v: Vec<f32> = value.split_whitespace().filter_map(|s| s.parse().ok()).collect();
    match v[..] {
        [rx, ry, gx, gy, bx, by, wx, wy] => Some(Chromaticities::new((rx, ry), (gx, gy), (bx, by), (wx, wy))),
        _ => None,
    }
}

fn read_pixels<R: Read>(reader: &mut R, width: usize, height: usize) -> IoResult<Vec<f32>> {
    let mut rgbe: Vec<u8> = alloc_buffer(sample_count(width, height, 4)?)?;
    let mut scanline: Vec<u8> = alloc_buffer(width * 4)?;

    for y in 0..height {
        let mut first = [0u8; 4];
        reader.read_exact(&mut first)?;

        let rle = (8..=0x7fff).contains(&width)
            && first[0] == 2
            && first[1] == 2
            && (((first[2] as usize) << 8) | first[3] as usize) == width;

        if rle {
            decode_rle_scanline(reader, width, &mut scanline)?;
        } else {
            scanline[..4].copy_from_slice(&first);
            reader.read_exact(&mut scanline[4..])?;
        }
        rgbe[y * width * 4..(y + 1) * width * 4].copy_from_slice(&scanline);
    }

    Ok(rgbe
        .chunks_exact(4)
        .flat_map(|p| rgbe_to_rgb(p[0], p[1], p[2], p[3]))
        .collect())
}

/// Decodes one new-style RLE scanline into interleaved RGBE.
fn decode_rle_scanline<R: Read>(reader: &mut R, width: usize, out: &mut [u8]) -> IoResult<()> {
    let mut channel = vec![0u8; width];
    for c in 0..4 {
        let mut x = 0;
        while x < width {
            let mut count = [0u8; 1];
            reader.read_exact(&mut count)?;
            let count = count[0] as usize;
            let run = if count > 128 { count - 128 } else { count };
            if run == 0 || x + run > width {
                return Err(IoError::DecodeError("bad HDR run length".into()));
            }
            if count > 128 {
                let mut value = [0u8; 1];
                reader.read_exact(&mut value)?;
                channel[x..x + run].fill(value[0]);
            } else {
                reader.read_exact(&mut channel[x..x + run])?;
            }
            x += run;
        }
        for (px, &v) in out.chunks_exact_mut(4).zip(&channel) {
            px[c] = v;
        }
    }
    Ok(())
}

fn rgbe_to_rgb(r: u8, g: u8, b: u8, e: u8) -> [f32; 3] {
    if e == 0 {
        return [0.0; 3];
    }
    let f = 2.0_f32.powi(e as i32 - 136);
    [r as f32 * f, g as f32 * f, b as f32 * f]
}

fn parse_resolution(line: &str) -> Option<(usize, usize)> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let [a, av, b, bv] = parts[..] else { return None };
    let (mut width, mut height) = (0, 0);
    for (axis, value) in [(a, av), (b, bv)] {
        let value: usize = value.parse().ok()?;
        if axis.ends_with('X') {
            width = value;
        } else if axis.ends_with('Y') {
            height = value;
        }
    }
    (width > 0 && height > 0).then_some((width, height))
}

fn trim_line(line: &str) -> &str {
    line.trim_end_matches(['\r', '\n'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Cursor;

    #[test]
    fn resolution_line() {
        assert_eq!(parse_resolution("-Y 2 +X 3"), Some((3, 2)));
        assert_eq!(parse_resolution("+X 4 -Y 5"), Some((4, 5)));
        assert_eq!(parse_resolution("-Y 2"), None);
    }

    #[test]
    fn flat_scanlines() {
        let mut file = b"#?RADIANCE\nFORMAT=32-bit_rle_rgbe\nEXPOSURE=1.5\n\n-Y 1 +X 2\n".to_vec();
        // 1.0 is mantissa 128 at exponent 129
        file.extend_from_slice(&[128, 64, 0, 129, 0, 0, 0, 0]);
        let imgs = HdrProbe
            .try_decode(&mut Cursor::new(file), "x.hdr", &LoadOptions::default())
            .unwrap()
            .unwrap();
        let img = &imgs[0];
        assert_eq!(img.size(), (2, 1));
        assert_relative_eq!(img.channels[0].data()[0], 1.0, epsilon = 1e-6);
        assert_relative_eq!(img.channels[1].data()[0], 0.5, epsilon = 1e-6);
        assert_eq!(img.channels[0].data()[1], 0.0);
        assert_eq!(img.metadata["exposure"], "1.5");
        assert_eq!(img.metadata["program"], "RADIANCE");
    }

    #[test]
    fn rle_scanline() {
        let mut file = b"#?RADIANCE\n\n-Y 1 +X 8\n".to_vec();
        file.extend_from_slice(&[2, 2, 0, 8]);
        // each channel: a run of 8 identical bytes
        for v in [128u8, 128, 128, 129] {
            file.extend_from_slice(&[128 + 8, v]);
        }
        let imgs = HdrProbe
            .try_decode(&mut Cursor::new(file), "x.hdr", &LoadOptions::default())
            .unwrap()
            .unwrap();
        assert!(imgs[0].channels[2].data().iter().all(|&v| v == 1.0));
    }

    #[test]
    fn huge_header_is_an_error() {
        let mut file = b"#?RADIANCE\n\n-Y 100000000 +X 100000000\n".to_vec();
        file.extend_from_slice(&[0; 64]);
        let result = HdrProbe.try_decode(&mut Cursor::new(file), "x.hdr", &LoadOptions::default());
        assert!(matches!(result, Err(IoError::DecodeError(_))));
    }

    #[test]
    fn truncated_is_an_error() {
        let file = b"#?RADIANCE\n\n-Y 4 +X 4\n\x01\x02".to_vec();
        assert!(HdrProbe.try_decode(&mut Cursor::new(file), "x.hdr", &LoadOptions::default()).is_err());
    }
}
