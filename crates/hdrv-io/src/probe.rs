//! The probe contract shared by all format decoders.

use crate::error::{IoError, IoResult};
use crate::options::LoadOptions;
use hdrv_color::{linearize_interleaved, resolve, ColorMetadata};
use hdrv_core::Image;
use std::io::{Read, Seek, SeekFrom};

/// Largest image, in pixels, a built-in probe will allocate for.
pub const MAX_PIXELS: usize = 1 << 28;

/// A seekable byte source.
pub trait ReadSeek: Read + Seek {}

impl<T: Read + Seek + ?Sized> ReadSeek for T {}

/// A format-specific sniff-then-decode unit.
pub trait Probe: Send + Sync {
    /// Display name, unique within a registry.
    fn name(&self) -> &'static str;

    /// Lower-case file extensions this probe usually handles.
    fn extensions(&self) -> &'static [&'static str];

    /// Decodes `stream` if it is in this probe's format.
    ///
    /// Returns `Ok(None)` when the stream is not recognized; that check must
    /// be cheap and never fail for foreign data. Once recognized, any
    /// failure is an error. The stream is positioned at offset 0 on entry.
    fn try_decode(
        &self,
        stream: &mut dyn ReadSeek,
        filename: &str,
        options: &LoadOptions,
    ) -> IoResult<Option<Vec<Image>>>;
}

/// Reads up to `N` leading bytes and rewinds. Short streams yield a
/// zero-padded prefix.
pub(crate) fn sniff<const N: usize>(stream: &mut dyn ReadSeek) -> IoResult<[u8; N]> {
    let mut magic = [0u8; N];
    let mut filled = 0;
    while filled < N {
        match stream.read(&mut magic[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    stream.rewind()?;
    Ok(magic)
}

/// Checked `width * height * channels` for a header-declared image.
///
/// Fails for overflowing sizes and for images above [`MAX_PIXELS`].
pub(crate) fn sample_count(width: usize, height: usize, channels: usize) -> IoResult<usize> {
    width
        .checked_mul(height)
        .filter(|&pixels| pixels <= MAX_PIXELS)
        .and_then(|pixels| pixels.checked_mul(channels))
        .ok_or_else(|| IoError::DecodeError(format!("image size {width}x{height}x{channels} is too large")))
}

/// Zero-filled buffer of `len` elements. Allocation failure is a decode
/// error rather than an abort.
pub(crate) fn alloc_buffer<T: Clone + Default>(len: usize) -> IoResult<Vec<T>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|e| IoError::DecodeError(format!("cannot allocate {len} samples: {e}")))?;
    buf.resize(len, T::default());
    Ok(buf)
}

/// Fails unless at least `needed` bytes remain after the current position.
pub(crate) fn ensure_remaining<S: Seek + ?Sized>(stream: &mut S, needed: u64) -> IoResult<()> {
    let pos = stream.stream_position()?;
    let end = stream.seek(SeekFrom::End(0))?;
    stream.seek(SeekFrom::Start(pos))?;
    let left = end.saturating_sub(pos);
    if left < needed {
        return Err(IoError::DecodeError(format!("pixel data needs {needed} bytes, stream has {left}")));
    }
    Ok(())
}

/// Resolves color for decoded samples, linearizes them in place and builds
/// the image.
pub(crate) fn linear_image(
    filename: &str,
    width: usize,
    height: usize,
    num_channels: usize,
    mut data: Vec<f32>,
    meta: &ColorMetadata,
    options: &LoadOptions,
) -> Image {
    let resolved = resolve(meta, &options.color_overrides());
    linearize_interleaved(&mut data, num_channels, &resolved.transfer);
    let mut image = Image::from_interleaved(filename, width, height, num_channels, &data);
    image.color = resolved.transform();
    image.resolved_color = Some(resolved);
    image
}
