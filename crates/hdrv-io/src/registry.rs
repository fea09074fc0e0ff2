//! Ordered, reorderable set of format probes.
//!
//! The registry is a plain value owned by the application and shared by
//! reference with whoever decodes. Probes are tried in order; the first
//! enabled probe that recognizes the stream and yields images wins.
//!
//! # Example
//!
//! ```rust
//! use hdrv_io::DecoderRegistry;
//!
//! let mut registry = DecoderRegistry::with_builtin();
//! assert_eq!(registry.names().next(), Some("OpenEXR"));
//!
//! registry.move_down("OpenEXR");
//! registry.set_enabled("JPEG", false);
//! assert!(!registry.is_loadable("photo.jpg"));
//! ```

use crate::error::{IoError, IoResult};
use crate::options::LoadOptions;
use crate::probe::{Probe, ReadSeek};
use crate::{ExrProbe, HdrProbe, JpegProbe, PfmProbe, PngProbe, PnmProbe};
use hdrv_core::{Image, TextFilter};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, trace, warn};

struct Entry {
    probe: Box<dyn Probe>,
    enabled: bool,
}

/// Ordered list of probes with per-entry enable flags.
pub struct DecoderRegistry {
    entries: Vec<Entry>,
}

impl Default for DecoderRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

impl std::fmt::Debug for DecoderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|e| (e.probe.name(), e.enabled)))
            .finish()
    }
}

impl DecoderRegistry {
    /// Registry without probes.
    pub fn empty() -> Self {
        Self { entries: Vec::new() }
    }

    /// Registry with every built-in probe enabled.
    pub fn with_builtin() -> Self {
        let mut r = Self::empty();
        r.register(ExrProbe);
        r.register(PngProbe);
        r.register(JpegProbe);
        #[cfg(feature = "tiff")]
        r.register(crate::TiffProbe);
        #[cfg(feature = "webp")]
        r.register(crate::RasterProbe::webp());
        #[cfg(feature = "qoi")]
        r.register(crate::RasterProbe::qoi());
        #[cfg(feature = "bmp")]
        r.register(crate::RasterProbe::bmp());
        r.register(HdrProbe);
        r.register(PfmProbe);
        r.register(PnmProbe);
        // no magic number, so last
        #[cfg(feature = "tga")]
        r.register(crate::RasterProbe::tga());
        r
    }

    /// Appends `probe`, enabled. A probe with the same name is replaced in
    /// place.
    pub fn register(&mut self, probe: impl Probe + 'static) {
        let entry = Entry { probe: Box::new(probe), enabled: true };
        match self.position(entry.probe.name()) {
            Some(i) => self.entries[i] = entry,
            None => self.entries.push(entry),
        }
    }

    /// Probe names in trial order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|e| e.probe.name())
    }

    /// Number of probes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no probe is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Probe called `name`.
    pub fn get(&self, name: &str) -> Option<&dyn Probe> {
        self.position(name).map(|i| self.entries[i].probe.as_ref())
    }

    /// Whether `name` is enabled; `None` if unknown.
    pub fn is_enabled(&self, name: &str) -> Option<bool> {
        self.position(name).map(|i| self.entries[i].enabled)
    }

    /// Enables or disables `name`. Returns false if unknown.
    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> bool {
        let Some(i) = self.position(name) else { return false };
        self.entries[i].enabled = enabled;
        true
    }

    /// Moves `name` one slot earlier. Returns false if it did not move.
    pub fn move_up(&mut self, name: &str) -> bool {
        match self.position(name) {
            Some(i) if i > 0 => {
                self.entries.swap(i, i - 1);
                true
            }
            _ => false,
        }
    }

    /// Moves `name` one slot later. Returns false if it did not move.
    pub fn move_down(&mut self, name: &str) -> bool {
        match self.position(name) {
            Some(i) if i + 1 < self.entries.len() => {
                self.entries.swap(i, i + 1);
                true
            }
            _ => false,
        }
    }

    /// Extensions handled by enabled probes.
    pub fn extensions(&self) -> BTreeSet<&'static str> {
        self.entries
            .iter()
            .filter(|e| e.enabled)
            .flat_map(|e| e.probe.extensions().iter().copied())
            .collect()
    }

    /// True if `path`'s extension belongs to an enabled probe.
    pub fn is_loadable(&self, path: impl AsRef<Path>) -> bool {
        path.as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions().contains(ext.to_ascii_lowercase().as_str()))
    }

    /// Decodes `stream` with the first enabled probe that recognizes it,
    /// then applies the channel selector and finalizes every image.
    ///
    /// A recognized stream that fails to decode is an error; no other
    /// probe is tried. An unrecognized stream is
    /// [`IoError::UnsupportedFormat`].
    pub fn decode(
        &self,
        stream: &mut dyn ReadSeek,
        filename: &str,
        options: &LoadOptions,
    ) -> IoResult<Vec<Image>> {
        let start = Instant::now();
        for entry in self.entries.iter().filter(|e| e.enabled) {
            let name = entry.probe.name();
            stream.rewind()?;
            match entry.probe.try_decode(stream, filename, options)? {
                None => trace!("{name} does not recognize '{filename}'"),
                Some(images) if images.is_empty() => debug!("{name} recognized '{filename}' but found no images"),
                Some(images) => {
                    info!("Detected {name} image '{filename}'");
                    return self.finish(images, options, start);
                }
            }
        }
        Err(IoError::UnsupportedFormat(format!("'{filename}' is not in any enabled format")))
    }

    /// Opens and decodes the file at `path`.
    pub fn decode_file(&self, path: impl AsRef<Path>, options: &LoadOptions) -> IoResult<Vec<Image>> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let modified = file.metadata().and_then(|m| m.modified()).ok();
        let mut images = self.decode(&mut BufReader::new(file), &path.to_string_lossy(), options)?;
        for image in &mut images {
            image.last_modified = modified;
        }
        Ok(images)
    }

    fn finish(&self, images: Vec<Image>, options: &LoadOptions, start: Instant) -> IoResult<Vec<Image>> {
        let selector = TextFilter::new(&options.channel_selector);
        let mut out = Vec::with_capacity(images.len());

        for mut image in images {
            if selector.is_active() {
                let prefix = if image.partname.is_empty() { String::new() } else { format!("{}.", image.partname) };
                image.channels.retain(|c| selector.pass(&format!("{prefix}{}", c.name)));
                if image.channels.is_empty() {
                    debug!(
                        "Skipping '{}': no channels match selector '{}'",
                        image.file_and_partname(),
                        options.channel_selector
                    );
                    continue;
                }
            }
            image.channel_selector = options.channel_selector.clone();
            image.finalize()?;
            image.load_time = start.elapsed();
            debug!("Loaded in {:.3} s:\n{}", image.load_time.as_secs_f32(), image);
            out.push(image);
        }

        if out.is_empty() {
            warn!("Every part was filtered out by channel selector '{}'", options.channel_selector);
        }
        Ok(out)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.probe.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};

    struct Fixed {
        name: &'static str,
        result: fn() -> IoResult<Option<Vec<Image>>>,
    }

    impl Probe for Fixed {
        fn name(&self) -> &'static str {
            self.name
        }
        fn extensions(&self) -> &'static [&'static str] {
            &["fix"]
        }
        fn try_decode(&self, stream: &mut dyn ReadSeek, _: &str, _: &LoadOptions) -> IoResult<Option<Vec<Image>>> {
            // consume some input so the registry has to rewind
            let mut b = [0u8; 2];
            let _ = stream.read(&mut b)?;
            assert_eq!(b[0], b'x', "stream was not rewound");
            (self.result)()
        }
    }

    fn one_image() -> IoResult<Option<Vec<Image>>> {
        Ok(Some(vec![Image::from_interleaved("f", 1, 1, 3, &[0.0; 3])]))
    }

    fn registry(probes: Vec<Fixed>) -> DecoderRegistry {
        let mut r = DecoderRegistry::empty();
        for p in probes {
            r.register(p);
        }
        r
    }

    #[test]
    fn first_recognizing_probe_wins() {
        let r = registry(vec![
            Fixed { name: "no", result: || Ok(None) },
            Fixed { name: "empty", result: || Ok(Some(vec![])) },
            Fixed { name: "yes", result: one_image },
            Fixed { name: "fails", result: || Err(IoError::DecodeError("boom".into())) },
        ]);
        let images = r.decode(&mut Cursor::new(b"xx".to_vec()), "f", &LoadOptions::default()).unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].groups.len(), 1);
    }

    #[test]
    fn recognized_failure_is_terminal() {
        let r = registry(vec![
            Fixed { name: "fails", result: || Err(IoError::DecodeError("boom".into())) },
            Fixed { name: "yes", result: one_image },
        ]);
        let err = r.decode(&mut Cursor::new(b"xx".to_vec()), "f", &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, IoError::DecodeError(_)));
    }

    #[test]
    fn nothing_recognized() {
        let mut r = registry(vec![Fixed { name: "no", result: || Ok(None) }, Fixed { name: "yes", result: one_image }]);
        r.set_enabled("yes", false);
        let err = r.decode(&mut Cursor::new(b"xx".to_vec()), "f", &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, IoError::UnsupportedFormat(_)));
    }

    #[test]
    fn reorder_and_lookup() {
        let mut r = DecoderRegistry::with_builtin();
        let names: Vec<_> = r.names().collect();
        assert_eq!(names[..3], ["OpenEXR", "PNG", "JPEG"]);
        assert!(names.contains(&"Radiance HDR") && names.contains(&"PFM") && names.contains(&"PNM"));
        assert!(!r.move_up("OpenEXR"));
        assert!(r.move_down("OpenEXR"));
        assert_eq!(r.names().take(2).collect::<Vec<_>>(), ["PNG", "OpenEXR"]);
        let last = names[names.len() - 1];
        assert!(!r.move_down(last));
        assert!(!r.set_enabled("Bogus", true));
        assert_eq!(r.is_enabled("PNG"), Some(true));
        assert!(r.get("PFM").is_some());

        assert!(r.is_loadable("/a/b/IMG.JPG"));
        assert!(!r.is_loadable("notes.txt"));
        assert!(!r.is_loadable("no_extension"));
    }

    #[cfg(all(feature = "tiff", feature = "webp", feature = "qoi", feature = "bmp", feature = "tga"))]
    #[test]
    fn crate_backed_formats_are_registered() {
        let r = DecoderRegistry::with_builtin();
        let names: Vec<_> = r.names().collect();
        for name in ["TIFF", "WebP", "QOI", "BMP"] {
            assert!(names.contains(&name), "{name} missing");
        }
        assert_eq!(names.last(), Some(&"TGA"));
        assert!(r.is_loadable("scan.TIF"));
        assert!(r.is_loadable("sprite.webp"));
    }

    #[test]
    fn selector_drops_channels() {
        let r = registry(vec![Fixed { name: "yes", result: one_image }]);
        let opts = LoadOptions::with_channel_selector("R,B");
        let images = r.decode(&mut Cursor::new(b"xx".to_vec()), "f", &opts).unwrap();
        let names: Vec<_> = images[0].channels.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["R", "B"]);
        assert_eq!(images[0].channel_selector, "R,B");

        let opts = LoadOptions::with_channel_selector("-R,-G,-B");
        let images = r.decode(&mut Cursor::new(b"xx".to_vec()), "f", &opts).unwrap();
        assert!(images.is_empty());
    }
}
