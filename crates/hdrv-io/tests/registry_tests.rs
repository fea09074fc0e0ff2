//! Integration tests for DecoderRegistry against files on disk.

use approx::assert_relative_eq;
use hdrv_color::{ColorGamut, TransferFunction};
use hdrv_io::{DecoderRegistry, IoError, LoadOptions};
use std::fs::File;
use std::io::{BufWriter, Cursor, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Writes an 8-bit RGB PNG with no color chunks.
fn write_png(path: &Path, width: u32, height: u32, rgb: &[u8]) {
    let file = BufWriter::new(File::create(path).unwrap());
    let mut encoder = png::Encoder::new(file, width, height);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header().unwrap();
    writer.write_image_data(rgb).unwrap();
}

fn write_bytes(dir: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    File::create(&path).unwrap().write_all(bytes).unwrap();
    path
}

#[test]
fn png_is_decoded_linearized_and_grouped() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ramp.png");
    write_png(&path, 2, 1, &[0, 128, 255, 255, 0, 128]);

    let images = DecoderRegistry::default().decode_file(&path, &LoadOptions::default()).unwrap();
    assert_eq!(images.len(), 1);
    let image = &images[0];

    assert_eq!(image.size(), (2, 1));
    let names: Vec<_> = image.channels.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["R", "G", "B"]);
    assert_eq!(image.groups.len(), 1);
    assert_eq!(image.groups[0].name, "R,G,B");
    assert_eq!(image.metadata.get("loader").map(String::as_str), Some("PNG"));
    assert!(image.last_modified.is_some());

    let g = image.channels[1].data();
    assert_relative_eq!(g[0], TransferFunction::Srgb.linearize(128.0 / 255.0), epsilon = 1e-5);
    assert_relative_eq!(g[1], 0.0);
    assert_relative_eq!(image.channels[0].data()[0], 0.0);
    assert_relative_eq!(image.channels[2].data()[0], 1.0, epsilon = 1e-6);
}

/// Two-part EXR: an RGBA beauty part offset inside the display window and
/// an aux part with a layered RGB triple and a depth channel.
fn multi_part_exr() -> Vec<u8> {
    use exr::prelude::{
        AnyChannel, AnyChannels, Encoding, FlatSamples, Image, ImageAttributes, IntegerBounds, Layer,
        LayerAttributes, SmallVec, Vec2, WritableImage,
    };

    let plane = |name: &str, value: f32, len: usize| AnyChannel::new(name, FlatSamples::F32(vec![value; len]));

    let mut beauty_attrs = LayerAttributes::named("beauty");
    beauty_attrs.layer_position = Vec2(2, 1);
    let beauty = Layer::new(
        Vec2(4, 3),
        beauty_attrs,
        Encoding::FAST_LOSSLESS,
        AnyChannels::sort(SmallVec::from_vec(vec![
            plane("R", 0.5, 12),
            plane("G", 0.25, 12),
            plane("B", 2.0, 12),
            plane("A", 1.0, 12),
        ])),
    );
    let aux = Layer::new(
        Vec2(8, 6),
        LayerAttributes::named("aux"),
        Encoding::FAST_LOSSLESS,
        AnyChannels::sort(SmallVec::from_vec(vec![
            plane("diffuse.R", 0.1, 48),
            plane("diffuse.G", 0.2, 48),
            plane("diffuse.B", 0.3, 48),
            plane("depth.Z", 10.0, 48),
        ])),
    );

    let image = Image::empty(ImageAttributes::new(IntegerBounds::from_dimensions(Vec2(8, 6))))
        .with_layer(beauty)
        .with_layer(aux);
    let mut out = Cursor::new(Vec::new());
    image.write().to_buffered(&mut out).unwrap();
    out.into_inner()
}

#[test]
fn exr_parts_become_images() {
    let mut stream = Cursor::new(multi_part_exr());
    let images = DecoderRegistry::default().decode(&mut stream, "shot.exr", &LoadOptions::default()).unwrap();
    assert_eq!(images.len(), 2);

    let parts: Vec<_> = images.iter().map(|i| i.partname.as_str()).collect();
    assert_eq!(parts, ["beauty", "aux"]);

    let beauty = &images[0];
    assert_eq!(beauty.size(), (4, 3));
    assert_eq!(beauty.data_window.min, [2, 1]);
    assert_eq!(beauty.data_window.max, [6, 4]);
    assert_eq!(beauty.display_window.size(), (8, 6));
    assert_eq!(beauty.channels.len(), 4);
    let groups: Vec<_> = beauty.groups.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(groups, ["R,G,B,A"]);
    let r = beauty.channel_index("R").unwrap();
    assert_relative_eq!(beauty.channels[r].data()[0], 0.5);
    assert_eq!(beauty.metadata.get("loader").map(String::as_str), Some("OpenEXR"));

    let aux = &images[1];
    assert_eq!(aux.size(), (8, 6));
    assert_eq!(aux.data_window.min, [0, 0]);
    assert_eq!(aux.channels.len(), 4);
    let mut groups: Vec<_> = aux.groups.iter().map(|g| g.name.as_str()).collect();
    groups.sort();
    assert_eq!(groups, ["R,G,B", "Z"]);
    let z = aux.channel_index("depth.Z").unwrap();
    assert_relative_eq!(aux.channels[z].data()[47], 10.0);
}

#[test]
fn exr_channel_selector_applies_per_part() {
    let mut stream = Cursor::new(multi_part_exr());
    let opts = LoadOptions::with_channel_selector("diffuse");
    let images = DecoderRegistry::default().decode(&mut stream, "shot.exr", &opts).unwrap();
    // the beauty part has no matching channels and is dropped
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].partname, "aux");
    assert_eq!(images[0].channels.len(), 3);
}

fn encode_jpeg(width: u16, height: u16, color: jpeg_encoder::ColorType, data: &[u8]) -> Vec<u8> {
    let mut buffer = Vec::new();
    jpeg_encoder::Encoder::new(&mut buffer, 95).encode(data, width, height, color).unwrap();
    buffer
}

#[test]
fn jpeg_rgb_is_decoded() {
    let bytes = encode_jpeg(16, 8, jpeg_encoder::ColorType::Rgb, &[128; 16 * 8 * 3]);
    let images = DecoderRegistry::default()
        .decode(&mut Cursor::new(bytes), "photo.jpg", &LoadOptions::default())
        .unwrap();
    assert_eq!(images.len(), 1);
    let image = &images[0];

    assert_eq!(image.size(), (16, 8));
    assert_eq!(image.channels.len(), 3);
    assert_eq!(image.groups[0].name, "R,G,B");
    assert_eq!(image.metadata.get("loader").map(String::as_str), Some("JPEG"));
    let expected = TransferFunction::Srgb.linearize(128.0 / 255.0);
    assert_relative_eq!(image.channels[1].data()[0], expected, epsilon = 0.02);
}

#[test]
fn jpeg_gray_is_one_channel() {
    let bytes = encode_jpeg(8, 8, jpeg_encoder::ColorType::Luma, &[255; 64]);
    let images = DecoderRegistry::default()
        .decode(&mut Cursor::new(bytes), "mask.jpg", &LoadOptions::default())
        .unwrap();
    assert_eq!(images[0].size(), (8, 8));
    assert_eq!(images[0].channels.len(), 1);
    assert_relative_eq!(images[0].channels[0].data()[0], 1.0, epsilon = 0.02);
}

#[test]
fn transfer_override_skips_srgb_curve() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("flat.png");
    write_png(&path, 1, 1, &[128, 128, 128]);

    let opts = LoadOptions { tf_override: Some(TransferFunction::Linear), ..Default::default() };
    let images = DecoderRegistry::default().decode_file(&path, &opts).unwrap();
    assert_relative_eq!(images[0].channels[0].data()[0], 128.0 / 255.0, epsilon = 1e-6);
}

#[test]
fn extension_does_not_drive_dispatch() {
    // PFM content under a misleading name is still found by sniffing
    let dir = TempDir::new().unwrap();
    let mut bytes = b"Pf\n1 1\n-1.0\n".to_vec();
    bytes.extend_from_slice(&0.75f32.to_le_bytes());
    let path = write_bytes(&dir, "actually_pfm.png", &bytes);

    let images = DecoderRegistry::default().decode_file(&path, &LoadOptions::default()).unwrap();
    assert_eq!(images[0].metadata.get("loader").map(String::as_str), Some("PFM"));
    assert_relative_eq!(images[0].channels[0].data()[0], 0.75);
}

#[test]
fn unknown_content_is_unsupported() {
    let dir = TempDir::new().unwrap();
    let path = write_bytes(&dir, "notes.txt", b"hello, world");
    let err = DecoderRegistry::default().decode_file(&path, &LoadOptions::default()).unwrap_err();
    assert!(matches!(err, IoError::UnsupportedFormat(_)), "{err}");
}

#[test]
fn corrupt_png_fails_without_fallback() {
    let dir = TempDir::new().unwrap();
    let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    bytes.extend_from_slice(&[0xde, 0xad, 0xbe, 0xef, 0, 0, 0, 0]);
    let path = write_bytes(&dir, "broken.png", &bytes);

    let mut registry = DecoderRegistry::default();
    let err = registry.decode_file(&path, &LoadOptions::default()).unwrap_err();
    assert!(matches!(err, IoError::DecodeError(_)), "{err}");

    registry.set_enabled("PNG", false);
    let err = registry.decode_file(&path, &LoadOptions::default()).unwrap_err();
    assert!(matches!(err, IoError::UnsupportedFormat(_)), "{err}");
}

#[test]
fn missing_file_is_io_error() {
    let err = DecoderRegistry::default()
        .decode_file("/definitely/not/here.exr", &LoadOptions::default())
        .unwrap_err();
    assert!(matches!(err, IoError::Io(_)));
}

#[test]
fn channel_selector_is_applied() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sel.png");
    write_png(&path, 1, 1, &[10, 20, 30]);

    let opts = LoadOptions::with_channel_selector("-G");
    let images = DecoderRegistry::default().decode_file(&path, &opts).unwrap();
    let image = &images[0];
    let names: Vec<_> = image.channels.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["R", "B"]);
    assert_eq!(image.channel_selector, "-G");
    // R and B alone form no color pattern
    assert_eq!(image.groups.len(), 2);
}

#[test]
fn load_options_from_yaml() {
    let yaml = "channel_selector: diffuse\ntf_override: Linear\ngamut_override: Bt709\nkeep_native_primaries: true\n";
    let opts: LoadOptions = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(opts.channel_selector, "diffuse");
    assert_eq!(opts.tf_override, Some(TransferFunction::Linear));
    assert_eq!(opts.gamut_override, Some(ColorGamut::Bt709));
    assert!(opts.keep_native_primaries);

    let empty: LoadOptions = serde_yaml::from_str("{}").unwrap();
    assert_eq!(empty, LoadOptions::default());
}
