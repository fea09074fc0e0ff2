//! End-to-end loader scenarios on temporary directories.

use hdrv_core::ImageCollection;
use hdrv_io::{DecoderRegistry, LoadOptions};
use hdrv_loader::{BackgroundLoader, Delivery, LoaderConfig};
use std::fs::{self, File};
use std::io::{BufWriter, Cursor, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

fn png_bytes(value: u8) -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, 2, 2);
        encoder.set_color(png::ColorType::Grayscale);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(&[value; 4]).unwrap();
    }
    out
}

fn write_png(path: &Path, value: u8) {
    let mut file = BufWriter::new(File::create(path).unwrap());
    file.write_all(&png_bytes(value)).unwrap();
}

fn loader() -> BackgroundLoader {
    BackgroundLoader::new(Arc::new(DecoderRegistry::default()), LoaderConfig::in_memory())
}

fn select() -> Delivery {
    Delivery { should_select: true, replace: None }
}

fn file_name(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}

#[test]
fn directory_is_loaded_in_natural_order() {
    let dir = TempDir::new().unwrap();
    for name in ["b.png", "a.png", "c10.png", "c2.png"] {
        write_png(&dir.path().join(name), 10);
    }
    fs::write(dir.path().join("readme.txt"), "not an image").unwrap();

    let mut loader = loader();
    let n = loader.schedule(&dir.path().to_string_lossy(), None, select(), &LoadOptions::default());
    assert_eq!(n, 4);

    let order: Vec<_> = loader.pending_filenames().map(|f| file_name(f).to_string()).collect();
    assert_eq!(order, ["a.png", "b.png", "c2.png", "c10.png"]);

    let mut delivered = Vec::new();
    loader.drain_blocking(|image, replace, should_select| {
        assert!(replace.is_none());
        delivered.push((file_name(&image.filename).to_string(), should_select));
    });
    delivered.sort();
    assert_eq!(
        delivered,
        [
            ("a.png".to_string(), true),
            ("b.png".to_string(), false),
            ("c10.png".to_string(), false),
            ("c2.png".to_string(), false),
        ]
    );
    assert_eq!(loader.num_pending(), 0);
    // the directory itself goes to the recent list, not its files
    assert_eq!(loader.recent().len(), 1);
    assert_eq!(loader.watched().watched().count(), 1);
}

#[test]
fn zip_members_are_filtered() {
    let dir = TempDir::new().unwrap();
    let zip_path = dir.path().join("photos.zip");
    {
        let mut w = zip::ZipWriter::new(File::create(&zip_path).unwrap());
        let opts = zip::write::SimpleFileOptions::default();
        w.start_file("x.png", opts).unwrap();
        w.write_all(&png_bytes(200)).unwrap();
        w.start_file("notes.txt", opts).unwrap();
        w.write_all(b"hello").unwrap();
        w.start_file(".hidden.png", opts).unwrap();
        w.write_all(&png_bytes(1)).unwrap();
        w.finish().unwrap();
    }

    let mut loader = loader();
    let zip_name = zip_path.to_string_lossy().into_owned();
    assert_eq!(loader.schedule(&zip_name, None, select(), &LoadOptions::default()), 1);

    let mut names = Vec::new();
    loader.drain_blocking(|image, _, _| names.push(image.filename));
    assert_eq!(names, [format!("{zip_name}/x.png")]);
    assert_eq!(loader.recent().get(0), Some(zip_name.as_str()));

    // a single member by path
    let member = format!("{zip_name}/x.png");
    assert_eq!(loader.schedule(&member, None, select(), &LoadOptions::default()), 1);
    assert_eq!(loader.drain_blocking(|_, _, _| {}), 1);
}

#[test]
fn zip_from_buffer() {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut w = zip::ZipWriter::new(&mut buf);
        w.start_file("dir/y.png", zip::write::SimpleFileOptions::default()).unwrap();
        w.write_all(&png_bytes(7)).unwrap();
        w.finish().unwrap();
    }
    let mut loader = loader();
    let n = loader.schedule("upload.zip", Some(buf.into_inner()), select(), &LoadOptions::default());
    assert_eq!(n, 1);
    let mut names = Vec::new();
    loader.drain_blocking(|image, _, _| names.push(image.filename));
    assert_eq!(names, ["upload.zip/dir/y.png"]);
}

#[test]
fn oversized_zip_member_does_not_stop_the_others() {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut w = zip::ZipWriter::new(&mut buf);
        for name in ["bomb.png", "fine.png"] {
            w.start_file(name, zip::write::SimpleFileOptions::default()).unwrap();
            w.write_all(&png_bytes(3)).unwrap();
        }
        w.finish().unwrap();
    }
    let mut bytes = buf.into_inner();
    // claim almost 4 GiB for the first member
    let central = bytes.windows(4).position(|w| w == b"PK\x01\x02").unwrap();
    bytes[central + 24..central + 28].copy_from_slice(&0xFFFF_FFFEu32.to_le_bytes());

    let mut loader = loader();
    assert_eq!(loader.schedule("upload.zip", Some(bytes), select(), &LoadOptions::default()), 1);
    let mut names = Vec::new();
    loader.drain_blocking(|image, _, _| names.push(image.filename));
    assert_eq!(names, ["upload.zip/fine.png"]);
}

#[test]
fn polling_without_changes_is_idle() {
    let dir = TempDir::new().unwrap();
    write_png(&dir.path().join("one.png"), 50);

    let mut loader = loader();
    let mut images = ImageCollection::new();
    loader.schedule(&dir.path().to_string_lossy(), None, select(), &LoadOptions::default());
    loader.drain_blocking(|image, replace, should_select| {
        images.insert(image, replace, should_select);
    });
    assert_eq!(images.len(), 1);

    assert_eq!(loader.poll_for_changes(&mut images, &LoadOptions::default()), 0);
    assert_eq!(loader.poll_for_changes(&mut images, &LoadOptions::default()), 0);
    assert_eq!(loader.num_pending(), 0);
}

#[test]
fn polling_finds_new_and_modified_files() {
    let dir = TempDir::new().unwrap();
    let first = dir.path().join("first.png");
    write_png(&first, 50);

    let mut loader = loader();
    let mut images = ImageCollection::new();
    loader.schedule(&first.to_string_lossy(), None, select(), &LoadOptions::default());
    loader.drain_blocking(|image, replace, should_select| {
        images.insert(image, replace, should_select);
    });
    let original_id = images.images()[0].id;

    loader.watch(dir.path(), true).unwrap();
    write_png(&dir.path().join("second.png"), 60);

    // push the cached time into the past so the file looks modified
    images.get_mut(0).unwrap().last_modified = Some(SystemTime::UNIX_EPOCH + Duration::from_secs(1));

    assert_eq!(loader.poll_for_changes(&mut images, &LoadOptions::default()), 2);
    loader.drain_blocking(|image, replace, should_select| {
        images.insert(image, replace, should_select);
    });

    assert_eq!(images.len(), 2);
    assert!(images.position(original_id).is_none());
    assert_eq!(loader.poll_for_changes(&mut images, &LoadOptions::default()), 0);
}

#[test]
fn corrupt_file_stays_out_of_recent() {
    let dir = TempDir::new().unwrap();
    let good = dir.path().join("good.png");
    let bad = dir.path().join("bad.png");
    write_png(&good, 1);
    let mut truncated = png_bytes(1);
    truncated.truncate(20);
    fs::write(&bad, truncated).unwrap();

    let mut loader = loader();
    let bad_name = bad.to_string_lossy().into_owned();
    let good_name = good.to_string_lossy().into_owned();
    loader.schedule(&bad_name, None, Delivery::default(), &LoadOptions::default());
    loader.schedule(&good_name, None, Delivery::default(), &LoadOptions::default());

    let mut names = Vec::new();
    assert_eq!(loader.drain_blocking(|image, _, _| names.push(image.filename)), 1);
    assert_eq!(names, [good_name.clone()]);
    assert!(!loader.recent().contains(&bad_name));
    assert!(loader.recent().contains(&good_name));
}

#[test]
fn missing_file_starts_nothing() {
    let mut loader = loader();
    assert_eq!(loader.schedule("/no/such/image.exr", None, select(), &LoadOptions::default()), 0);
    assert_eq!(loader.num_pending(), 0);
}

#[test]
fn nonblocking_drain_eventually_delivers() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("p.png");
    write_png(&path, 3);

    let mut loader = loader();
    loader.schedule(&path.to_string_lossy(), None, select(), &LoadOptions::default());
    let mut got = 0;
    for _ in 0..500 {
        got += loader.drain(|_, _, _| {});
        if loader.num_pending() == 0 {
            break;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    assert_eq!(got, 1);
}

#[test]
fn recent_files_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("r.png");
    write_png(&path, 3);

    let mut loader = loader();
    assert!(loader.load_recent(0, &LoadOptions::default()).is_err());
    loader.recent_mut().add(path.to_string_lossy());
    assert_eq!(loader.load_recent(0, &LoadOptions::default()).unwrap(), 1);
    assert_eq!(loader.drain_blocking(|_, _, select| assert!(select)), 1);
}
