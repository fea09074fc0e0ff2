//! Zip archive extraction.
//!
//! Archive members are addressed as `archive_path/entry_path`.

use crate::error::LoaderResult;
use std::io::{Read, Seek};
use std::path::Path;
use tracing::{debug, info, trace, warn};
use zip::ZipArchive;

/// Members larger than this, declared or actual, are skipped.
pub const MAX_ENTRY_SIZE: u64 = 1 << 30;

/// Upper bound for the up-front buffer reservation of one member.
const INITIAL_RESERVE: u64 = 64 << 20;

/// A decoded-later archive member.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    /// `archive_path/entry_path`.
    pub name: String,
    /// Uncompressed bytes.
    pub data: Vec<u8>,
}

/// True if `name` has a `.zip` extension.
pub fn is_zip(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"))
}

/// Splits `archive.zip/entry.png` into `("archive.zip", Some("entry.png"))`
/// and `archive.zip` into `("archive.zip", None)`. Other names yield `None`.
pub fn split_zip_entry(name: &str) -> Option<(&str, Option<&str>)> {
    if is_zip(name) {
        return Some((name, None));
    }
    let pos = name.to_ascii_lowercase().find(".zip/")? + 4;
    Some((&name[..pos], Some(&name[pos + 1..])))
}

fn is_hidden(entry: &str) -> bool {
    entry
        .split('/')
        .any(|part| part.starts_with('.') || part.eq_ignore_ascii_case("__MACOSX"))
}

/// Extracts loadable members of the archive in `reader`, in archive order.
///
/// Directories, hidden entries, entries `is_loadable` rejects and entries
/// above [`MAX_ENTRY_SIZE`] are skipped. With `only`, just the member with
/// that exact path is extracted.
pub fn extract<R: Read + Seek>(
    reader: R,
    archive_name: &str,
    only: Option<&str>,
    is_loadable: impl Fn(&str) -> bool,
) -> LoaderResult<Vec<ArchiveEntry>> {
    let mut archive = ZipArchive::new(reader)?;
    info!("Zip '{}' contains {} files", archive_name, archive.len());

    let mut entries = Vec::new();
    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        let name = file.name().to_string();

        if file.is_dir() {
            continue;
        }
        if only.is_some_and(|o| o != name) {
            continue;
        }
        if is_hidden(&name) || !is_loadable(&name) {
            trace!("Skipping '{}' in '{}'", name, archive_name);
            continue;
        }

        let declared = file.size();
        if declared > MAX_ENTRY_SIZE {
            warn!("Skipping '{}' in '{}': declares {} bytes", name, archive_name, declared);
            continue;
        }

        let mut data = Vec::new();
        data.try_reserve(declared.min(INITIAL_RESERVE) as usize)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::OutOfMemory, e))?;
        file.by_ref().take(MAX_ENTRY_SIZE + 1).read_to_end(&mut data)?;
        if data.len() as u64 > MAX_ENTRY_SIZE {
            warn!("Skipping '{}' in '{}': larger than {} bytes", name, archive_name, MAX_ENTRY_SIZE);
            continue;
        }
        debug!("Extracted '{}' ({} bytes)", name, data.len());
        entries.push(ArchiveEntry { name: format!("{archive_name}/{name}"), data });

        if only.is_some() {
            break;
        }
    }

    if entries.is_empty() {
        warn!("No loadable images found in '{}'", archive_name);
    }
    Ok(entries)
}
