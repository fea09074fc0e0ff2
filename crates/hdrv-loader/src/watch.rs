//! Watched directories and the set of files already seen in them.

use crate::error::{LoaderError, LoaderResult};
use hdrv_core::natural_cmp;
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{trace, warn};

/// Loadable regular files directly inside `dir`, in natural name order.
pub fn list_loadable(dir: &Path, is_loadable: impl Fn(&Path) -> bool) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        if is_loadable(&path) {
            files.push(path);
        }
    }
    files.sort_by(|a, b| natural_cmp(&a.to_string_lossy(), &b.to_string_lossy()));
    Ok(files)
}

/// Directories polled for new files.
///
/// Files in `known` are never reported as new: they were loaded already,
/// present when watching began, or closed by the user afterwards.
#[derive(Debug, Default, Clone)]
pub struct WatchedDirectories {
    dirs: BTreeSet<PathBuf>,
    known: BTreeSet<PathBuf>,
}

impl WatchedDirectories {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts watching `dir` and returns its canonical path. With
    /// `ignore_existing`, files already present are marked known.
    pub fn watch(
        &mut self,
        dir: &Path,
        ignore_existing: bool,
        is_loadable: impl Fn(&Path) -> bool,
    ) -> LoaderResult<PathBuf> {
        let canon = fs::canonicalize(dir).map_err(|source| LoaderError::Watch { path: dir.to_path_buf(), source })?;
        trace!("Watching '{}'", canon.display());
        if ignore_existing {
            let existing = list_loadable(&canon, is_loadable)
                .map_err(|source| LoaderError::Watch { path: canon.clone(), source })?;
            self.known.extend(existing);
        }
        self.dirs.insert(canon.clone());
        Ok(canon)
    }

    /// Stops watching every directory matching `pred`, then forgets known
    /// files whose parent is no longer watched.
    pub fn unwatch_if(&mut self, mut pred: impl FnMut(&Path) -> bool) {
        self.dirs.retain(|d| !pred(d.as_path()));
        let dirs = &self.dirs;
        self.known.retain(|f| f.parent().is_some_and(|p| dirs.contains(p)));
    }

    /// Watched directories.
    pub fn watched(&self) -> impl Iterator<Item = &Path> {
        self.dirs.iter().map(PathBuf::as_path)
    }

    /// True if `dir` (canonicalized) is watched.
    pub fn is_watched(&self, dir: &Path) -> bool {
        self.dirs.contains(dir)
    }

    /// True if `file` has been seen.
    pub fn is_known(&self, file: &Path) -> bool {
        self.known.contains(file)
    }

    /// Marks `file` as seen.
    pub fn mark_known(&mut self, file: PathBuf) {
        self.known.insert(file);
    }

    /// Removes `file` from the seen set.
    pub fn forget(&mut self, file: &Path) {
        self.known.remove(file);
    }

    /// Loadable files in watched directories not seen before. They are
    /// marked known before returning. Directories that can no longer be
    /// read are dropped.
    pub fn scan_new(&mut self, is_loadable: impl Fn(&Path) -> bool) -> Vec<PathBuf> {
        let mut new_files = Vec::new();
        let mut vanished = Vec::new();
        for dir in &self.dirs {
            match list_loadable(dir, &is_loadable) {
                Ok(files) => new_files.extend(files.into_iter().filter(|f| !self.known.contains(f))),
                Err(e) => {
                    warn!("Watched directory '{}' is no longer readable: {}", dir.display(), e);
                    vanished.push(dir.clone());
                }
            }
        }
        for dir in vanished {
            self.dirs.remove(&dir);
        }
        self.known.extend(new_files.iter().cloned());
        new_files
    }
}
