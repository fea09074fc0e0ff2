//! Bounded most-recently-used file list.
//!
//! Persisted as one `FileN=path` record per line, `File1` being the most
//! recent. Unknown or malformed lines are ignored on load.

use crate::config::DEFAULT_RECENT_CAPACITY;
use crate::error::{LoaderError, LoaderResult};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Most-recently-used list of file names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentFiles {
    // oldest first
    files: Vec<String>,
    capacity: usize,
}

impl Default for RecentFiles {
    fn default() -> Self {
        Self::new(DEFAULT_RECENT_CAPACITY)
    }
}

impl RecentFiles {
    /// Empty list holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self { files: Vec::new(), capacity: capacity.max(1) }
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// True if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Moves `file` to the most recent position, dropping the oldest
    /// entries beyond capacity.
    pub fn add(&mut self, file: impl Into<String>) {
        let file = file.into();
        self.files.retain(|f| *f != file);
        self.files.push(file);
        if self.files.len() > self.capacity {
            let excess = self.files.len() - self.capacity;
            self.files.drain(..excess);
        }
    }

    /// Removes every occurrence of `file`.
    pub fn remove(&mut self, file: &str) {
        self.files.retain(|f| f != file);
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.files.clear();
    }

    /// Replaces the list, newest first.
    pub fn set<I, S>(&mut self, newest_first: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files.clear();
        let mut incoming: Vec<String> = newest_first.into_iter().map(Into::into).collect();
        incoming.truncate(self.capacity);
        for f in incoming.into_iter().rev() {
            self.add(f);
        }
    }

    /// Entry `index`, where 0 is the most recent.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.files.iter().rev().nth(index).map(String::as_str)
    }

    /// True if `file` is in the list.
    pub fn contains(&self, file: &str) -> bool {
        self.files.iter().any(|f| f == file)
    }

    /// Entries, most recent first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.files.iter().rev().map(String::as_str)
    }

    /// Entries, most recent first, with long names shortened to
    /// `head...tail` (lengths in characters).
    pub fn shortened(&self, head: usize, tail: usize) -> Vec<String> {
        self.iter().map(|f| shorten(f, head, tail)).collect()
    }

    /// Parses `FileN=path` records.
    pub fn parse(&mut self, text: &str) {
        let mut numbered: Vec<(usize, &str)> = text
            .lines()
            .filter_map(|line| {
                let (key, value) = line.trim().split_once('=')?;
                let n = key.trim().strip_prefix("File")?.parse().ok()?;
                let value = value.trim();
                (!value.is_empty()).then_some((n, value))
            })
            .collect();
        numbered.sort_by_key(|&(n, _)| n);
        self.set(numbered.into_iter().map(|(_, f)| f));
    }

    /// Formats the list as `FileN=path` records.
    pub fn to_records(&self) -> String {
        let mut out = String::new();
        for (i, f) in self.iter().enumerate() {
            let _ = writeln!(out, "File{}={}", i + 1, f);
        }
        out
    }

    /// Reads `path`, replacing the current list. A missing file leaves
    /// the list empty.
    pub fn load(&mut self, path: &Path) -> LoaderResult<()> {
        match fs::read_to_string(path) {
            Ok(text) => {
                self.parse(&text);
                debug!("Restored {} recent files from '{}'", self.len(), path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                self.clear();
                Ok(())
            }
            Err(source) => Err(LoaderError::Recent { path: path.to_path_buf(), source }),
        }
    }

    /// Writes the list to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> LoaderResult<()> {
        let write = || -> std::io::Result<()> {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, self.to_records())
        };
        write().map_err(|source| LoaderError::Recent { path: path.to_path_buf(), source })?;
        debug!("Saved {} recent files to '{}'", self.len(), path.display());
        Ok(())
    }
}

fn shorten(name: &str, head: usize, tail: usize) -> String {
    let len = name.chars().count();
    if len < head + tail + 3 {
        return name.to_string();
    }
    let start: String = name.chars().take(head).collect();
    let end: String = name.chars().skip(len - tail).collect();
    format!("{start}...{end}")
}
