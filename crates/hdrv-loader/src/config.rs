//! Loader configuration.

use std::path::PathBuf;

/// Default number of recent files kept.
pub const DEFAULT_RECENT_CAPACITY: usize = 15;

/// Settings fixed at loader construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Maximum length of the recent-files list.
    pub recent_capacity: usize,
    /// Where the recent-files list is persisted. `None` keeps it in memory.
    pub recent_path: Option<PathBuf>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            recent_capacity: DEFAULT_RECENT_CAPACITY,
            recent_path: default_recent_path(),
        }
    }
}

impl LoaderConfig {
    /// Configuration without persistence.
    pub fn in_memory() -> Self {
        Self { recent_path: None, ..Self::default() }
    }
}

/// `<config dir>/hdrv/recent.txt`, if the platform has a config dir.
pub fn default_recent_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("hdrv").join("recent.txt"))
}
