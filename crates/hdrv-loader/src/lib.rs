//! # hdrv-loader
//!
//! Background loading for the image viewer.
//!
//! [`BackgroundLoader`] turns file names, directories, zip archives and
//! in-memory buffers into decode jobs running on their own threads. The
//! owner drains finished images into its [`hdrv_core::ImageCollection`]
//! whenever convenient and calls [`BackgroundLoader::poll_for_changes`] now
//! and then to pick up modified files and new files in watched
//! directories.
//!
//! A failed decode affects only its own job: it is logged, delivers no
//! images and is kept out of the [`RecentFiles`] list.

pub mod archive;
pub mod config;
pub mod error;
pub mod loader;
pub mod recent;
pub mod watch;

pub use archive::{extract, is_zip, split_zip_entry, ArchiveEntry};
pub use config::{default_recent_path, LoaderConfig, DEFAULT_RECENT_CAPACITY};
pub use error::{LoaderError, LoaderResult};
pub use loader::{BackgroundLoader, Delivery};
pub use recent::RecentFiles;
pub use watch::{list_loadable, WatchedDirectories};
