//! The background loader.
//!
//! Each scheduled load decodes on its own thread and reports through a
//! one-shot channel. The owning context polls with [`BackgroundLoader::drain`]
//! and never blocks on a decode, except through the explicit
//! [`BackgroundLoader::drain_blocking`].

use crate::archive::{extract, is_zip, split_zip_entry};
use crate::config::LoaderConfig;
use crate::error::{LoaderError, LoaderResult};
use crate::recent::RecentFiles;
use crate::watch::{list_loadable, WatchedDirectories};
use hdrv_core::{Image, ImageCollection, ImageId};
use hdrv_io::{DecoderRegistry, LoadOptions};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::SystemTime;
use tracing::{debug, error, info, warn};

/// What to do with the images of one load once it completes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    /// Select the loaded image.
    pub should_select: bool,
    /// Image the result replaces.
    pub replace: Option<ImageId>,
}

struct PendingLoad {
    filename: String,
    add_to_recent: bool,
    delivery: Delivery,
    rx: Receiver<Vec<Image>>,
}

struct Job {
    filename: String,
    buffer: Option<Vec<u8>>,
    modified: Option<SystemTime>,
    add_to_recent: bool,
    delivery: Delivery,
}

/// Schedules decodes on background threads and hands finished images to
/// the caller.
///
/// # Example
///
/// ```rust,no_run
/// use hdrv_core::ImageCollection;
/// use hdrv_io::{DecoderRegistry, LoadOptions};
/// use hdrv_loader::{BackgroundLoader, Delivery, LoaderConfig};
/// use std::sync::Arc;
///
/// let mut loader = BackgroundLoader::new(Arc::new(DecoderRegistry::default()), LoaderConfig::in_memory());
/// let mut images = ImageCollection::new();
///
/// let select = Delivery { should_select: true, replace: None };
/// loader.schedule("renders/", None, select, &LoadOptions::default());
/// loader.drain_blocking(|image, replace, select| {
///     images.insert(image, replace, select);
/// });
/// ```
pub struct BackgroundLoader {
    registry: Arc<DecoderRegistry>,
    config: LoaderConfig,
    recent: RecentFiles,
    watched: WatchedDirectories,
    pending: Vec<PendingLoad>,
}

impl BackgroundLoader {
    /// Creates a loader decoding with `registry`. The recent-files list is
    /// restored from the configured path, if any.
    pub fn new(registry: Arc<DecoderRegistry>, config: LoaderConfig) -> Self {
        let mut recent = RecentFiles::new(config.recent_capacity);
        if let Some(path) = &config.recent_path {
            if let Err(e) = recent.load(path) {
                warn!("{e}");
            }
        }
        Self {
            registry,
            config,
            recent,
            watched: WatchedDirectories::new(),
            pending: Vec::new(),
        }
    }

    /// The registry used for decoding.
    pub fn registry(&self) -> &Arc<DecoderRegistry> {
        &self.registry
    }

    /// The configuration.
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Recently loaded files.
    pub fn recent(&self) -> &RecentFiles {
        &self.recent
    }

    /// Mutable access to the recent-files list.
    pub fn recent_mut(&mut self) -> &mut RecentFiles {
        &mut self.recent
    }

    /// Writes the recent-files list to the configured path.
    pub fn save_recent(&self) -> LoaderResult<()> {
        match &self.config.recent_path {
            Some(path) => self.recent.save(path),
            None => Ok(()),
        }
    }

    /// Watched directories.
    pub fn watched(&self) -> &WatchedDirectories {
        &self.watched
    }

    /// Number of loads not yet drained.
    pub fn num_pending(&self) -> usize {
        self.pending.len()
    }

    /// Names of loads not yet drained, in scheduling order.
    pub fn pending_filenames(&self) -> impl Iterator<Item = &str> {
        self.pending.iter().map(|p| p.filename.as_str())
    }

    fn loadable(&self, path: &Path) -> bool {
        self.registry.is_loadable(path)
    }

    /// Schedules `filename` for loading and returns how many decodes were
    /// started.
    ///
    /// `filename` may name a file, a directory (every loadable file in it,
    /// in natural order), a zip archive (every loadable member) or a zip
    /// member (`archive.zip/entry.png`). With `buffer`, the bytes are
    /// decoded instead of reading `filename`. Only the first started
    /// decode carries `delivery.should_select`.
    ///
    /// Failures found while scheduling are logged and start nothing.
    pub fn schedule(
        &mut self,
        filename: &str,
        buffer: Option<Vec<u8>>,
        delivery: Delivery,
        options: &LoadOptions,
    ) -> usize {
        if delivery.should_select {
            debug!("Will select image '{}'", filename);
        }

        if let Some(bytes) = buffer {
            info!("Loading '{}' from {} byte buffer", filename, bytes.len());
            if is_zip(filename) {
                self.recent.remove(filename);
                let n = self.schedule_archive(Cursor::new(bytes), filename, None, None, delivery, options);
                if n > 0 {
                    self.recent.add(filename);
                }
                return n;
            }
            let job = Job {
                filename: filename.to_string(),
                buffer: Some(bytes),
                modified: None,
                add_to_recent: false,
                delivery,
            };
            return self.spawn(job, options);
        }

        let path = Path::new(filename);
        if path.is_dir() {
            return match self.schedule_directory(path, delivery, options) {
                Ok(n) => {
                    self.recent.add(filename);
                    n
                }
                Err(e) => {
                    error!("Could not access directory '{}': {}", filename, e);
                    0
                }
            };
        }

        // re-added once the load succeeds
        self.recent.remove(filename);

        let (disk_name, member) = split_zip_entry(filename).unwrap_or((filename, None));
        let disk_path = Path::new(disk_name);
        if !disk_path.is_file() {
            error!("File '{}' does not exist or is not a regular file", disk_name);
            return 0;
        }

        if disk_name != filename || is_zip(filename) {
            let opened = fs::File::open(disk_path).and_then(|f| Ok((f.metadata()?.modified().ok(), f)));
            let (modified, file) = match opened {
                Ok(v) => v,
                Err(e) => {
                    error!("Failed to open zip file '{}': {}", disk_name, e);
                    return 0;
                }
            };
            let n = self.schedule_archive(std::io::BufReader::new(file), disk_name, member, modified, delivery, options);
            if n > 0 {
                self.recent.add(filename);
            }
            return n;
        }

        info!("Loading file '{}'...", filename);
        let job = Job {
            filename: filename.to_string(),
            buffer: None,
            modified: None,
            add_to_recent: true,
            delivery,
        };
        self.spawn(job, options)
    }

    fn schedule_directory(&mut self, dir: &Path, delivery: Delivery, options: &LoadOptions) -> LoaderResult<usize> {
        info!("Loading images from folder '{}'", dir.display());
        let canon = self.watched.watch(dir, false, |p| self.registry.is_loadable(p))?;
        let files = list_loadable(&canon, |p| self.registry.is_loadable(p))?;

        let mut started = 0;
        for (i, file) in files.into_iter().enumerate() {
            info!("Loading file '{}'...", file.display());
            let job = Job {
                filename: file.to_string_lossy().into_owned(),
                buffer: None,
                modified: None,
                add_to_recent: false,
                delivery: Delivery { should_select: delivery.should_select && i == 0, replace: delivery.replace },
            };
            self.watched.mark_known(file);
            started += self.spawn(job, options);
        }
        Ok(started)
    }

    fn schedule_archive<R: std::io::Read + std::io::Seek>(
        &mut self,
        reader: R,
        archive_name: &str,
        member: Option<&str>,
        modified: Option<SystemTime>,
        delivery: Delivery,
        options: &LoadOptions,
    ) -> usize {
        let entries = match extract(reader, archive_name, member, |name| self.loadable(Path::new(name))) {
            Ok(entries) => entries,
            Err(e) => {
                error!("Failed to open zip archive '{}': {}", archive_name, e);
                return 0;
            }
        };

        let mut started = 0;
        for (i, entry) in entries.into_iter().enumerate() {
            let job = Job {
                filename: entry.name,
                buffer: Some(entry.data),
                modified,
                add_to_recent: false,
                delivery: Delivery { should_select: delivery.should_select && i == 0, replace: delivery.replace },
            };
            started += self.spawn(job, options);
        }
        started
    }

    fn spawn(&mut self, job: Job, options: &LoadOptions) -> usize {
        let (tx, rx) = channel();
        let registry = Arc::clone(&self.registry);
        let options = options.clone();
        let filename = job.filename.clone();
        let (buffer, modified) = (job.buffer, job.modified);

        let spawned = thread::Builder::new().name("hdrv-decode".into()).spawn(move || {
            let result = match buffer {
                Some(bytes) => registry.decode(&mut Cursor::new(bytes), &filename, &options).map(|mut images| {
                    for image in &mut images {
                        image.last_modified = modified;
                    }
                    images
                }),
                None => registry.decode_file(&filename, &options),
            };
            let images = result.unwrap_or_else(|e| {
                error!("Could not load '{}': {}", filename, e);
                Vec::new()
            });
            // the loader may be gone; nothing to report to then
            let _ = tx.send(images);
        });

        match spawned {
            Ok(_) => {
                self.pending.push(PendingLoad {
                    filename: job.filename,
                    add_to_recent: job.add_to_recent,
                    delivery: job.delivery,
                    rx,
                });
                1
            }
            Err(e) => {
                error!("Could not start loading '{}': {}", job.filename, e);
                0
            }
        }
    }

    /// Hands every image of each completed load to
    /// `callback(image, replace, should_select)` and removes those loads.
    /// Returns the number of images delivered.
    ///
    /// A load that produced images and asked for it is added to the recent
    /// files. Loads that produced nothing are dropped silently.
    pub fn drain(&mut self, mut callback: impl FnMut(Image, Option<ImageId>, bool)) -> usize {
        let mut delivered = 0;
        let recent = &mut self.recent;
        self.pending.retain(|p| {
            let images = match p.rx.try_recv() {
                Ok(images) => images,
                Err(TryRecvError::Empty) => return true,
                Err(TryRecvError::Disconnected) => {
                    error!("Loading '{}' ended without a result", p.filename);
                    Vec::new()
                }
            };
            if images.is_empty() {
                return false;
            }
            delivered += images.len();
            for image in images {
                callback(image, p.delivery.replace, p.delivery.should_select);
            }
            if p.add_to_recent {
                recent.add(p.filename.clone());
            }
            false
        });
        delivered
    }

    /// Waits for every pending load and drains it.
    pub fn drain_blocking(&mut self, mut callback: impl FnMut(Image, Option<ImageId>, bool)) -> usize {
        let mut delivered = 0;
        for p in std::mem::take(&mut self.pending) {
            let images = p.rx.recv().unwrap_or_else(|_| {
                error!("Loading '{}' ended without a result", p.filename);
                Vec::new()
            });
            if images.is_empty() {
                continue;
            }
            delivered += images.len();
            for image in images {
                callback(image, p.delivery.replace, p.delivery.should_select);
            }
            if p.add_to_recent {
                self.recent.add(p.filename);
            }
        }
        delivered
    }

    /// Loads recent file `index` (0 is the most recent) and selects it.
    pub fn load_recent(&mut self, index: usize, options: &LoadOptions) -> LoaderResult<usize> {
        let filename = self.recent.get(index).ok_or(LoaderError::NoRecent(index))?.to_string();
        Ok(self.schedule(&filename, None, Delivery { should_select: true, replace: None }, options))
    }

    /// Starts watching `dir`. With `ignore_existing`, files already there
    /// are not reported as new.
    pub fn watch(&mut self, dir: impl AsRef<Path>, ignore_existing: bool) -> LoaderResult<PathBuf> {
        let registry = Arc::clone(&self.registry);
        self.watched.watch(dir.as_ref(), ignore_existing, |p| registry.is_loadable(p))
    }

    /// Stops watching directories matching `pred`.
    pub fn unwatch_if(&mut self, pred: impl FnMut(&Path) -> bool) {
        self.watched.unwatch_if(pred);
    }

    /// Reloads open images whose files changed on disk and loads new files
    /// from watched directories. Returns the number of decodes started.
    ///
    /// Reloads keep each image's channel selector. A file that no longer
    /// exists is skipped and forgotten.
    pub fn poll_for_changes(&mut self, images: &mut ImageCollection, options: &LoadOptions) -> usize {
        let mut reloads: Vec<(String, ImageId, String)> = Vec::new();

        for i in 0..images.len() {
            let Some(image) = images.get_mut(i) else { continue };
            let Some(cached) = image.last_modified else { continue };

            let disk_name = split_zip_entry(&image.filename).map_or(image.filename.as_str(), |(archive, _)| archive);
            let disk_path = Path::new(disk_name);
            if !disk_path.exists() {
                warn!("File[{}] '{}' no longer exists, skipping reload", i, disk_name);
                self.watched.forget(disk_path);
                continue;
            }
            let Ok(modified) = fs::metadata(disk_path).and_then(|m| m.modified()) else { continue };
            if modified == cached {
                continue;
            }

            // updated before scheduling so a slow or failed reload is not repeated
            image.last_modified = Some(modified);
            if !reloads.iter().any(|(f, _, _)| *f == image.filename) {
                reloads.push((image.filename.clone(), image.id, image.channel_selector.clone()));
            }
        }

        if reloads.is_empty() {
            debug!("No modified files found to reload");
        }

        let mut started = 0;
        for (filename, id, selector) in reloads {
            let opts = LoadOptions { channel_selector: selector, ..options.clone() };
            started += self.schedule(&filename, None, Delivery { should_select: false, replace: Some(id) }, &opts);
        }

        let registry = Arc::clone(&self.registry);
        for file in self.watched.scan_new(|p| registry.is_loadable(p)) {
            started += self.schedule(&file.to_string_lossy(), None, Delivery::default(), options);
        }
        started
    }
}

impl Drop for BackgroundLoader {
    fn drop(&mut self) {
        if let Err(e) = self.save_recent() {
            warn!("{e}");
        }
    }
}
