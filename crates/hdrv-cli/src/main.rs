//! hdrv - load HDR images the way the viewer does and report on them
//!
//! Files, directories and zip archives are decoded on background threads,
//! collected, filtered and summarized. With `--watch` the directories keep
//! being polled for new and modified files.

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser};
use hdrv_color::{ColorGamut, TransferFunction};
use hdrv_core::{ImageCollection, TextFilter};
use hdrv_io::{DecoderRegistry, LoadOptions};
use hdrv_loader::{BackgroundLoader, Delivery, LoaderConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod report;

#[derive(Parser)]
#[command(name = "hdrv")]
#[command(author, version, about = "Load HDR images and print what was found")]
#[command(long_about = "
Loads images through the same pipeline as the viewer: format sniffing,
color resolution into linear Rec.709, channel grouping and layer trees.

Examples:
  hdrv render.exr                       # Summarize an image
  hdrv shots/ --file-filter v002        # Every image in a folder, filtered
  hdrv plates.zip --stats               # Zip members with channel statistics
  hdrv beauty.exr --channels diffuse,-A # Load only matching channels
  hdrv photo.png --tf gamma --gamma 2.4 # Override the transfer function
  hdrv renders/ --watch --poll 2        # Keep polling for changes
")]
struct Cli {
    /// Files, directories or zip archives (`archive.zip/member.png` for one member)
    paths: Vec<String>,

    /// Keep watching directories for new and modified files
    #[arg(short, long)]
    watch: bool,

    /// Seconds between polls when watching (0.05 to 3600)
    #[arg(long, default_value = "1.0", value_parser = parse_poll)]
    poll: f32,

    /// Channel selector applied while loading (comma-separated, `-` excludes)
    #[arg(long)]
    channels: Option<String>,

    /// Only report images whose file name matches
    #[arg(long, default_value = "")]
    file_filter: String,

    /// Only report channel groups whose names match
    #[arg(long, default_value = "")]
    channel_filter: String,

    /// Transfer function override (linear, gamma, srgb, bt709, pq, hlg, ...)
    #[arg(long)]
    tf: Option<String>,

    /// Gamma used with `--tf gamma`
    #[arg(long, default_value = "2.2")]
    gamma: f32,

    /// Primaries override (bt709, bt2020, p3, acescg, ...)
    #[arg(long)]
    gamut: Option<String>,

    /// Linearize only; keep the file's primaries
    #[arg(long)]
    keep_native: bool,

    /// YAML file with load options
    #[arg(long)]
    config: Option<PathBuf>,

    /// Disable a decoder by name (repeatable)
    #[arg(long = "disable", value_name = "DECODER")]
    disabled: Vec<String>,

    /// Recent-files list location
    #[arg(long)]
    recent: Option<PathBuf>,

    /// Print the recent-files list and exit
    #[arg(long)]
    list_recent: bool,

    /// Print per-channel statistics
    #[arg(short, long)]
    stats: bool,

    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn parse_poll(s: &str) -> std::result::Result<f32, String> {
    let secs: f32 = s.parse().map_err(|e| format!("'{s}' is not a number: {e}"))?;
    if !(0.05..=3600.0).contains(&secs) {
        return Err(format!("poll interval must be between 0.05 and 3600 seconds, got {s}"));
    }
    Ok(secs)
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn load_options(cli: &Cli) -> Result<LoadOptions> {
    let mut opts = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
            serde_yaml::from_str(&text).with_context(|| format!("Invalid load options in {}", path.display()))?
        }
        None => LoadOptions::default(),
    };

    if let Some(sel) = &cli.channels {
        opts.channel_selector = sel.clone();
    }
    if let Some(name) = &cli.tf {
        match TransferFunction::from_name(name, cli.gamma) {
            Some(tf) => opts.tf_override = Some(tf),
            None => bail!("Unknown transfer function '{}'", name),
        }
    }
    if let Some(name) = &cli.gamut {
        match ColorGamut::from_name(name) {
            Some(g) => opts.gamut_override = Some(g),
            None => bail!("Unknown color gamut '{}'", name),
        }
    }
    if cli.keep_native {
        opts.keep_native_primaries = true;
    }
    Ok(opts)
}

fn registry(cli: &Cli) -> Result<DecoderRegistry> {
    let mut registry = DecoderRegistry::default();
    for name in &cli.disabled {
        if !registry.set_enabled(name, false) {
            let known: Vec<_> = registry.names().collect();
            bail!("Unknown decoder '{}' (known: {})", name, known.join(", "));
        }
    }
    debug!("Decoders: {:?}", registry);
    Ok(registry)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let options = load_options(&cli)?;
    let config = LoaderConfig {
        recent_path: cli.recent.clone().or_else(hdrv_loader::default_recent_path),
        ..LoaderConfig::default()
    };
    let mut loader = BackgroundLoader::new(Arc::new(registry(&cli)?), config);

    if cli.list_recent {
        for (i, name) in loader.recent().shortened(32, 25).iter().enumerate() {
            println!("{:2}: {}", i, name);
        }
        return Ok(());
    }
    if cli.paths.is_empty() {
        bail!("No input paths given");
    }

    let mut images = ImageCollection::new();
    images.set_file_filter(TextFilter::new(&cli.file_filter));
    images.set_channel_filter(TextFilter::new(&cli.channel_filter));

    for (i, path) in cli.paths.iter().enumerate() {
        let delivery = Delivery { should_select: i == 0, replace: None };
        if loader.schedule(path, None, delivery, &options) == 0 {
            tracing::warn!("Nothing to load from '{}'", path);
        }
        if cli.watch && Path::new(path).is_dir() {
            loader.watch(path, true).with_context(|| format!("Cannot watch '{path}'"))?;
        }
    }

    let loaded = loader.drain_blocking(|image, replace, select| {
        images.insert(image, replace, select);
    });
    info!("Loaded {} images, {} visible", loaded, images.visible().len());
    report::print_collection(&images, cli.stats);

    if cli.watch {
        let period = Duration::from_secs_f32(cli.poll);
        info!("Watching {} directories; press Ctrl-C to stop", loader.watched().watched().count());
        loop {
            thread::sleep(period);
            loader.poll_for_changes(&mut images, &options);
            let mut changed = Vec::new();
            loader.drain(|image, replace, select| {
                changed.push(images.insert(image, replace, select));
            });
            for index in changed {
                if let Some(image) = images.get(index) {
                    report::print_image(image, cli.stats);
                }
            }
            loader.save_recent().context("Failed to save recent files")?;
        }
    }

    loader.save_recent().context("Failed to save recent files")?;
    Ok(())
}
