//! A decoded image: channels plus derived groups, layers and tree.

use crate::channel::Channel;
use crate::error::{CoreError, CoreResult};
use crate::filter::TextFilter;
use crate::group::{build_layers_and_groups, ChannelGroup, Layer};
use crate::rect::Box2i;
use crate::tree::LayerTree;
use hdrv_color::{ColorTransform, ResolvedColor};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime};
use tracing::debug;

/// Process-unique image identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageId(u64);

impl ImageId {
    /// Allocates a fresh id.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Search direction for group and image navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Towards higher indices.
    Forward,
    /// Towards lower indices.
    Backward,
}

/// One image (or one part of a multi-part file).
///
/// Decoders fill in channels, windows and color information, then call
/// [`Image::finalize`] to build the grouping.
#[derive(Debug, Clone)]
pub struct Image {
    /// Identity, stable across visibility changes.
    pub id: ImageId,
    /// Source path, or `archive.zip/entry` for archive members.
    pub filename: String,
    /// Part name for multi-part files, otherwise empty.
    pub partname: String,
    /// Channel selector used at load time, reused on reload.
    pub channel_selector: String,
    /// Pixels actually stored.
    pub data_window: Box2i,
    /// Intended display area.
    pub display_window: Box2i,
    /// Flat channel list.
    pub channels: Vec<Channel>,
    /// Channel groups, built by `finalize`.
    pub groups: Vec<ChannelGroup>,
    /// Leaf layers sorted by name, built by `finalize`.
    pub layers: Vec<Layer>,
    /// Layer hierarchy, built by `finalize`.
    pub tree: LayerTree,
    /// Native-to-working color transform.
    pub color: ColorTransform,
    /// How the color transform was determined.
    pub resolved_color: Option<ResolvedColor>,
    /// Free-form header attributes.
    pub metadata: BTreeMap<String, String>,
    /// Wall time spent decoding.
    pub load_time: Duration,
    /// Modification time of the backing file when loaded.
    pub last_modified: Option<SystemTime>,
    /// Passes the file filter and has a visible group.
    pub visible: bool,
    /// At least one group passes the channel filter.
    pub any_groups_visible: bool,
    /// Display name computed from all visible images.
    pub short_name: String,
    /// Group shown as the primary selection.
    pub selected_group: Option<usize>,
    /// Group shown as the comparison reference.
    pub reference_group: Option<usize>,
}

impl Default for Image {
    fn default() -> Self {
        Self {
            id: ImageId::next(),
            filename: String::new(),
            partname: String::new(),
            channel_selector: String::new(),
            data_window: Box2i::default(),
            display_window: Box2i::default(),
            channels: Vec::new(),
            groups: Vec::new(),
            layers: Vec::new(),
            tree: LayerTree::default(),
            color: ColorTransform::default(),
            resolved_color: None,
            metadata: BTreeMap::new(),
            load_time: Duration::ZERO,
            last_modified: None,
            visible: true,
            any_groups_visible: true,
            short_name: String::new(),
            selected_group: Some(0),
            reference_group: None,
        }
    }
}

impl Image {
    /// Empty image for `filename`.
    pub fn new(filename: impl Into<String>) -> Self {
        Self { filename: filename.into(), ..Default::default() }
    }

    /// Splits interleaved samples into named channels.
    ///
    /// One or two channels are named `Y`/`A`; three or more are `R`, `G`,
    /// `B`, `A`, then numbered.
    pub fn from_interleaved(
        filename: impl Into<String>,
        width: usize,
        height: usize,
        num_channels: usize,
        data: &[f32],
    ) -> Self {
        let mut image = Self::new(filename);
        image.data_window = Box2i::from_size(width, height);
        image.display_window = image.data_window;
        let pixels = width * height;
        for c in 0..num_channels {
            let samples: Vec<f32> = data.iter().skip(c).step_by(num_channels).take(pixels).copied().collect();
            image.channels.push(Channel::from_data(interleaved_name(c, num_channels), width, height, samples));
        }
        image
    }

    /// `filename:partname`, or just the filename.
    pub fn file_and_partname(&self) -> String {
        if self.partname.is_empty() {
            self.filename.clone()
        } else {
            format!("{}:{}", self.filename, self.partname)
        }
    }

    /// Data window size.
    pub fn size(&self) -> (usize, usize) {
        self.data_window.size()
    }

    /// Index of the channel called `name`.
    pub fn channel_index(&self, name: &str) -> Option<usize> {
        self.channels.iter().position(|c| c.name == name)
    }

    /// Validates channels and builds groups, layers and the tree.
    pub fn finalize(&mut self) -> CoreResult<()> {
        let first = self.channels.first().ok_or(CoreError::NoChannels)?;
        let (w, h) = first.size();

        if self.data_window.is_empty() {
            self.data_window = Box2i::from_size(w, h);
        }
        if self.display_window.is_empty() {
            self.display_window = Box2i::from_size(w, h);
        }

        let (ew, eh) = self.data_window.size();
        let mut names = HashSet::with_capacity(self.channels.len());
        for c in &self.channels {
            if c.size() != (ew, eh) {
                return Err(CoreError::SizeMismatch {
                    name: c.name.clone(),
                    width: c.width(),
                    height: c.height(),
                    expected_width: ew,
                    expected_height: eh,
                });
            }
            if !names.insert(c.name.as_str()) {
                return Err(CoreError::DuplicateChannel(c.name.clone()));
            }
        }

        let (layers, groups) = build_layers_and_groups(&self.channels);
        let mut total = 0;
        for l in &layers {
            let in_groups: usize = l.groups.iter().map(|&g| groups[g].len()).sum();
            if in_groups != l.channels.len() {
                return Err(CoreError::Inconsistent(format!(
                    "layer '{}' has {} channels but its groups hold {}",
                    l.name,
                    l.channels.len(),
                    in_groups
                )));
            }
            total += in_groups;
        }
        if total != self.channels.len() {
            return Err(CoreError::Inconsistent(format!(
                "part '{}' has {} channels but its layers hold {}",
                self.partname,
                self.channels.len(),
                total
            )));
        }

        self.tree = LayerTree::build(&layers);
        self.layers = layers;
        self.groups = groups;
        self.tree.recompute(&self.layers, &self.groups);
        self.selected_group = (!self.groups.is_empty()).then_some(0);
        self.reference_group = None;
        debug!(
            "Finalized '{}': {} channels, {} groups, {} layers",
            self.file_and_partname(),
            self.channels.len(),
            self.groups.len(),
            self.layers.len()
        );
        Ok(())
    }

    /// Recomputes group and image visibility, tree counts and the group
    /// selections. Returns the image's visibility.
    ///
    /// A hidden selection moves to the next visible group after it, or
    /// failing that the nearest one before it, or `None`.
    pub fn update_visibility(&mut self, file_filter: &TextFilter, channel_filter: &TextFilter) -> bool {
        let prefix = if self.partname.is_empty() { String::new() } else { format!("{}.", self.partname) };

        let mut any = false;
        for g in &mut self.groups {
            g.visible = g
                .channels
                .iter()
                .any(|&c| channel_filter.pass(&format!("{prefix}{}", self.channels[c].name)));
            any |= g.visible;
        }
        self.any_groups_visible = any;
        self.visible = any && file_filter.pass(&self.filename);

        self.tree.recompute(&self.layers, &self.groups);
        debug_assert!(self.tree.verify(&self.layers, &self.groups).is_ok());

        self.selected_group = self.reselect(self.selected_group);
        self.reference_group = self.reselect(self.reference_group);
        self.visible
    }

    /// Next visible group from `index` in `direction`, wrapping around.
    /// `None` selects the first (or last) visible group.
    pub fn next_visible_group(&self, index: Option<usize>, direction: Direction) -> Option<usize> {
        let n = self.groups.len();
        if n == 0 {
            return None;
        }
        let start = match (index, direction) {
            (Some(i), _) => i.min(n - 1),
            (None, Direction::Forward) => n - 1,
            (None, Direction::Backward) => 0,
        };
        (1..=n)
            .map(|k| match direction {
                Direction::Forward => (start + k) % n,
                Direction::Backward => (start + n - k) % n,
            })
            .find(|&i| self.groups[i].visible)
    }

    /// Index of the `n`-th visible group.
    pub fn nth_visible_group(&self, n: usize) -> Option<usize> {
        self.groups.iter().enumerate().filter(|(_, g)| g.visible).nth(n).map(|(i, _)| i)
    }

    /// Number of visible groups.
    pub fn visible_group_count(&self) -> usize {
        self.tree.root().visible_groups
    }

    fn reselect(&self, current: Option<usize>) -> Option<usize> {
        let i = current.filter(|&i| i < self.groups.len())?;
        if self.groups[i].visible {
            return Some(i);
        }
        (i + 1..self.groups.len())
            .chain((0..i).rev())
            .find(|&g| self.groups[g].visible)
    }
}

fn interleaved_name(c: usize, num_channels: usize) -> String {
    if num_channels < 3 {
        return if c == 0 { "Y" } else { "A" }.to_string();
    }
    match c {
        0 => "R".into(),
        1 => "G".into(),
        2 => "B".into(),
        3 => "A".into(),
        _ => c.to_string(),
    }
}

impl fmt::Display for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "File name: '{}'", self.filename)?;
        writeln!(f, "Part name: '{}'", self.partname)?;
        let (w, h) = self.size();
        writeln!(f, "Resolution: ({w} x {h})")?;
        if self.display_window != self.data_window || self.display_window.min != [0, 0] {
            writeln!(f, "Data window: {}", self.data_window)?;
            writeln!(f, "Display window: {}", self.display_window)?;
        }
        if let Some(rc) = &self.resolved_color {
            writeln!(f, "Transfer function: {}", rc.transfer_description())?;
            writeln!(f, "Color gamut: {}", rc.gamut_description())?;
            if let Some(desc) = &rc.icc_description {
                writeln!(f, "ICC profile: {desc}")?;
            }
        }
        let m = self.color.matrix();
        if !m.is_identity(1e-6) {
            writeln!(f, "Color matrix to Rec.709 RGB:\n{m}")?;
        }
        writeln!(f, "Channels ({}):", self.channels.len())?;
        for (i, c) in self.channels.iter().enumerate() {
            writeln!(f, "  {i:>2}: '{}'", c.name)?;
        }
        writeln!(f, "Layers and channel groups ({}):", self.layers.len())?;
        for (i, layer) in self.layers.iter().enumerate() {
            writeln!(f, "  {i:>2}: '{}' ({})", layer.name, layer.groups.len())?;
            for (j, &g) in layer.groups.iter().enumerate() {
                writeln!(f, "    {j:>2}: '{}'", self.groups[g].name)?;
            }
        }
        Ok(())
    }
}
