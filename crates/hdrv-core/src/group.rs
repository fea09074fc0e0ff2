//! Channel groups and layers.
//!
//! Channels are split into layers by their dotted name prefix. Within a
//! layer, recognized channel tuples (RGBA, XYZ, luminance/chroma, ...) are
//! merged into one group in canonical order regardless of how the file
//! orders them; anything left over becomes a single-channel group.

use crate::channel::Channel;
use smallvec::SmallVec;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::{debug, trace};

/// Semantic kind of a [`ChannelGroup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKind {
    /// R, G, B, A
    Rgba,
    /// R, G, B
    Rgb,
    /// X, Y, Z, A
    Xyza,
    /// X, Y, Z
    Xyz,
    /// RY, Y, BY, A
    Yca,
    /// RY, Y, BY
    Yc,
    /// Two-channel coordinates (U, V or X, Y).
    UvOrXy,
    /// Depth.
    Z,
    /// Any other lone channel.
    Single,
}

impl GroupKind {
    /// True for kinds that carry color.
    pub fn is_color(self) -> bool {
        matches!(self, Self::Rgba | Self::Rgb | Self::Xyza | Self::Xyz | Self::Yca | Self::Yc)
    }

    /// True if the last member is alpha.
    pub fn has_alpha(self) -> bool {
        matches!(self, Self::Rgba | Self::Xyza | Self::Yca)
    }
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Rgba => "RGBA",
            Self::Rgb => "RGB",
            Self::Xyza => "XYZA",
            Self::Xyz => "XYZ",
            Self::Yca => "YCA",
            Self::Yc => "YC",
            Self::UvOrXy => "UV/XY",
            Self::Z => "Z",
            Self::Single => "single",
        })
    }
}

/// Tuples recognized inside a layer, tried in order.
const PATTERNS: &[(GroupKind, &[&str])] = &[
    (GroupKind::Rgba, &["R", "G", "B", "A"]),
    (GroupKind::Rgba, &["r", "g", "b", "a"]),
    (GroupKind::Rgb, &["R", "G", "B"]),
    (GroupKind::Rgb, &["r", "g", "b"]),
    (GroupKind::Xyza, &["X", "Y", "Z", "A"]),
    (GroupKind::Xyza, &["x", "y", "z", "a"]),
    (GroupKind::Xyz, &["X", "Y", "Z"]),
    (GroupKind::Xyz, &["x", "y", "z"]),
    (GroupKind::Yca, &["RY", "Y", "BY", "A"]),
    (GroupKind::Yca, &["ry", "y", "by", "a"]),
    (GroupKind::Yc, &["RY", "Y", "BY"]),
    (GroupKind::Yc, &["ry", "y", "by"]),
    (GroupKind::UvOrXy, &["U", "V"]),
    (GroupKind::UvOrXy, &["u", "v"]),
    (GroupKind::UvOrXy, &["X", "Y"]),
    (GroupKind::UvOrXy, &["x", "y"]),
    (GroupKind::Z, &["Z"]),
    (GroupKind::Z, &["z"]),
];

/// Channels displayed together as one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelGroup {
    /// Display name: the comma-joined pattern, or the channel's tail.
    pub name: String,
    /// Indices into the image's channel list, in canonical order.
    pub channels: SmallVec<[usize; 4]>,
    /// Semantic kind.
    pub kind: GroupKind,
    /// Whether the group passes the current channel filter.
    pub visible: bool,
}

impl ChannelGroup {
    /// Number of member channels.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Groups always hold at least one channel.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

/// All groups sharing one dotted name prefix.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    /// Prefix including the trailing dot, empty for top-level channels.
    pub name: String,
    /// Channel indices in this layer, ordered by channel name.
    pub channels: Vec<usize>,
    /// Indices into the image's group list.
    pub groups: Vec<usize>,
}

impl Layer {
    /// Path segments of the layer name: `"a.b."` gives `["a", "b"]`.
    pub fn path(&self) -> impl Iterator<Item = &str> {
        self.name.split('.').filter(|s| !s.is_empty())
    }
}

/// Builds layers and groups from a flat channel list.
///
/// Layers come out sorted by name. Channel names are assumed unique.
pub fn build_layers_and_groups(channels: &[Channel]) -> (Vec<Layer>, Vec<ChannelGroup>) {
    let layer_names: BTreeSet<&str> = channels.iter().map(|c| Channel::head(&c.name)).collect();

    let mut layers = Vec::with_capacity(layer_names.len());
    let mut groups = Vec::new();

    for layer_name in layer_names {
        // full name -> channel index, restricted to this layer
        let mut remaining: BTreeMap<&str, usize> = channels
            .iter()
            .enumerate()
            .filter(|(_, c)| Channel::head(&c.name) == layer_name)
            .map(|(i, c)| (c.name.as_str(), i))
            .collect();

        let mut layer = Layer {
            name: layer_name.to_string(),
            channels: remaining.values().copied().collect(),
            groups: Vec::new(),
        };
        debug!("Layer '{}' has {} channels", layer_name, remaining.len());

        for (kind, pattern) in PATTERNS {
            if remaining.len() < pattern.len() {
                continue;
            }
            let found: Option<SmallVec<[usize; 4]>> = pattern
                .iter()
                .map(|tail| remaining.get(format!("{layer_name}{tail}").as_str()).copied())
                .collect();
            let Some(found) = found else { continue };

            for &idx in &found {
                remaining.remove(channels[idx].name.as_str());
            }
            trace!("Group {:?} in '{}': {:?}", kind, layer_name, found);
            layer.groups.push(groups.len());
            groups.push(ChannelGroup { name: pattern.join(","), channels: found, kind: *kind, visible: true });
        }

        for (name, idx) in remaining {
            layer.groups.push(groups.len());
            groups.push(ChannelGroup {
                name: Channel::tail(name).to_string(),
                channels: SmallVec::from_slice(&[idx]),
                kind: GroupKind::Single,
                visible: true,
            });
        }

        layers.push(layer);
    }

    (layers, groups)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channels(names: &[&str]) -> Vec<Channel> {
        names.iter().map(|n| Channel::new(*n, 1, 1)).collect()
    }

    fn names(chs: &[Channel], g: &ChannelGroup) -> Vec<String> {
        g.channels.iter().map(|&i| chs[i].name.clone()).collect()
    }

    #[test]
    fn rgba_in_canonical_order() {
        let chs = channels(&["A", "B", "G", "R"]);
        let (layers, groups) = build_layers_and_groups(&chs);
        assert_eq!(layers.len(), 1);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].kind, GroupKind::Rgba);
        assert_eq!(groups[0].name, "R,G,B,A");
        assert_eq!(names(&chs, &groups[0]), ["R", "G", "B", "A"]);
    }

    #[test]
    fn layered_channels() {
        let chs = channels(&["diffuse.B", "diffuse.G", "diffuse.R", "depth.Z", "N.x", "N.y", "N.z", "mask"]);
        let (layers, groups) = build_layers_and_groups(&chs);

        let layer_names: Vec<_> = layers.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(layer_names, ["", "N.", "depth.", "diffuse."]);

        let g = |l: usize, k: usize| &groups[layers[l].groups[k]];
        assert_eq!(g(0, 0).kind, GroupKind::Single);
        assert_eq!(g(0, 0).name, "mask");
        assert_eq!(g(1, 0).kind, GroupKind::Xyz);
        assert_eq!(g(2, 0).kind, GroupKind::Z);
        assert_eq!(g(3, 0).kind, GroupKind::Rgb);
        assert_eq!(names(&chs, g(3, 0)), ["diffuse.R", "diffuse.G", "diffuse.B"]);
    }

    #[test]
    fn every_channel_in_exactly_one_group() {
        let chs = channels(&["R", "G", "B", "A", "Z", "extra", "RY", "Y", "BY", "u", "v", "x.y"]);
        let (layers, groups) = build_layers_and_groups(&chs);
        let mut seen = vec![0; chs.len()];
        for g in &groups {
            for &c in &g.channels {
                seen[c] += 1;
            }
        }
        assert!(seen.iter().all(|&n| n == 1));
        for l in &layers {
            let n: usize = l.groups.iter().map(|&g| groups[g].len()).sum();
            assert_eq!(n, l.channels.len());
        }
    }

    #[test]
    fn leftovers_are_singles_sorted_by_name() {
        let chs = channels(&["R", "G", "beta", "alpha"]);
        let (_, groups) = build_layers_and_groups(&chs);
        let group_names: Vec<_> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(group_names, ["G", "R", "alpha", "beta"]);
    }

    #[test]
    fn layer_path() {
        let l = Layer { name: "a.b.".into(), channels: vec![], groups: vec![] };
        assert_eq!(l.path().collect::<Vec<_>>(), ["a", "b"]);
    }
}
