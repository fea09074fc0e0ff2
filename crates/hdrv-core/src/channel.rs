//! A single named sample plane.

use crate::stats::ChannelStats;
use std::sync::OnceLock;

/// A named 2D plane of `f32` samples, row-major.
///
/// The name may be a dotted path (`layer.sublayer.R`); see
/// [`Channel::split`].
#[derive(Debug, Clone)]
pub struct Channel {
    /// Full name including the layer path.
    pub name: String,
    width: usize,
    height: usize,
    data: Vec<f32>,
    stats: OnceLock<ChannelStats>,
}

impl Channel {
    /// Zero-filled channel.
    pub fn new(name: impl Into<String>, width: usize, height: usize) -> Self {
        Self::from_data(name, width, height, vec![0.0; width * height])
    }

    /// Channel over existing samples. `data.len()` must equal `width * height`.
    pub fn from_data(name: impl Into<String>, width: usize, height: usize, data: Vec<f32>) -> Self {
        debug_assert_eq!(data.len(), width * height);
        Self { name: name.into(), width, height, data, stats: OnceLock::new() }
    }

    /// Splits `full_name` at the last `.` into layer prefix (with the dot)
    /// and channel tail: `"a.b.R"` gives `("a.b.", "R")`.
    pub fn split(full_name: &str) -> (&str, &str) {
        match full_name.rfind('.') {
            Some(i) => full_name.split_at(i + 1),
            None => ("", full_name),
        }
    }

    /// Layer prefix of `full_name`, including the trailing dot.
    pub fn head(full_name: &str) -> &str {
        Self::split(full_name).0
    }

    /// Last path segment of `full_name`.
    pub fn tail(full_name: &str) -> &str {
        Self::split(full_name).1
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// `(width, height)`.
    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Samples, row-major.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Mutable samples. Drops cached statistics.
    pub fn data_mut(&mut self) -> &mut [f32] {
        self.stats = OnceLock::new();
        &mut self.data
    }

    /// Sample at `(x, y)`.
    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        (x < self.width && y < self.height).then(|| self.data[y * self.width + x])
    }

    /// Statistics, computed on first use.
    pub fn stats(&self) -> &ChannelStats {
        self.stats.get_or_init(|| ChannelStats::compute(&self.data))
    }

    /// True once statistics have been computed.
    pub fn has_stats(&self) -> bool {
        self.stats.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_names() {
        assert_eq!(Channel::split("R"), ("", "R"));
        assert_eq!(Channel::split("diffuse.R"), ("diffuse.", "R"));
        assert_eq!(Channel::split("a.b.c.Z"), ("a.b.c.", "Z"));
        assert_eq!(Channel::head("a.b.c.Z"), "a.b.c.");
        assert_eq!(Channel::tail("a.b.c.Z"), "Z");
    }

    #[test]
    fn stats_are_lazy_and_reset_on_write() {
        let mut c = Channel::from_data("Y", 2, 1, vec![1.0, 3.0]);
        assert!(!c.has_stats());
        assert_eq!(c.stats().maximum, 3.0);
        assert!(c.has_stats());
        c.data_mut()[1] = 5.0;
        assert!(!c.has_stats());
        assert_eq!(c.stats().maximum, 5.0);
        assert_eq!(c.get(1, 0), Some(5.0));
        assert_eq!(c.get(2, 0), None);
    }
}
