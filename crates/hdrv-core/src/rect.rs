//! Integer pixel boxes for data and display windows.
//!
//! Boxes are half-open: `min` is inclusive, `max` exclusive.

use std::fmt;

/// An axis-aligned integer box, `[min, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Box2i {
    /// Inclusive top-left corner.
    pub min: [i32; 2],
    /// Exclusive bottom-right corner.
    pub max: [i32; 2],
}

impl Box2i {
    /// Box from corners.
    pub const fn new(min: [i32; 2], max: [i32; 2]) -> Self {
        Self { min, max }
    }

    /// Box at the origin with the given size.
    pub fn from_size(width: usize, height: usize) -> Self {
        Self::new([0, 0], [width as i32, height as i32])
    }

    /// Box at `origin` with the given size.
    pub fn from_origin_size(origin: [i32; 2], width: usize, height: usize) -> Self {
        Self::new(origin, [origin[0] + width as i32, origin[1] + height as i32])
    }

    /// True if the box contains no pixels.
    pub fn is_empty(&self) -> bool {
        self.max[0] <= self.min[0] || self.max[1] <= self.min[1]
    }

    /// Width and height, zero when empty.
    pub fn size(&self) -> (usize, usize) {
        if self.is_empty() {
            (0, 0)
        } else {
            ((self.max[0] - self.min[0]) as usize, (self.max[1] - self.min[1]) as usize)
        }
    }

    /// True if `(x, y)` lies inside.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.min[0] && y >= self.min[1] && x < self.max[0] && y < self.max[1]
    }
}

impl fmt::Display for Box2i {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}) : ({}, {})", self.min[0], self.min[1], self.max[0], self.max[1])
    }
}
