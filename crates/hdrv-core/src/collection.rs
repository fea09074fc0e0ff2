//! The set of open images and their shared filters.

use crate::filter::TextFilter;
use crate::image::{Direction, Image, ImageId};
use crate::natural::short_names;
use tracing::{debug, info};

/// Open images plus current/reference selection and filters.
#[derive(Debug, Default)]
pub struct ImageCollection {
    images: Vec<Image>,
    current: Option<usize>,
    reference: Option<usize>,
    file_filter: TextFilter,
    channel_filter: TextFilter,
    visible: Vec<usize>,
}

impl ImageCollection {
    /// Empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// All images, visible or not.
    pub fn images(&self) -> &[Image] {
        &self.images
    }

    /// Image at `index`.
    pub fn get(&self, index: usize) -> Option<&Image> {
        self.images.get(index)
    }

    /// Mutable image at `index`.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Image> {
        self.images.get_mut(index)
    }

    /// Number of images.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// True if nothing is open.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Index of the image with `id`.
    pub fn position(&self, id: ImageId) -> Option<usize> {
        self.images.iter().position(|i| i.id == id)
    }

    /// Current image index.
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    /// Reference image index.
    pub fn reference(&self) -> Option<usize> {
        self.reference
    }

    /// The current image.
    pub fn current_image(&self) -> Option<&Image> {
        self.current.and_then(|i| self.images.get(i))
    }

    /// Selects `index` as current if it is a visible image.
    pub fn set_current(&mut self, index: Option<usize>) {
        self.current = index.filter(|&i| self.is_visible(i));
    }

    /// Selects `index` as reference if it is a visible image.
    pub fn set_reference(&mut self, index: Option<usize>) {
        self.reference = index.filter(|&i| self.is_visible(i));
    }

    /// Visible image indices in collection order.
    pub fn visible(&self) -> &[usize] {
        &self.visible
    }

    /// File-name filter.
    pub fn file_filter(&self) -> &TextFilter {
        &self.file_filter
    }

    /// Channel-name filter.
    pub fn channel_filter(&self) -> &TextFilter {
        &self.channel_filter
    }

    /// Replaces the file filter and refreshes visibility.
    pub fn set_file_filter(&mut self, filter: TextFilter) {
        self.file_filter = filter;
        self.update_visibility();
    }

    /// Replaces the channel filter and refreshes visibility.
    pub fn set_channel_filter(&mut self, filter: TextFilter) {
        self.channel_filter = filter;
        self.update_visibility();
    }

    /// Adds a loaded image and returns its index.
    ///
    /// With `replace`, the image takes the slot of the image with that id,
    /// keeping its group selection when still valid. A part whose name
    /// differs from the target's takes the slot of the same-named part of
    /// the same file instead. With no matching slot the image is appended.
    pub fn insert(&mut self, mut image: Image, replace: Option<ImageId>, select: bool) -> usize {
        let slot = replace.and_then(|id| {
            self.position(id)
                .filter(|&i| self.images[i].partname == image.partname)
                .or_else(|| {
                    self.images
                        .iter()
                        .position(|o| o.filename == image.filename && o.partname == image.partname)
                })
        });
        let index = match slot {
            Some(i) => {
                let old = &self.images[i];
                if old.selected_group.is_some_and(|g| g < image.groups.len()) {
                    image.selected_group = old.selected_group;
                }
                if old.reference_group.is_some_and(|g| g < image.groups.len()) {
                    image.reference_group = old.reference_group;
                }
                info!("Reloaded '{}'", image.file_and_partname());
                self.images[i] = image;
                i
            }
            None => {
                debug!("Adding '{}'", image.file_and_partname());
                self.images.push(image);
                self.images.len() - 1
            }
        };

        self.update_visibility();
        if select || self.current.is_none() {
            self.set_current(Some(index));
        }
        index
    }

    /// Removes and returns the image at `index`. The current selection
    /// moves to the next visible image, or the previous one at the end.
    pub fn close(&mut self, index: usize) -> Option<Image> {
        if index >= self.images.len() {
            return None;
        }

        let next_current = if self.current == Some(index) {
            let next = self.next_visible(Some(index), Direction::Forward);
            match next {
                Some(n) if n > index => Some(n - 1),
                _ => self.next_visible(Some(index), Direction::Backward).filter(|&p| p < index),
            }
        } else {
            self.current.map(|c| if c > index { c - 1 } else { c })
        };
        let next_reference = match self.reference {
            Some(r) if r == index => None,
            Some(r) if r > index => Some(r - 1),
            r => r,
        };

        let image = self.images.remove(index);
        info!("Closed '{}'", image.file_and_partname());
        self.current = next_current;
        self.reference = next_reference;
        self.update_visibility();
        Some(image)
    }

    /// Removes every image.
    pub fn clear(&mut self) {
        self.images.clear();
        self.current = None;
        self.reference = None;
        self.visible.clear();
    }

    /// Next visible image from `index` in `direction`, wrapping.
    pub fn next_visible(&self, index: Option<usize>, direction: Direction) -> Option<usize> {
        let n = self.images.len();
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
            .find(|&i| self.images[i].visible)
    }

    /// Recomputes visibility of every image, fixes up the current and
    /// reference selections, rebuilds the visible list and the short names.
    pub fn update_visibility(&mut self) {
        for img in &mut self.images {
            img.update_visibility(&self.file_filter, &self.channel_filter);
        }

        self.visible = (0..self.images.len()).filter(|&i| self.images[i].visible).collect();

        if !self.current.is_some_and(|c| self.is_visible(c)) {
            self.current = self.next_visible(self.current, Direction::Forward);
        }
        if !self.reference.is_some_and(|r| self.is_visible(r)) {
            self.reference = None;
        }

        let names: Vec<String> = self.visible.iter().map(|&i| self.images[i].file_and_partname()).collect();
        for (&i, short) in self.visible.iter().zip(short_names(&names)) {
            self.images[i].short_name = short;
        }
    }

    fn is_visible(&self, index: usize) -> bool {
        self.images.get(index).is_some_and(|i| i.visible)
    }
}
