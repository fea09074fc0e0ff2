//! # hdrv-core
//!
//! The in-memory model of a loaded image.
//!
//! An [`Image`] holds a flat list of [`Channel`]s whose names may be dotted
//! paths (`light1.specular.R`). [`Image::finalize`] derives from them:
//!
//! - [`ChannelGroup`]s: channels shown together, e.g. `R,G,B,A` of a layer,
//! - [`Layer`]s: groups sharing a name prefix,
//! - a [`LayerTree`] keyed by path segment, caching visible-group counts.
//!
//! [`ImageCollection`] owns the open images and applies [`TextFilter`]s to
//! file and channel names.
//!
//! ```rust
//! use hdrv_core::{Channel, Image, TextFilter};
//!
//! let mut img = Image::new("render.exr");
//! for name in ["diffuse.R", "diffuse.G", "diffuse.B", "depth.Z"] {
//!     img.channels.push(Channel::new(name, 4, 4));
//! }
//! img.finalize().unwrap();
//! assert_eq!(img.groups.len(), 2);
//!
//! img.update_visibility(&TextFilter::default(), &TextFilter::new("-depth"));
//! assert_eq!(img.visible_group_count(), 1);
//! ```

mod channel;
mod collection;
mod error;
mod filter;
mod group;
mod image;
mod natural;
mod rect;
mod stats;
mod tree;

pub use channel::Channel;
pub use collection::ImageCollection;
pub use error::{CoreError, CoreResult};
pub use filter::TextFilter;
pub use group::{build_layers_and_groups, ChannelGroup, GroupKind, Layer};
pub use image::{Direction, Image, ImageId};
pub use natural::{common_prefix_suffix, natural_cmp, short_names};
pub use rect::Box2i;
pub use stats::{ChannelStats, NUM_BINS};
pub use tree::{LayerNode, LayerTree, NodeId};
