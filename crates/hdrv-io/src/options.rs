//! Per-load decode options.

use hdrv_color::{AdaptationMethod, ColorGamut, ColorOverrides, TransferFunction};
use serde::{Deserialize, Serialize};

/// Options applied to every image of one load.
///
/// Stored alongside loaded images so a reload can repeat them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Comma-separated include/`-exclude` terms matched against
    /// `part.channel` names. Empty keeps every channel.
    pub channel_selector: String,
    /// Replaces the detected transfer function.
    pub tf_override: Option<TransferFunction>,
    /// Replaces the detected primaries.
    pub gamut_override: Option<ColorGamut>,
    /// Linearize only; skip conversion into the working space.
    pub keep_native_primaries: bool,
    /// Chromatic adaptation used when white points differ.
    pub adaptation: AdaptationMethod,
}

impl LoadOptions {
    /// Options with just a channel selector.
    pub fn with_channel_selector(selector: impl Into<String>) -> Self {
        Self { channel_selector: selector.into(), ..Self::default() }
    }

    /// Color overrides for the resolver.
    pub fn color_overrides(&self) -> ColorOverrides {
        ColorOverrides {
            transfer: self.tf_override.clone(),
            gamut: self.gamut_override,
            keep_native_primaries: self.keep_native_primaries,
            adaptation: self.adaptation,
        }
    }
}
