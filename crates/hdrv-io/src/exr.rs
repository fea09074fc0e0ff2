//! OpenEXR probe.
//!
//! Every part of a multi-part file becomes its own image carrying the
//! part name, data window and display window. Subsampled channels are
//! expanded to full resolution by pixel replication.

use crate::error::{IoError, IoResult};
use crate::options::LoadOptions;
use crate::probe::{sniff, Probe, ReadSeek};
use exr::prelude::{ReadChannels, ReadLayers};
use hdrv_color::{resolve, Chromaticities, ColorMetadata};
use hdrv_core::{Box2i, Channel, Image};
use rayon::prelude::*;
use std::io::BufReader;
use tracing::{debug, info, warn};

const EXR_MAGIC: [u8; 4] = [0x76, 0x2f, 0x31, 0x01];

/// OpenEXR scanline and tiled images, single- or multi-part.
#[derive(Debug, Default)]
pub struct ExrProbe;

impl Probe for ExrProbe {
    fn name(&self) -> &'static str {
        "OpenEXR"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["exr"]
    }

    fn try_decode(
        &self,
        stream: &mut dyn ReadSeek,
        filename: &str,
        options: &LoadOptions,
    ) -> IoResult<Option<Vec<Image>>> {
        if sniff::<4>(stream)? != EXR_MAGIC {
            return Ok(None);
        }

        let file = exr::prelude::read()
            .no_deep_data()
            .largest_resolution_level()
            .all_channels()
            .all_layers()
            .all_attributes()
            .from_buffered(BufReader::new(stream))
            .map_err(|e| IoError::DecodeError(e.to_string()))?;

        let attrs = &file.attributes;
        let dw = &attrs.display_window;
        let display_window =
            Box2i::from_origin_size([dw.position.0, dw.position.1], dw.size.0, dw.size.1);
        let meta = ColorMetadata {
            chromaticities: attrs.chromaticities.as_ref().map(|c| {
                Chromaticities::new(
                    (c.red.0, c.red.1),
                    (c.green.0, c.green.1),
                    (c.blue.0, c.blue.1),
                    (c.white.0, c.white.1),
                )
            }),
            ..ColorMetadata::linear()
        };
        let resolved = resolve(&meta, &options.color_overrides());

        let mut images = Vec::with_capacity(file.layer_data.len());
        for (index, layer) in file.layer_data.iter().enumerate() {
            let partname = layer.attributes.layer_name.as_ref().map(|t| t.to_string()).unwrap_or_default();
            let (width, height) = (layer.size.0, layer.size.1);
            if width == 0 || height == 0 {
                warn!("EXR part {index} '{partname}' has zero pixels, skipping");
                continue;
            }

            let mut image = Image::new(filename);
            image.partname = partname;
            let pos = layer.attributes.layer_position;
            image.data_window = Box2i::from_origin_size([pos.0, pos.1], width, height);
            image.display_window = display_window;

            for ch in &layer.channel_data.list {
                let name = ch.name.to_string();
                let (sx, sy) = (ch.sampling.0.max(1), ch.sampling.1.max(1));
                let samples: Vec<f32> = ch.sample_data.values_as_f32().collect();
                let mut data = if (sx, sy) == (1, 1) {
                    samples
                } else {
                    warn!("EXR channel '{name}' is subsampled {sx}x{sy}, replicating pixels");
                    upsample(&samples, width, height, sx, sy)
                };
                if data.len() != width * height {
                    return Err(IoError::DecodeError(format!(
                        "channel '{name}' has {} samples, expected {}",
                        data.len(),
                        width * height
                    )));
                }
                if !is_alpha(&name) && !resolved.transfer.is_linear() {
                    let tf = &resolved.transfer;
                    data.par_iter_mut().for_each(|v| *v = tf.linearize(*v));
                }
                image.channels.push(Channel::from_data(name, width, height, data));
            }
            debug!("EXR part {index} '{}': {} channels", image.partname, image.channels.len());

            image.color = resolved.transform();
            image.resolved_color = Some(resolved.clone());
            image.metadata.insert("loader".into(), "OpenEXR".into());
            image
                .metadata
                .insert("compression".into(), format!("{:?}", layer.encoding.compression));
            images.push(image);
        }

        info!("EXR with {} part(s)", images.len());
        Ok(Some(images))
    }
}

fn is_alpha(name: &str) -> bool {
    matches!(Channel::tail(name), "A" | "a")
}

fn upsample(samples: &[f32], width: usize, height: usize, sx: usize, sy: usize) -> Vec<f32> {
    let sub_width = width.div_ceil(sx);
    let mut out = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            out.push(samples.get(x / sx + (y / sy) * sub_width).copied().unwrap_or(0.0));
        }
    }
    out
}
