//! Text output for loaded images.

use hdrv_color::apply_matrix_interleaved;
use hdrv_core::{GroupKind, Image, ImageCollection};

/// Prints every visible image in collection order.
pub fn print_collection(images: &ImageCollection, stats: bool) {
    for (n, &index) in images.visible().iter().enumerate() {
        let Some(image) = images.get(index) else { continue };
        let marker = if images.current() == Some(index) { '*' } else { ' ' };
        println!("{marker}[{n}] {}", image.short_name);
        print_image(image, stats);
    }
}

/// Prints one image summary, optionally with channel statistics.
pub fn print_image(image: &Image, stats: bool) {
    println!("{image}");
    if let Some(color) = &image.resolved_color {
        println!("  Transfer:   {}", color.transfer_description());
        println!("  Primaries:  {}", color.gamut_description());
    }
    println!("  Load time:  {:.3} s", image.load_time.as_secs_f32());
    for (key, value) in &image.metadata {
        println!("  {key}: {value}");
    }

    if stats {
        for c in &image.channels {
            let s = c.stats();
            println!(
                "  {:<16} min {:>12.6}  max {:>12.6}  avg {:>12.6}  nan {}  inf {}",
                c.name, s.minimum, s.maximum, s.average, s.nan_pixels, s.inf_pixels
            );
        }
        for (name, avg) in working_space_averages(image) {
            println!("  {:<16} Rec.709 avg {:>10.6} {:>10.6} {:>10.6}", name, avg[0], avg[1], avg[2]);
        }
    }
    println!();
}

/// Mean of every RGB group after the image's matrix into the working space.
fn working_space_averages(image: &Image) -> Vec<(String, [f64; 3])> {
    let matrix = image.color.matrix();
    image
        .groups
        .iter()
        .filter(|g| matches!(g.kind, GroupKind::Rgb | GroupKind::Rgba))
        .filter_map(|g| {
            let planes: Vec<&[f32]> = g.channels.iter().take(3).map(|&c| image.channels[c].data()).collect();
            let pixels = planes.first()?.len();
            if planes.len() < 3 || pixels == 0 {
                return None;
            }
            let mut rgb: Vec<f32> = (0..pixels).flat_map(|i| planes.iter().map(move |p| p[i])).collect();
            apply_matrix_interleaved(&mut rgb, 3, &matrix);

            let mut sum = [0f64; 3];
            for px in rgb.chunks_exact(3) {
                for (s, &v) in sum.iter_mut().zip(px) {
                    if v.is_finite() {
                        *s += v as f64;
                    }
                }
            }
            Some((g.name.clone(), sum.map(|s| s / pixels as f64)))
        })
        .collect()
}
