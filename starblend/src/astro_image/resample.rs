use common::Buffer2;
use rayon::prelude::*;

use super::{AstroImage, Rect};

/// Sampling used when shrinking a region for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InterpolationMethod {
    /// Closest source pixel
    Nearest,
    /// Weighted average of the four surrounding pixels
    #[default]
    Bilinear,
}

/// Crops `rect` out of `image` and resamples it by `factor`.
///
/// The output is `max(1, round(w * factor)) x max(1, round(h * factor))`
/// where `w x h` is the whole-pixel extent of `rect`.
pub fn crop_and_resample(
    image: &AstroImage,
    rect: &Rect,
    factor: f64,
    method: InterpolationMethod,
) -> AstroImage {
    debug_assert!(factor > 0.0);

    let bounds = rect.pixel_bounds(image.width(), image.height());
    let out_width = ((bounds.width as f64 * factor).round() as usize).max(1);
    let out_height = ((bounds.height as f64 * factor).round() as usize).max(1);

    let planes = image
        .planes()
        .par_iter()
        .map(|plane| {
            let cropped = plane.crop(bounds.x, bounds.y, bounds.width, bounds.height);
            resample_plane(&cropped, out_width, out_height, method)
        })
        .collect();

    AstroImage::from_planes(planes)
}

fn resample_plane(
    src: &Buffer2<f32>,
    width: usize,
    height: usize,
    method: InterpolationMethod,
) -> Buffer2<f32> {
    if src.width() == width && src.height() == height {
        return src.clone();
    }

    let scale_x = src.width() as f64 / width as f64;
    let scale_y = src.height() as f64 / height as f64;
    let max_x = (src.width() - 1) as f64;
    let max_y = (src.height() - 1) as f64;

    Buffer2::from_fn(width, height, |x, y| {
        // Pixel centers map onto pixel centers.
        let sx = ((x as f64 + 0.5) * scale_x - 0.5).clamp(0.0, max_x);
        let sy = ((y as f64 + 0.5) * scale_y - 0.5).clamp(0.0, max_y);
        match method {
            InterpolationMethod::Nearest => src[(sx.round() as usize, sy.round() as usize)],
            InterpolationMethod::Bilinear => bilinear(src, sx, sy),
        }
    })
}

#[inline]
fn bilinear(src: &Buffer2<f32>, x: f64, y: f64) -> f32 {
    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let x1 = (x0 + 1).min(src.width() - 1);
    let y1 = (y0 + 1).min(src.height() - 1);
    let fx = (x - x0 as f64) as f32;
    let fy = (y - y0 as f64) as f32;

    let top = src[(x0, y0)] * (1.0 - fx) + src[(x1, y0)] * fx;
    let bottom = src[(x0, y1)] * (1.0 - fx) + src[(x1, y1)] * fx;
    top * (1.0 - fy) + bottom * fy
}
