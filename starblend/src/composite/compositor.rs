use common::Buffer2;
use rayon::prelude::*;
use tracing::debug;

use super::config::{CompositeMethod, CompositeMode};
use super::mask::Mask;
use super::normalizer::ReverseStretch;
use crate::astro_image::AstroImage;

/// Formula selection plus the normalization wrapped around it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositeParams {
    pub mode: CompositeMode,
    pub method: CompositeMethod,
    pub stretch: ReverseStretch,
}

/// Combines two normalized samples.
///
/// `primary` is the starry sample for removal and the starless sample for
/// replacement; `secondary` is the starless and stars sample respectively.
/// The result is not clamped.
#[inline]
pub fn combine(mode: CompositeMode, method: CompositeMethod, primary: f64, secondary: f64) -> f64 {
    match (mode, method) {
        (CompositeMode::Removal, CompositeMethod::Linear) => primary - secondary,
        (CompositeMode::Removal, CompositeMethod::Screen) => {
            if secondary >= 1.0 {
                0.0
            } else {
                (primary - secondary) / (1.0 - secondary)
            }
        }
        (CompositeMode::Replacement, CompositeMethod::Linear) => primary + secondary,
        (CompositeMode::Replacement, CompositeMethod::Screen) => {
            primary + secondary - primary * secondary
        }
    }
}

/// Composites `secondary` with `primary` sample by sample.
///
/// Operands go through the forward stretch, the combined value is truncated
/// to [0, 1] and mapped back with the inverse stretch. With a mask the
/// output is `mask * composite + (1 - mask) * primary`.
///
/// # Panics
/// Panics if the operands, or the mask and the operands, differ in size.
pub fn composite(
    params: &CompositeParams,
    primary: &AstroImage,
    secondary: &AstroImage,
    mask: Option<&Mask>,
) -> AstroImage {
    assert!(
        primary.is_compatible(secondary),
        "Composite operands must be compatible"
    );
    if let Some(mask) = mask {
        assert!(mask.fits(primary), "Mask size must match the operands");
    }

    let CompositeParams {
        mode,
        method,
        stretch,
    } = *params;
    debug!(
        %mode,
        %method,
        balance = stretch.balance(),
        masked = mask.is_some(),
        width = primary.width(),
        height = primary.height(),
        "Compositing"
    );

    let planes = primary
        .planes()
        .par_iter()
        .zip(secondary.planes())
        .enumerate()
        .map(|(c, (primary_plane, secondary_plane))| {
            let weights = mask.map(|m| m.weights(c));
            let pixels = primary_plane
                .iter()
                .zip(secondary_plane.iter())
                .enumerate()
                .map(|(i, (&a, &b))| {
                    let blended =
                        combine(mode, method, stretch.forward(a as f64), stretch.forward(b as f64));
                    let value = stretch.inverse(blended.clamp(0.0, 1.0));
                    match weights {
                        Some(w) => {
                            let m = w[i] as f64;
                            m * value + (1.0 - m) * a as f64
                        }
                        None => value,
                    }
                })
                .map(|v| v as f32)
                .collect();
            Buffer2::new(primary_plane.width(), primary_plane.height(), pixels)
        })
        .collect();

    AstroImage::from_planes(planes)
}
