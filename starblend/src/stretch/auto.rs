use tracing::debug;

use super::transform::{ChannelTransform, HistogramTransform};
use crate::astro_image::AstroImage;
use crate::math::mtf;
use crate::math::statistics::ChannelStats;

/// Shadows clipping point in units of normalized MAD.
pub const SHADOWS_CLIPPING: f64 = -2.8;

/// Background level the stretched median is mapped to.
pub const TARGET_BACKGROUND: f64 = 0.25;

/// Computes an automatic histogram stretch for `image`.
///
/// Unlinked: one row per channel, each channel choosing the inverted branch
/// when its median is above 0.5. Linked: the per-channel parameters are
/// averaged and the shared row is used for every channel.
pub fn auto_stretch(image: &AstroImage, linked: bool) -> HistogramTransform {
    auto_stretch_from_stats(&image.channel_stats(), linked)
}

pub fn auto_stretch_from_stats(stats: &[ChannelStats], linked: bool) -> HistogramTransform {
    if stats.is_empty() {
        return HistogramTransform::identity();
    }

    let branches: Vec<(ChannelTransform, ChannelTransform)> =
        stats.iter().map(stretch_branches).collect();

    let transform = if linked {
        let all_inverted = stats.iter().all(ChannelStats::is_inverted);
        let chosen = branches.iter().map(|&(normal, inverted)| {
            if all_inverted { inverted } else { normal }
        });
        HistogramTransform::broadcast(average(chosen), stats.len())
    } else {
        let mut transform = HistogramTransform::identity();
        for (c, (s, &(normal, inverted))) in stats.iter().zip(&branches).enumerate() {
            transform.rows[c] = if s.is_inverted() { inverted } else { normal };
        }
        transform
    };

    debug!(linked, ?transform, "Auto stretch");
    transform
}

/// Normal and inverted stretch for a single channel.
fn stretch_branches(stats: &ChannelStats) -> (ChannelTransform, ChannelTransform) {
    let median = stats.median as f64;
    let mad = stats.mad as f64;

    let (c0, inverted_c1) = if mad != 0.0 {
        (
            (median + SHADOWS_CLIPPING * mad).clamp(0.0, 1.0),
            (median - SHADOWS_CLIPPING * mad).clamp(0.0, 1.0),
        )
    } else {
        (0.0, 1.0)
    };

    let normal = ChannelTransform::new(c0, mtf(TARGET_BACKGROUND, median - c0), 1.0);
    let inverted = ChannelTransform::new(
        0.0,
        mtf(inverted_c1 - median, TARGET_BACKGROUND),
        inverted_c1,
    );
    (normal, inverted)
}

fn average(rows: impl ExactSizeIterator<Item = ChannelTransform>) -> ChannelTransform {
    let n = rows.len() as f64;
    let (c0, m, c1) = rows.fold((0.0, 0.0, 0.0), |(c0, m, c1), row| {
        (c0 + row.shadows, m + row.midtones, c1 + row.highlights)
    });
    ChannelTransform::new(c0 / n, m / n, c1 / n)
}

/// Screen transfer function auto-stretch, as applied to displayed views.
///
/// Differs from [`auto_stretch`] in the linked case: medians and clip
/// points are averaged before the midtones balance is derived, and
/// channels without dispersion contribute no shadows clip.
pub fn auto_stf(image: &AstroImage, linked: bool) -> HistogramTransform {
    auto_stf_from_stats(&image.channel_stats(), linked)
}

pub fn auto_stf_from_stats(stats: &[ChannelStats], linked: bool) -> HistogramTransform {
    if stats.is_empty() {
        return HistogramTransform::identity();
    }

    if linked {
        let n = stats.len() as f64;
        let mean_median = stats.iter().map(|s| s.median as f64).sum::<f64>() / n;
        let has_spread = |s: &ChannelStats| 1.0 + s.mad as f64 != 1.0;

        let row = if stats.iter().all(ChannelStats::is_inverted) {
            let c1 = stats
                .iter()
                .map(|s| {
                    if has_spread(s) {
                        s.median as f64 - SHADOWS_CLIPPING * s.mad as f64
                    } else {
                        1.0
                    }
                })
                .sum::<f64>()
                / n;
            let c1 = c1.clamp(0.0, 1.0);
            ChannelTransform::new(0.0, mtf(c1 - mean_median, TARGET_BACKGROUND), c1)
        } else {
            let c0 = stats
                .iter()
                .filter(|s| has_spread(s))
                .map(|s| s.median as f64 + SHADOWS_CLIPPING * s.mad as f64)
                .sum::<f64>()
                / n;
            let c0 = c0.clamp(0.0, 1.0);
            ChannelTransform::new(c0, mtf(TARGET_BACKGROUND, mean_median - c0), 1.0)
        };
        return HistogramTransform::broadcast(row, stats.len());
    }

    let mut transform = HistogramTransform::identity();
    for (c, s) in stats.iter().enumerate() {
        let median = s.median as f64;
        let mad = s.mad as f64;
        let spread = 1.0 + mad != 1.0;
        transform.rows[c] = if median < 0.5 {
            let c0 = if spread {
                (median + SHADOWS_CLIPPING * mad).clamp(0.0, 1.0)
            } else {
                0.0
            };
            ChannelTransform::new(c0, mtf(TARGET_BACKGROUND, median - c0), 1.0)
        } else {
            let c1 = if spread {
                (median - SHADOWS_CLIPPING * mad).clamp(0.0, 1.0)
            } else {
                1.0
            };
            ChannelTransform::new(0.0, mtf(c1 - median, TARGET_BACKGROUND), c1)
        };
    }
    transform
}
