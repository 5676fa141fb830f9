use rayon::prelude::*;

use crate::astro_image::AstroImage;
use crate::math::mtf;

/// Index of the row applied to every channel after its own row.
pub const COMBINED_ROW: usize = 3;

/// Five transform parameters in one of the [`StfOrder`] layouts.
pub type StfRow = [f64; 5];

/// Column layout of an [`StfRow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StfOrder {
    /// `(shadows, highlights, midtones, low, high)`, as passed to processes.
    #[default]
    Process,
    /// `(midtones, shadows, highlights, low, high)`, as stored on views.
    View,
    /// `(shadows, midtones, highlights, low, high)`, histogram transform rows.
    Histogram,
}

/// Clip, midtones and output-range parameters for one channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelTransform {
    /// Input value mapped to 0 (clip point)
    pub shadows: f64,
    /// Midtones balance of the transfer function
    pub midtones: f64,
    /// Input value mapped to 1 (clip point)
    pub highlights: f64,
    /// Output range start
    pub low: f64,
    /// Output range end
    pub high: f64,
}

impl ChannelTransform {
    pub const IDENTITY: Self = Self {
        shadows: 0.0,
        midtones: 0.5,
        highlights: 1.0,
        low: 0.0,
        high: 1.0,
    };

    /// Transform with the default `[0, 1]` output range.
    pub fn new(shadows: f64, midtones: f64, highlights: f64) -> Self {
        Self {
            shadows,
            midtones,
            highlights,
            ..Self::IDENTITY
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    #[inline]
    pub fn apply(&self, x: f64) -> f64 {
        let clipped = if x <= self.shadows {
            0.0
        } else if x >= self.highlights {
            1.0
        } else {
            (x - self.shadows) / (self.highlights - self.shadows)
        };
        self.low + mtf(self.midtones, clipped) * (self.high - self.low)
    }

    pub fn to_row(&self, order: StfOrder) -> StfRow {
        let Self {
            shadows: c0,
            midtones: m,
            highlights: c1,
            low: r0,
            high: r1,
        } = *self;
        match order {
            StfOrder::Process => [c0, c1, m, r0, r1],
            StfOrder::View => [m, c0, c1, r0, r1],
            StfOrder::Histogram => [c0, m, c1, r0, r1],
        }
    }

    pub fn from_row(row: &StfRow, order: StfOrder) -> Self {
        let (shadows, midtones, highlights) = match order {
            StfOrder::Process => (row[0], row[2], row[1]),
            StfOrder::View => (row[1], row[0], row[2]),
            StfOrder::Histogram => (row[0], row[1], row[2]),
        };
        Self {
            shadows,
            midtones,
            highlights,
            low: row[3],
            high: row[4],
        }
    }
}

impl Default for ChannelTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Four-row screen transfer table in host layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StfArray {
    pub order: StfOrder,
    pub rows: [StfRow; 4],
}

/// Rows R, G, B and the combined row, in that order.
///
/// Mono images use row 0; copied mono view transforms live in the
/// combined row.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HistogramTransform {
    pub rows: [ChannelTransform; 4],
}

impl HistogramTransform {
    pub fn identity() -> Self {
        Self::default()
    }

    /// Uses `transform` for the first `channels` rows; the rest stay identity.
    pub fn broadcast(transform: ChannelTransform, channels: usize) -> Self {
        debug_assert!(channels <= COMBINED_ROW);
        let mut rows = [ChannelTransform::IDENTITY; 4];
        rows[..channels].fill(transform);
        Self { rows }
    }

    /// True iff every row is `(0, 0.5, 1, 0, 1)`.
    pub fn is_identity(&self) -> bool {
        self.rows.iter().all(ChannelTransform::is_identity)
    }

    pub fn row(&self, c: usize) -> &ChannelTransform {
        &self.rows[c]
    }

    pub fn combined(&self) -> &ChannelTransform {
        &self.rows[COMBINED_ROW]
    }

    pub fn to_stf_array(&self, order: StfOrder) -> StfArray {
        StfArray {
            order,
            rows: self.rows.map(|row| row.to_row(order)),
        }
    }

    pub fn from_stf_array(stf: &StfArray) -> Self {
        Self {
            rows: stf.rows.map(|row| ChannelTransform::from_row(&row, stf.order)),
        }
    }

    /// Display transform for a view whose own transfer function is `view_stf`.
    ///
    /// Color images keep one row per channel; a grayscale image's row moves
    /// to the combined row. Output ranges are reset to `[0, 1]`.
    pub fn from_view_stf(view_stf: &HistogramTransform, channels: usize) -> Self {
        let strip = |row: &ChannelTransform| {
            ChannelTransform::new(row.shadows, row.midtones, row.highlights)
        };
        let mut transform = Self::identity();
        if channels == 1 {
            transform.rows[COMBINED_ROW] = strip(&view_stf.rows[0]);
        } else {
            for c in 0..channels.min(COMBINED_ROW) {
                transform.rows[c] = strip(&view_stf.rows[c]);
            }
        }
        transform
    }

    /// Applies the channel row then the combined row to a single sample.
    #[inline]
    pub fn apply(&self, c: usize, x: f64) -> f64 {
        self.combined().apply(self.rows[c].apply(x))
    }
}

/// Applies `transform` to every channel of `image` in place.
pub fn apply_histogram_transform(image: &mut AstroImage, transform: &HistogramTransform) {
    if transform.is_identity() {
        return;
    }

    let combined = *transform.combined();
    image
        .planes_mut()
        .par_iter_mut()
        .enumerate()
        .for_each(|(c, plane)| {
            let row = transform.rows[c];
            if row.is_identity() && combined.is_identity() {
                return;
            }
            for v in plane.iter_mut() {
                *v = combined.apply(row.apply(*v as f64)) as f32;
            }
        });
}
