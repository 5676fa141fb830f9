//! Median and MAD over f32 sample buffers.


/// MAD (Median Absolute Deviation) to standard deviation conversion factor.
///
/// For a normal distribution, σ ≈ 1.4826 × MAD.
pub const MAD_TO_SIGMA: f32 = 1.4826022;

/// Calculate the median of f32 values in-place.
///
/// Mutates the input buffer (partial sort via quickselect).
#[inline]
pub fn median_f32_mut(data: &mut [f32]) -> f32 {
    debug_assert!(!data.is_empty());

    let len = data.len();
    let mid = len / 2;

    let (left_part, upper, _) = data.select_nth_unstable_by(mid, f32::total_cmp);
    let upper = *upper;
    if len & 1 == 1 {
        return upper;
    }

    let lower = left_part.iter().copied().fold(f32::MIN, f32::max);
    (lower + upper) * 0.5
}

/// Compute median and MAD together. Mutates the input buffer.
///
/// The MAD is raw, not scaled by [`MAD_TO_SIGMA`].
pub fn median_and_mad_f32_mut(data: &mut [f32]) -> (f32, f32) {
    debug_assert!(!data.is_empty());

    let median = median_f32_mut(data);
    for v in data.iter_mut() {
        *v = (*v - median).abs();
    }
    let mad = median_f32_mut(data);

    (median, mad)
}

/// Median and normalized MAD of a channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelStats {
    pub median: f32,
    /// MAD scaled by [`MAD_TO_SIGMA`].
    pub mad: f32,
}

impl ChannelStats {
    /// Computes stats from `samples` using `scratch` as the working buffer.
    pub fn compute(samples: &[f32], scratch: &mut Vec<f32>) -> Self {
        if samples.is_empty() {
            return Self {
                median: 0.0,
                mad: 0.0,
            };
        }
        scratch.clear();
        scratch.extend_from_slice(samples);
        let (median, mad) = median_and_mad_f32_mut(scratch);
        Self {
            median,
            mad: mad * MAD_TO_SIGMA,
        }
    }

    /// Channels with a median above 0.5 are stretched from the highlights.
    pub fn is_inverted(&self) -> bool {
        self.median > 0.5
    }
}
