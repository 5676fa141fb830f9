//! Reverse-stretch normalization.
//!
//! Compositing formulas assume linear data. For a stretched starless image
//! the operands are pushed through an MTF that maps its median down to
//! [`LINEAR_THRESHOLD`], composited, and the result is mapped back with the
//! inverse MTF.

use crate::math::{LINEAR_THRESHOLD, mtf, mtf_inverse};

/// Forward/inverse MTF pair wrapped around a composite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReverseStretch {
    balance: f64,
}

impl ReverseStretch {
    pub const IDENTITY: Self = Self { balance: 0.5 };

    /// Chooses the balance from the starless image median.
    ///
    /// Disabled, or linear data (median at or below [`LINEAR_THRESHOLD`]),
    /// gives the identity.
    pub fn from_median(median: f64, enabled: bool) -> Self {
        if !enabled || median <= LINEAR_THRESHOLD {
            return Self::IDENTITY;
        }
        Self {
            balance: mtf(LINEAR_THRESHOLD, median),
        }
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn is_identity(&self) -> bool {
        self.balance == 0.5
    }

    /// Maps a stretched sample to pseudo-linear space.
    #[inline]
    pub fn forward(&self, x: f64) -> f64 {
        mtf(self.balance, x)
    }

    /// Undoes [`forward`](Self::forward).
    #[inline]
    pub fn inverse(&self, x: f64) -> f64 {
        mtf_inverse(self.balance, x)
    }
}

impl Default for ReverseStretch {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use common::FloatExt;

    use super::*;

    #[test]
    fn test_disabled_or_linear_is_identity() {
        assert!(ReverseStretch::from_median(0.3, false).is_identity());
        assert!(ReverseStretch::from_median(0.01, true).is_identity());
        assert!(ReverseStretch::from_median(0.004, true).is_identity());
        assert_eq!(ReverseStretch::IDENTITY.forward(0.37), 0.37);
    }

    #[test]
    fn test_forward_maps_median_to_linear_threshold() {
        let stretch = ReverseStretch::from_median(0.2, true);
        assert!(!stretch.is_identity());
        assert!(stretch.forward(0.2).approx_eq_eps(LINEAR_THRESHOLD, 1e-12));
    }

    #[test]
    fn test_sandwich_with_half_median_is_identity() {
        // Median 0.5 forward maps to 0.01; the inverse brings it back.
        let stretch = ReverseStretch::from_median(0.5, true);
        for i in 0..=10 {
            let x = i as f64 / 10.0;
            assert!(stretch.inverse(stretch.forward(x)).approx_eq_eps(x, 1e-9));
        }
        assert!(stretch.forward(0.5).approx_eq_eps(LINEAR_THRESHOLD, 1e-12));
    }
}
