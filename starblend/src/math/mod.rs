//! Midtones transfer function and robust statistics.

pub mod statistics;

/// Median threshold below which an image is treated as linear data.
///
/// Also the target median used to derive the reverse-stretch balance.
pub const LINEAR_THRESHOLD: f64 = 0.01;

/// Midtones transfer function with midtones balance `m`.
///
/// Maps 0 to 0, 1 to 1 and `m` to 0.5. A balance of 0.5 is the identity.
#[inline]
pub fn mtf(m: f64, x: f64) -> f64 {
    if m == 0.5 {
        return x;
    }
    if x == m {
        return 0.5;
    }
    if x >= 1.0 {
        return 1.0;
    }
    if x <= 0.0 {
        return 0.0;
    }
    ((m - 1.0) * x) / ((2.0 * m - 1.0) * x - m)
}

/// Inverse of [`mtf`] for the same balance: `mtf(m, mtf_inverse(m, x)) == x`.
#[inline]
pub fn mtf_inverse(m: f64, x: f64) -> f64 {
    mtf(1.0 - m, x)
}
