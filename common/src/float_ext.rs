pub trait FloatExt {
    fn approximately_eq(self, other: Self) -> bool;
    fn approx_eq_eps(self, other: Self, eps: Self) -> bool;
}

impl FloatExt for f32 {
    fn approximately_eq(self, other: Self) -> bool {
        (self - other).abs() < crate::EPSILON as f32
    }

    fn approx_eq_eps(self, other: Self, eps: Self) -> bool {
        (self - other).abs() <= eps
    }
}

impl FloatExt for f64 {
    fn approximately_eq(self, other: Self) -> bool {
        (self - other).abs() < crate::EPSILON
    }

    fn approx_eq_eps(self, other: Self, eps: Self) -> bool {
        (self - other).abs() <= eps
    }
}
