use crate::astro_image::{AstroImage, InterpolationMethod, Rect, crop_and_resample};

/// Blend weights for an in-place composite.
///
/// A weight of 1 takes the composite, 0 keeps the original starless sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Mask {
    image: AstroImage,
}

impl Mask {
    /// Wraps a mask image, complementing it once if `inverted`.
    pub fn new(mut image: AstroImage, inverted: bool) -> Self {
        if inverted {
            image.invert();
        }
        Self { image }
    }

    pub fn image(&self) -> &AstroImage {
        &self.image
    }

    /// Whether the mask has the same size as `image`.
    pub fn fits(&self, image: &AstroImage) -> bool {
        self.image.width() == image.width() && self.image.height() == image.height()
    }

    /// Weight plane for image channel `c`; grayscale masks serve every channel.
    pub fn weights(&self, c: usize) -> &[f32] {
        let c = c.min(self.image.channels() - 1);
        self.image.channel(c).pixels()
    }

    pub fn crop_and_resample(&self, rect: &Rect, factor: f64, method: InterpolationMethod) -> Self {
        Self {
            image: crop_and_resample(&self.image, rect, factor, method),
        }
    }
}
