mod rect;
mod resample;


pub use rect::{PixelRect, Rect};
pub use resample::{InterpolationMethod, crop_and_resample};

use common::Buffer2;
use rayon::prelude::*;

use crate::math::statistics::{ChannelStats, median_f32_mut};

/// Image dimensions: width, height, and number of channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ImageDimensions {
    /// Image width in pixels
    pub width: usize,
    /// Image height in pixels
    pub height: usize,
    /// Number of channels (1 for grayscale, 3 for RGB)
    pub channels: usize,
}

impl ImageDimensions {
    pub fn new(width: usize, height: usize, channels: usize) -> Self {
        assert!(width > 0, "Width must be positive");
        assert!(height > 0, "Height must be positive");
        assert!(
            channels == 1 || channels == 3,
            "Channels must be 1 (grayscale) or 3 (RGB)"
        );
        Self {
            width,
            height,
            channels,
        }
    }

    /// Total number of sample values (width * height * channels).
    pub fn sample_count(&self) -> usize {
        self.width * self.height * self.channels
    }

    pub fn is_grayscale(&self) -> bool {
        self.channels == 1
    }

    pub fn is_rgb(&self) -> bool {
        self.channels == 3
    }
}

/// Planar f32 image with samples normalized to [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct AstroImage {
    dimensions: ImageDimensions,
    planes: Vec<Buffer2<f32>>,
}

impl AstroImage {
    /// Builds an image from interleaved samples (`RGBRGB...` for color).
    pub fn from_pixels(dimensions: ImageDimensions, pixels: Vec<f32>) -> Self {
        assert_eq!(
            pixels.len(),
            dimensions.sample_count(),
            "Pixel count mismatch"
        );

        if dimensions.is_grayscale() {
            return Self {
                dimensions,
                planes: vec![Buffer2::new(dimensions.width, dimensions.height, pixels)],
            };
        }

        let channels = dimensions.channels;
        let planes = (0..channels)
            .map(|c| {
                let plane = pixels.iter().skip(c).step_by(channels).copied().collect();
                Buffer2::new(dimensions.width, dimensions.height, plane)
            })
            .collect();

        Self { dimensions, planes }
    }

    /// Builds an image from one buffer per channel.
    pub fn from_planes(planes: Vec<Buffer2<f32>>) -> Self {
        assert!(!planes.is_empty(), "At least one channel is required");
        let (width, height) = (planes[0].width(), planes[0].height());
        assert!(
            planes.iter().all(|p| p.same_size(&planes[0])),
            "All channels must have the same size"
        );

        Self {
            dimensions: ImageDimensions::new(width, height, planes.len()),
            planes,
        }
    }

    pub fn new_filled(dimensions: ImageDimensions, value: f32) -> Self {
        let planes = (0..dimensions.channels)
            .map(|_| Buffer2::new_filled(dimensions.width, dimensions.height, value))
            .collect();
        Self { dimensions, planes }
    }

    pub fn dimensions(&self) -> ImageDimensions {
        self.dimensions
    }

    pub fn width(&self) -> usize {
        self.dimensions.width
    }

    pub fn height(&self) -> usize {
        self.dimensions.height
    }

    pub fn channels(&self) -> usize {
        self.dimensions.channels
    }

    pub fn is_color(&self) -> bool {
        self.dimensions.is_rgb()
    }

    pub fn channel(&self, c: usize) -> &Buffer2<f32> {
        &self.planes[c]
    }

    pub fn channel_mut(&mut self, c: usize) -> &mut Buffer2<f32> {
        &mut self.planes[c]
    }

    pub fn planes(&self) -> &[Buffer2<f32>] {
        &self.planes
    }

    pub fn planes_mut(&mut self) -> &mut [Buffer2<f32>] {
        &mut self.planes
    }

    /// Sample at `(x, y)` in channel `c`.
    #[inline]
    pub fn sample(&self, x: usize, y: usize, c: usize) -> f32 {
        self.planes[c][(x, y)]
    }

    /// Interleaved copy of the samples (`RGBRGB...` for color).
    pub fn to_interleaved_pixels(&self) -> Vec<f32> {
        if self.dimensions.is_grayscale() {
            return self.planes[0].pixels().to_vec();
        }

        let mut pixels = Vec::with_capacity(self.dimensions.sample_count());
        for i in 0..self.width() * self.height() {
            pixels.extend(self.planes.iter().map(|p| p.pixels()[i]));
        }
        pixels
    }

    /// Two images are compatible when they share width, height and color-ness.
    pub fn is_compatible(&self, other: &AstroImage) -> bool {
        self.width() == other.width()
            && self.height() == other.height()
            && self.is_color() == other.is_color()
    }

    /// Applies `f` to every sample of every channel.
    pub fn map_in_place(&mut self, f: impl Fn(f32) -> f32 + Sync) {
        self.planes.par_iter_mut().for_each(|plane| {
            for v in plane.iter_mut() {
                *v = f(*v);
            }
        });
    }

    /// Replaces every sample `v` with `1 - v`.
    pub fn invert(&mut self) {
        self.map_in_place(|v| 1.0 - v);
    }

    /// Median over the samples of all channels.
    pub fn median(&self) -> f32 {
        let mut samples: Vec<f32> = self
            .planes
            .iter()
            .flat_map(|p| p.iter().copied())
            .collect();
        median_f32_mut(&mut samples)
    }

    /// Median and normalized MAD of each channel.
    pub fn channel_stats(&self) -> Vec<ChannelStats> {
        self.planes
            .par_iter()
            .map(|plane| {
                let mut scratch = Vec::with_capacity(plane.len());
                ChannelStats::compute(plane.pixels(), &mut scratch)
            })
            .collect()
    }
}
