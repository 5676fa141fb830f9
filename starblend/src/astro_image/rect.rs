/// Axis-aligned rectangle in continuous image or view coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    /// Builds a rectangle from two corners in any order.
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    pub fn from_size(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn is_empty(&self) -> bool {
        self.area() <= 0.0
    }

    /// Overlap of two rectangles; empty (zero-sized) when they do not touch.
    pub fn intersect(&self, other: &Rect) -> Rect {
        let x0 = self.x0.max(other.x0);
        let y0 = self.y0.max(other.y0);
        Rect {
            x0,
            y0,
            x1: self.x1.min(other.x1).max(x0),
            y1: self.y1.min(other.y1).max(y0),
        }
    }

    /// Smallest whole-pixel region covering the rectangle inside a
    /// `width x height` image. Always at least one pixel.
    pub fn pixel_bounds(&self, width: usize, height: usize) -> PixelRect {
        debug_assert!(width > 0 && height > 0);

        let (x, w) = span(self.x0, self.x1, width);
        let (y, h) = span(self.y0, self.y1, height);
        PixelRect {
            x,
            y,
            width: w,
            height: h,
        }
    }
}

fn span(start: f64, end: f64, limit: usize) -> (usize, usize) {
    let first = (start.floor().max(0.0) as usize).min(limit - 1);
    let last = (end.ceil().max(0.0) as usize).clamp(first + 1, limit);
    (first, last - first)
}

/// Integer pixel region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PixelRect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}
