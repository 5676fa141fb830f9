//! Mapping between the preview viewport and image coordinates.

use crate::astro_image::Rect;

/// Scale at which `selection` fits into `viewport`, never enlarging.
pub fn zoom_factor(selection: &Rect, viewport: (usize, usize)) -> f64 {
    if selection.is_empty() {
        return 1.0;
    }
    let (width, height) = (viewport.0 as f64, viewport.1 as f64);
    (width / selection.width())
        .min(height / selection.height())
        .min(1.0)
}

/// Area of the viewport covered by the scaled selection, centered.
pub fn drawn_rect(selection: &Rect, viewport: (usize, usize)) -> Rect {
    let zoom = zoom_factor(selection, viewport);
    let width = zoom * selection.width();
    let height = zoom * selection.height();
    let x0 = (0.5 * (viewport.0 as f64 - width)).max(0.0);
    let y0 = (0.5 * (viewport.1 as f64 - height)).max(0.0);
    Rect::new(x0, y0, x0 + width, y0 + height)
}

/// Converts a rectangle dragged in the viewport into image coordinates.
///
/// The drag is clamped to the drawn area first. Returns `None` when
/// nothing is drawn or the clamped drag has no area.
pub fn view_to_image_rect(
    view_rect: &Rect,
    selection: &Rect,
    viewport: (usize, usize),
) -> Option<Rect> {
    let drawn = drawn_rect(selection, viewport);
    if drawn.is_empty() {
        return None;
    }
    let clamped = view_rect.intersect(&drawn);
    if clamped.is_empty() {
        return None;
    }

    let to_x = |x: f64| selection.x0 + selection.width() * (x - drawn.x0) / drawn.width();
    let to_y = |y: f64| selection.y0 + selection.height() * (y - drawn.y0) / drawn.height();
    Some(Rect::new(
        to_x(clamped.x0),
        to_y(clamped.y0),
        to_x(clamped.x1),
        to_y(clamped.y1),
    ))
}
