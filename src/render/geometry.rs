//! Layout math shared by the rasterizer. Everything here is in logical pixels.

use crate::foundation::core::{Affine, Point, Vec2};
use crate::scene::element::TextAlign;

/// Line advance as a multiple of the font size.
pub const LINE_HEIGHT: f64 = 1.2;

/// Fit an image of intrinsic size `iw × ih` into a `size × size` box, keeping its aspect ratio.
///
/// Wider-than-tall images get the full width; everything else gets the full height.
pub fn fit_within(iw: f64, ih: f64, size: f64) -> (f64, f64) {
    if !(iw > 0.0 && ih > 0.0) {
        return (size, size);
    }
    let aspect = iw / ih;
    if aspect > 1.0 {
        (size, size / aspect)
    } else {
        (size * aspect, size)
    }
}

/// Vertical offset of each line from the element origin, for a block centered on the origin.
pub fn line_offsets(line_count: usize, size: f64) -> Vec<f64> {
    let mid = (line_count as f64 - 1.0) / 2.0;
    (0..line_count)
        .map(|i| (i as f64 - mid) * size * LINE_HEIGHT)
        .collect()
}

/// Horizontal start of a line of width `line_width` relative to the origin.
pub fn align_offset(align: TextAlign, line_width: f64) -> f64 {
    match align {
        TextAlign::Left => 0.0,
        TextAlign::Center => -line_width / 2.0,
        TextAlign::Right => -line_width,
    }
}

/// Transform that moves the drawing origin to `origin` and rotates clockwise by `rotation_deg`.
pub fn element_transform(base: Affine, origin: Point, rotation_deg: f64) -> Affine {
    base * Affine::translate(origin.to_vec2()) * Affine::rotate(rotation_deg.to_radians())
}

/// Transform that maps a `src_w × src_h` bitmap onto a `dst_w × dst_h` box centered on the
/// element origin.
pub fn centered_box(element: Affine, src_w: f64, src_h: f64, dst_w: f64, dst_h: f64) -> Affine {
    element
        * Affine::translate(Vec2::new(-dst_w / 2.0, -dst_h / 2.0))
        * Affine::scale_non_uniform(dst_w / src_w, dst_h / src_h)
}

/// The CSS gradient line for an angle over a `w × h` box: start and end points.
///
/// The angle is measured clockwise from "to top"; the line passes through the box center and
/// is long enough that the corners land exactly on the 0% and 100% perpendiculars.
pub fn gradient_line(angle_deg: f64, w: f64, h: f64) -> (Point, Point) {
    let rad = angle_deg.to_radians();
    let dir = Vec2::new(rad.sin(), -rad.cos());
    let len = (w * rad.sin()).abs() + (h * rad.cos()).abs();
    let center = Point::new(w / 2.0, h / 2.0);
    let half = dir * (len / 2.0);
    (center - half, center + half)
}

/// Parameter of `p` projected onto the gradient line, `0` at `start` and `1` at `end`.
pub fn gradient_t(p: Point, start: Point, end: Point) -> f64 {
    let d = end - start;
    let len2 = d.hypot2();
    if len2 <= f64::EPSILON {
        return 0.0;
    }
    (p - start).dot(d) / len2
}

#[cfg(test)]
#[path = "../../tests/unit/render/geometry.rs"]
mod tests;
