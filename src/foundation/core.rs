use crate::foundation::error::{LoveNotesError, LoveNotesResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Lower bound of the percentage coordinate space.
pub const PERCENT_MIN: f64 = 0.0;
/// Upper bound of the percentage coordinate space.
pub const PERCENT_MAX: f64 = 100.0;
/// Smallest element size the editor accepts.
pub const SIZE_MIN: f64 = 10.0;
/// Largest element size the editor accepts.
pub const SIZE_MAX: f64 = 600.0;
/// Rotation bounds in degrees, around the element's own center.
pub const ROTATION_MIN: f64 = -180.0;
/// See [`ROTATION_MIN`].
pub const ROTATION_MAX: f64 = 180.0;
/// Magnitude bound for layer keys; front/back moves renumber before crossing it.
pub const LAYER_LIMIT: i64 = 1_000_000_000;

/// Clamp a percentage coordinate into `[0, 100]`.
pub fn clamp_percent(v: f64) -> f64 {
    v.clamp(PERCENT_MIN, PERCENT_MAX)
}

/// Clamp an element size into the editor range.
pub fn clamp_size(v: f64) -> f64 {
    v.clamp(SIZE_MIN, SIZE_MAX)
}

/// Clamp a rotation into `[-180, 180]` degrees.
pub fn clamp_rotation(v: f64) -> f64 {
    v.clamp(ROTATION_MIN, ROTATION_MAX)
}

/// Clamp a layer key into `[-LAYER_LIMIT, LAYER_LIMIT]`.
pub fn clamp_layer(v: i64) -> i64 {
    v.clamp(-LAYER_LIMIT, LAYER_LIMIT)
}

/// Element anchor expressed as percentages of canvas width and height.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Percent {
    /// Horizontal position, 0 = left edge, 100 = right edge.
    pub x: f64,
    /// Vertical position, 0 = top edge, 100 = bottom edge.
    pub y: f64,
}

impl Percent {
    /// The canvas center, where new elements land.
    pub const CENTER: Self = Self { x: 50.0, y: 50.0 };

    /// Build a clamped position.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: clamp_percent(x),
            y: clamp_percent(y),
        }
    }

    /// Shift by `(dx, dy)` percentage points, clamping the result.
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Convert to absolute logical pixels for a canvas of `size`.
    pub fn to_logical(self, size: LogicalSize) -> Point {
        Point::new(
            self.x / 100.0 * f64::from(size.width),
            self.y / 100.0 * f64::from(size.height),
        )
    }
}

/// Logical (pre-supersampling) canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LogicalSize {
    /// Width in logical pixels.
    pub width: u32,
    /// Height in logical pixels.
    pub height: u32,
}

impl LogicalSize {
    /// Create a validated non-empty size.
    pub fn new(width: u32, height: u32) -> LoveNotesResult<Self> {
        if width == 0 || height == 0 {
            return Err(LoveNotesError::validation(
                "canvas width and height must be > 0",
            ));
        }
        Ok(Self { width, height })
    }

    /// Physical size after multiplying both axes by `factor`.
    pub fn scaled(self, factor: u32) -> LoveNotesResult<Self> {
        let width = self
            .width
            .checked_mul(factor)
            .ok_or_else(|| LoveNotesError::validation("scaled width overflows"))?;
        let height = self
            .height
            .checked_mul(factor)
            .ok_or_else(|| LoveNotesError::validation("scaled height overflows"))?;
        Self::new(width, height)
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    /// Red channel premultiplied by alpha.
    pub r: u8,
    /// Green channel premultiplied by alpha.
    pub g: u8,
    /// Blue channel premultiplied by alpha.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8Premul {
    /// Fully transparent black.
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// Convert straight-alpha RGBA8 into premultiplied RGBA8.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    /// Byte order used by pixmaps.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Premultiply straight-alpha RGBA8 bytes in place.
pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

/// Undo premultiplication in place, for encoders that expect straight alpha.
pub(crate) fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u32;
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
