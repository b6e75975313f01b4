use std::sync::Arc;

use crate::foundation::core::{Affine, premultiply_rgba8_in_place};
use crate::foundation::error::{LoveNotesError, LoveNotesResult};

/// Decoded raster image in premultiplied RGBA8 form.
#[derive(Clone, Debug)]
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

/// Parsed SVG document, rasterized lazily at draw size.
#[derive(Clone, Debug)]
pub struct PreparedSvg {
    /// Parsed SVG tree.
    pub tree: Arc<usvg::Tree>,
}

/// A resolved, decoded asset ready for drawing.
#[derive(Clone, Debug)]
pub enum PreparedAsset {
    /// Bitmap formats (PNG, JPEG, GIF, WebP, ...).
    Raster(PreparedImage),
    /// Vector stickers.
    Svg(PreparedSvg),
}

impl PreparedAsset {
    /// Intrinsic size in pixels, used for aspect-ratio fitting.
    pub fn intrinsic_size(&self) -> (f64, f64) {
        match self {
            Self::Raster(i) => (f64::from(i.width), f64::from(i.height)),
            Self::Svg(s) => {
                let size = s.tree.size();
                (f64::from(size.width()), f64::from(size.height()))
            }
        }
    }
}

/// Decode fetched bytes, sniffing SVG by content.
pub fn decode_asset(bytes: &[u8]) -> LoveNotesResult<PreparedAsset> {
    if looks_like_svg(bytes) {
        return parse_svg(bytes).map(PreparedAsset::Svg);
    }
    decode_image(bytes).map(PreparedAsset::Raster)
}

/// Decode a bitmap and premultiply it.
pub fn decode_image(bytes: &[u8]) -> LoveNotesResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| LoveNotesError::decode(format!("decode image from memory: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(LoveNotesError::decode("image has zero width or height"));
    }

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

/// Parse an SVG document.
pub fn parse_svg(bytes: &[u8]) -> LoveNotesResult<PreparedSvg> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts)
        .map_err(|e| LoveNotesError::decode(format!("parse svg tree: {e}")))?;
    Ok(PreparedSvg {
        tree: Arc::new(tree),
    })
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(512)];
    let Ok(text) = std::str::from_utf8(head) else {
        return false;
    };
    let text = text.trim_start_matches('\u{feff}').trim_start();
    text.starts_with("<svg") || (text.starts_with("<?xml") && text.contains("<svg"))
}

/// Compute a raster size for an SVG given the full device transform.
///
/// The returned `(width, height, transform_adjust)` are used as:
///
/// - rasterize the SVG into a pixmap of `(width, height)`
/// - draw the resulting image with `transform_adjust` (not the original transform)
pub(crate) fn svg_raster_params(
    tree: &usvg::Tree,
    transform: Affine,
) -> LoveNotesResult<(u32, u32, Affine)> {
    fn extent(v: f32) -> LoveNotesResult<f64> {
        if !v.is_finite() || v <= 0.0 {
            return Err(LoveNotesError::decode("svg has invalid width/height"));
        }
        Ok(f64::from(v))
    }

    let size = tree.size();
    let tree_w = extent(size.width())?;
    let tree_h = extent(size.height())?;

    let [a, b, c, d, _e, _f] = transform.as_coeffs();
    let sx = (a * a + b * b).sqrt().max(1e-6);
    let sy = (c * c + d * d).sqrt().max(1e-6);

    let w = (tree_w * sx).ceil().max(1.0) as u32;
    let h = (tree_h * sy).ceil().max(1.0) as u32;

    const MAX_DIM: u32 = 8_192;
    if w > MAX_DIM || h > MAX_DIM {
        return Err(LoveNotesError::decode(format!(
            "svg raster size too large: {w}x{h} (max {MAX_DIM}x{MAX_DIM})"
        )));
    }

    // The pixmap covers the tree extent, which may be fractional.
    let inv = Affine::scale_non_uniform(tree_w / f64::from(w), tree_h / f64::from(h));
    Ok((w, h, transform * inv))
}

/// Rasterize an SVG tree into premultiplied RGBA8 of the given size.
pub(crate) fn rasterize_svg_to_premul_rgba8(
    tree: &usvg::Tree,
    width: u32,
    height: u32,
) -> LoveNotesResult<Vec<u8>> {
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| LoveNotesError::decode("failed to allocate svg pixmap"))?;

    let sx = (width as f32) / tree.size().width();
    let sy = (height as f32) / tree.size().height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(tree, xform, &mut pixmap.as_mut());
    Ok(pixmap.data().to_vec())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
