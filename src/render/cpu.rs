use std::collections::HashMap;
use std::sync::Arc;

use usvg::fontdb;

use crate::assets::color::ColorDef;
use crate::assets::decode::{PreparedAsset, rasterize_svg_to_premul_rgba8, svg_raster_params};
use crate::assets::fonts::{FontBook, ResolvedFont, TextBrushRgba8, TextLayoutEngine};
use crate::assets::source::AssetRef;
use crate::foundation::core::{Affine, LogicalSize, Point, Vec2};
use crate::foundation::error::{LoveNotesError, LoveNotesResult};
use crate::render::FrameRGBA;
use crate::render::geometry::{
    align_offset, centered_box, element_transform, fit_within, gradient_line, gradient_t,
    line_offsets,
};
use crate::render::resolve::ResolvedAssets;
use crate::scene::background::{Background, LinearGradient};
use crate::scene::card::Card;
use crate::scene::element::{DecalSource, Element, ElementKind, TextAlign};
use crate::scene::model::paint_order;

/// Font stack used for glyph decals.
pub const GLYPH_FONT_FAMILY: &str = "sans-serif";

/// Supersampled CPU rasterizer built on `vello_cpu`.
///
/// Drawing is synchronous: every asset must already be in the [`ResolvedAssets`] passed in.
/// Decoded paints are cached across calls, keyed by reference.
pub struct CpuRasterizer {
    text: TextLayoutEngine,
    image_cache: HashMap<AssetRef, vello_cpu::Image>,
    svg_cache: HashMap<(AssetRef, u32, u32), vello_cpu::Image>,
    font_cache: HashMap<fontdb::ID, vello_cpu::peniko::FontData>,
}

impl Default for CpuRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CpuRasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuRasterizer")
            .field("cached_images", &self.image_cache.len())
            .field("cached_svgs", &self.svg_cache.len())
            .field("cached_fonts", &self.font_cache.len())
            .finish()
    }
}

impl CpuRasterizer {
    /// Rasterizer with empty caches.
    pub fn new() -> Self {
        Self {
            text: TextLayoutEngine::new(),
            image_cache: HashMap::new(),
            svg_cache: HashMap::new(),
            font_cache: HashMap::new(),
        }
    }

    /// Render `card` onto a `canvas`-sized logical surface at `supersample`× pixel density.
    ///
    /// The returned frame is `canvas × supersample` pixels, premultiplied.
    pub fn render(
        &mut self,
        card: &Card,
        canvas: LogicalSize,
        supersample: u32,
        assets: &ResolvedAssets,
        fonts: &FontBook,
    ) -> LoveNotesResult<FrameRGBA> {
        if supersample == 0 {
            return Err(LoveNotesError::validation("supersample factor must be >= 1"));
        }
        let physical = canvas.scaled(supersample)?;
        let width: u16 = physical
            .width
            .try_into()
            .map_err(|_| LoveNotesError::validation("surface width exceeds u16"))?;
        let height: u16 = physical
            .height
            .try_into()
            .map_err(|_| LoveNotesError::validation("surface height exceeds u16"))?;

        let base = Affine::scale(f64::from(supersample));
        let mut ctx = vello_cpu::RenderContext::new(width, height);

        self.draw_background(&mut ctx, &card.background, canvas, physical, base, assets)?;
        for el in paint_order(&card.elements) {
            self.draw_element(&mut ctx, el, canvas, base, assets, fonts)?;
        }

        let mut pixmap = vello_cpu::Pixmap::new(width, height);
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);

        Ok(FrameRGBA {
            width: physical.width,
            height: physical.height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }

    fn draw_background(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        background: &Background,
        canvas: LogicalSize,
        physical: LogicalSize,
        base: Affine,
        assets: &ResolvedAssets,
    ) -> LoveNotesResult<()> {
        let (lw, lh) = (f64::from(canvas.width), f64::from(canvas.height));
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        match background {
            Background::Color(c) => {
                let [r, g, b, a] = c.to_rgba8();
                ctx.set_transform(affine_to_cpu(base));
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, lw, lh));
            }
            Background::LinearGradient(g) => {
                let bytes = gradient_premul_rgba8(g, canvas, physical)?;
                let pixmap = premul_bytes_to_pixmap(&bytes, physical.width, physical.height)?;
                ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                ctx.set_paint(image_paint(pixmap));
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                    0.0,
                    0.0,
                    f64::from(physical.width),
                    f64::from(physical.height),
                ));
            }
            Background::Image(asset) => {
                // Stretched to the full canvas; the aspect ratio is not preserved.
                let prepared = assets.get(asset)?;
                let (iw, ih) = prepared.intrinsic_size();
                let t = base * Affine::scale_non_uniform(lw / iw, lh / ih);
                self.draw_prepared(ctx, asset, prepared, t)?;
            }
        }
        Ok(())
    }

    fn draw_element(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        el: &Element,
        canvas: LogicalSize,
        base: Affine,
        assets: &ResolvedAssets,
        fonts: &FontBook,
    ) -> LoveNotesResult<()> {
        let origin = el.position.to_logical(canvas);
        let t = element_transform(base, origin, el.rotation);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        match &el.kind {
            ElementKind::Text(style) => {
                let color = ColorDef::parse_css(&style.color).unwrap_or_else(|e| {
                    tracing::warn!(id = %el.id, color = %style.color, error = %e, "invalid text color, using black");
                    ColorDef::BLACK
                });
                self.draw_text_block(
                    ctx,
                    t,
                    &style.content,
                    &style.font_family,
                    el.size,
                    color,
                    style.text_align,
                    fonts,
                )
            }
            ElementKind::Decal(DecalSource::Glyph(glyph)) => self.draw_text_block(
                ctx,
                t,
                glyph,
                GLYPH_FONT_FAMILY,
                el.size,
                ColorDef::BLACK,
                TextAlign::Center,
                fonts,
            ),
            ElementKind::Image { source } | ElementKind::Decal(DecalSource::Image(source)) => {
                let prepared = assets.get(source)?;
                let (iw, ih) = prepared.intrinsic_size();
                let (dw, dh) = fit_within(iw, ih, el.size);
                self.draw_prepared(ctx, source, prepared, centered_box(t, iw, ih, dw, dh))
            }
        }
    }

    /// Draw a decoded asset whose intrinsic box `(0,0)-(iw,ih)` is mapped by `t`.
    fn draw_prepared(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        asset: &AssetRef,
        prepared: &PreparedAsset,
        t: Affine,
    ) -> LoveNotesResult<()> {
        match prepared {
            PreparedAsset::Raster(img) => {
                let paint = match self.image_cache.get(asset) {
                    Some(p) => p.clone(),
                    None => {
                        let pixmap = premul_bytes_to_pixmap(
                            img.rgba8_premul.as_slice(),
                            img.width,
                            img.height,
                        )?;
                        let paint = image_paint(pixmap);
                        self.image_cache.insert(asset.clone(), paint.clone());
                        paint
                    }
                };
                ctx.set_transform(affine_to_cpu(t));
                ctx.set_paint(paint);
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                    0.0,
                    0.0,
                    f64::from(img.width),
                    f64::from(img.height),
                ));
            }
            PreparedAsset::Svg(svg) => {
                let (w, h, adjust) = svg_raster_params(&svg.tree, t)?;
                let key = (asset.clone(), w, h);
                let paint = match self.svg_cache.get(&key) {
                    Some(p) => p.clone(),
                    None => {
                        let rgba = rasterize_svg_to_premul_rgba8(&svg.tree, w, h)?;
                        let paint = image_paint(premul_bytes_to_pixmap(&rgba, w, h)?);
                        self.svg_cache.insert(key, paint.clone());
                        paint
                    }
                };
                ctx.set_transform(affine_to_cpu(adjust));
                ctx.set_paint(paint);
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                    0.0,
                    0.0,
                    f64::from(w),
                    f64::from(h),
                ));
            }
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_text_block(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        t: Affine,
        content: &str,
        families: &str,
        size: f64,
        color: ColorDef,
        align: TextAlign,
        fonts: &FontBook,
    ) -> LoveNotesResult<()> {
        let lines: Vec<&str> = content.split('\n').map(|l| l.trim_end_matches('\r')).collect();
        if lines.iter().all(|l| l.is_empty()) {
            return Ok(());
        }
        let Some(font) = fonts.resolve(families) else {
            tracing::warn!(families, "no font face available, skipping text");
            return Ok(());
        };
        let font_data = self.font_data_for(&font);
        let brush = TextBrushRgba8::from(color.to_rgba8());

        for (line, dy) in lines.iter().zip(line_offsets(lines.len(), size)) {
            if line.is_empty() {
                continue;
            }
            let layout = self.text.layout_line(line, &font, size as f32, brush)?;
            let w = f64::from(layout.width());
            let h = f64::from(layout.height());
            // The line box is centered vertically on its offset, like a `middle` baseline.
            let line_origin = Vec2::new(align_offset(align, w), dy - h / 2.0);
            ctx.set_transform(affine_to_cpu(t * Affine::translate(line_origin)));

            for layout_line in layout.lines() {
                for item in layout_line.items() {
                    let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                        continue;
                    };
                    let brush = run.style().brush;
                    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                        brush.r, brush.g, brush.b, brush.a,
                    ));
                    let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                        id: g.id,
                        x: g.x,
                        y: g.y,
                    });
                    ctx.glyph_run(&font_data)
                        .font_size(run.run().font_size())
                        .fill_glyphs(glyphs);
                }
            }
        }
        Ok(())
    }

    fn font_data_for(&mut self, font: &ResolvedFont) -> vello_cpu::peniko::FontData {
        self.font_cache
            .entry(font.id)
            .or_insert_with(|| {
                vello_cpu::peniko::FontData::new(
                    vello_cpu::peniko::Blob::from(font.data.as_ref().clone()),
                    font.index,
                )
            })
            .clone()
    }
}

/// Render a linear gradient at physical resolution, sampling at pixel centers in logical space.
pub(crate) fn gradient_premul_rgba8(
    gradient: &LinearGradient,
    canvas: LogicalSize,
    physical: LogicalSize,
) -> LoveNotesResult<Vec<u8>> {
    let (lw, lh) = (f64::from(canvas.width), f64::from(canvas.height));
    let sx = lw / f64::from(physical.width);
    let sy = lh / f64::from(physical.height);
    let angle = gradient.direction.angle_deg(lw, lh);
    let (start, end) = gradient_line(angle, lw, lh);
    let stops = gradient.resolved_stops();
    if stops.is_empty() {
        return Err(LoveNotesError::validation("gradient has no color stops"));
    }

    let len = physical.width as usize * physical.height as usize * 4;
    let mut out = vec![0u8; len];
    for (i, px) in out.chunks_exact_mut(4).enumerate() {
        let x = (i % physical.width as usize) as f64;
        let y = (i / physical.width as usize) as f64;
        let p = Point::new((x + 0.5) * sx, (y + 0.5) * sy);
        let c = LinearGradient::color_at(&stops, gradient_t(p, start, end));
        px.copy_from_slice(&c.to_rgba8_premul().to_array());
    }
    Ok(out)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn image_paint(pixmap: vello_cpu::Pixmap) -> vello_cpu::Image {
    vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    }
}

fn premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> LoveNotesResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| LoveNotesError::decode("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| LoveNotesError::decode("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(LoveNotesError::decode("image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let pixels: Vec<vello_cpu::peniko::color::PremulRgba8> = rgba8_premul
        .chunks_exact(4)
        .map(|px| {
            may_have_opacities |= px[3] != 255;
            vello_cpu::peniko::color::PremulRgba8 {
                r: px[0],
                g: px[1],
                b: px[2],
                a: px[3],
            }
        })
        .collect();

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
