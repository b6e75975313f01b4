use std::io::Cursor;

use super::*;
use crate::assets::decode::decode_asset;
use crate::foundation::core::Percent;
use crate::scene::element::ElementId;

const RED: [u8; 4] = [255, 0, 0, 255];
const GREEN: [u8; 4] = [0, 255, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];
const WHITE: [u8; 4] = [255, 255, 255, 255];

fn png_solid(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
    encode(image::RgbaImage::from_pixel(w, h, image::Rgba(px)))
}

fn encode(img: image::RgbaImage) -> Vec<u8> {
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn image_el(id: &str, src: &str, size: f64, rotation: f64, layer: i64) -> Element {
    Element {
        id: ElementId::new(id),
        kind: ElementKind::image(src),
        position: Percent::CENTER,
        size,
        rotation,
        layer,
    }
}

fn resolved(entries: &[(&str, Vec<u8>)]) -> ResolvedAssets {
    let mut out = ResolvedAssets::new();
    for (name, bytes) in entries {
        out.insert(AssetRef::from(*name), decode_asset(bytes).unwrap());
    }
    out
}

fn render(card: &Card, w: u32, h: u32, ss: u32, assets: &ResolvedAssets) -> FrameRGBA {
    CpuRasterizer::new()
        .render(
            card,
            LogicalSize::new(w, h).unwrap(),
            ss,
            assets,
            &FontBook::new(),
        )
        .unwrap()
}

#[test]
fn solid_background_fills_supersampled_surface() {
    let card = Card {
        background: Background::parse("#ff0000").unwrap(),
        ..Card::default()
    };
    let frame = render(&card, 10, 8, 2, &ResolvedAssets::new());
    assert_eq!((frame.width, frame.height), (20, 16));
    assert_eq!(frame.data.len(), 20 * 16 * 4);
    assert!(frame.premultiplied);
    assert_eq!(frame.pixel(0, 0), Some(RED));
    assert_eq!(frame.pixel(19, 15), Some(RED));
    assert_eq!(frame.pixel(20, 0), None);
}

#[test]
fn layers_paint_in_ascending_order() {
    let assets = resolved(&[
        ("/r.png", png_solid(2, 2, RED)),
        ("/g.png", png_solid(2, 2, GREEN)),
        ("/b.png", png_solid(2, 2, BLUE)),
    ]);
    let card = Card {
        elements: vec![
            image_el("a", "/r.png", 10.0, 0.0, 3),
            image_el("b", "/g.png", 10.0, 0.0, 1),
            image_el("c", "/b.png", 10.0, 0.0, 2),
        ],
        ..Card::default()
    };
    let frame = render(&card, 20, 20, 1, &assets);
    assert_eq!(frame.pixel(10, 10), Some(RED));

    let reordered = Card {
        elements: vec![card.elements[1].clone(), card.elements[2].clone(), card.elements[0].clone()],
        ..Card::default()
    };
    assert_eq!(render(&reordered, 20, 20, 1, &assets), frame);
}

#[test]
fn equal_layers_keep_insertion_order() {
    let assets = resolved(&[
        ("/r.png", png_solid(2, 2, RED)),
        ("/g.png", png_solid(2, 2, GREEN)),
    ]);
    let card = Card {
        elements: vec![
            image_el("a", "/r.png", 10.0, 0.0, 1),
            image_el("b", "/g.png", 10.0, 0.0, 1),
        ],
        ..Card::default()
    };
    assert_eq!(render(&card, 20, 20, 1, &assets).pixel(10, 10), Some(GREEN));
}

#[test]
fn rendering_is_deterministic() {
    let assets = resolved(&[("/r.png", png_solid(3, 2, RED))]);
    let card = Card {
        elements: vec![image_el("a", "/r.png", 12.0, 33.0, 1)],
        background: Background::parse("linear-gradient(45deg, #ffc0cb, #800080)").unwrap(),
        audio_url: None,
    };
    let mut r = CpuRasterizer::new();
    let fonts = FontBook::new();
    let size = LogicalSize::new(30, 40).unwrap();
    let a = r.render(&card, size, 2, &assets, &fonts).unwrap();
    let b = r.render(&card, size, 2, &assets, &fonts).unwrap();
    let c = CpuRasterizer::new().render(&card, size, 2, &assets, &fonts).unwrap();
    assert_eq!(a, b);
    assert_eq!(a, c);
}

#[test]
fn images_fit_inside_their_size_box() {
    let assets = resolved(&[("/wide.png", png_solid(4, 2, BLUE))]);
    let card = Card {
        elements: vec![image_el("a", "/wide.png", 10.0, 0.0, 1)],
        ..Card::default()
    };
    // 10 wide and 5 tall, centered on (10, 10): x in 5..15, y in 7.5..12.5.
    let frame = render(&card, 20, 20, 1, &assets);
    assert_eq!(frame.pixel(10, 10), Some(BLUE));
    assert_eq!(frame.pixel(6, 10), Some(BLUE));
    assert_eq!(frame.pixel(10, 5), Some(WHITE));
    assert_eq!(frame.pixel(3, 10), Some(WHITE));
}

#[test]
fn rotation_turns_about_the_element_center() {
    let assets = resolved(&[("/wide.png", png_solid(4, 2, BLUE))]);
    let card = Card {
        elements: vec![image_el("a", "/wide.png", 10.0, 90.0, 1)],
        ..Card::default()
    };
    // After a quarter turn the box is 5 wide and 10 tall.
    let frame = render(&card, 20, 20, 1, &assets);
    assert_eq!(frame.pixel(10, 6), Some(BLUE));
    assert_eq!(frame.pixel(6, 10), Some(WHITE));
}

#[test]
fn background_images_stretch_to_the_canvas() {
    let mut img = image::RgbaImage::from_pixel(2, 1, image::Rgba(RED));
    img.put_pixel(1, 0, image::Rgba(BLUE));
    let assets = resolved(&[("/backgrounds/split.png", encode(img))]);
    let card = Card {
        background: Background::image("/backgrounds/split.png"),
        ..Card::default()
    };
    let frame = render(&card, 20, 20, 1, &assets);
    assert_eq!(frame.pixel(1, 0), Some(RED));
    assert_eq!(frame.pixel(1, 19), Some(RED));
    assert_eq!(frame.pixel(18, 10), Some(BLUE));
}

#[test]
fn unresolved_asset_is_an_error() {
    let card = Card {
        elements: vec![image_el("a", "/missing.png", 10.0, 0.0, 1)],
        ..Card::default()
    };
    let err = CpuRasterizer::new()
        .render(
            &card,
            LogicalSize::new(10, 10).unwrap(),
            1,
            &ResolvedAssets::new(),
            &FontBook::new(),
        )
        .unwrap_err();
    assert!(matches!(err, LoveNotesError::Asset(_)));
}

#[test]
fn zero_supersample_is_rejected() {
    let err = CpuRasterizer::new()
        .render(
            &Card::default(),
            LogicalSize::new(10, 10).unwrap(),
            0,
            &ResolvedAssets::new(),
            &FontBook::new(),
        )
        .unwrap_err();
    assert!(matches!(err, LoveNotesError::Validation(_)));
}

#[test]
fn text_without_fonts_is_skipped() {
    let card = Card {
        elements: vec![
            Element {
                id: ElementId::new("t"),
                kind: ElementKind::text("Hello\nthere"),
                position: Percent::CENTER,
                size: 32.0,
                rotation: 0.0,
                layer: 1,
            },
            Element {
                id: ElementId::new("g"),
                kind: ElementKind::glyph("\u{2764}"),
                position: Percent::CENTER,
                size: 64.0,
                rotation: 0.0,
                layer: 2,
            },
        ],
        ..Card::default()
    };
    let frame = render(&card, 10, 10, 1, &ResolvedAssets::new());
    assert!(frame.data.chunks_exact(4).all(|px| px == WHITE));
}

#[test]
fn gradient_runs_along_its_direction() {
    let Background::LinearGradient(g) =
        Background::parse("linear-gradient(to right, #000000, #ffffff)").unwrap()
    else {
        panic!("expected gradient");
    };
    let size = LogicalSize::new(10, 2).unwrap();
    let bytes = gradient_premul_rgba8(&g, size, size).unwrap();
    let row: Vec<u8> = bytes.chunks_exact(4).take(10).map(|px| px[0]).collect();
    assert!(row.windows(2).all(|w| w[0] < w[1]), "{row:?}");
    // Rows are identical for a horizontal gradient.
    assert_eq!(&bytes[0..40], &bytes[40..80]);
    assert!(bytes.chunks_exact(4).all(|px| px[3] == 255));
}

const FONT_FIXTURE: &str = "tests/data/fonts/DejaVuSans.ttf";

fn fixture_fonts() -> FontBook {
    let mut fonts = FontBook::new();
    fonts.load_font_data(std::fs::read(FONT_FIXTURE).unwrap());
    fonts
}

fn text_el(content: &str, align: TextAlign, rotation: f64) -> Element {
    let mut kind = ElementKind::text(content);
    if let ElementKind::Text(style) = &mut kind {
        style.text_align = align;
    }
    Element {
        id: ElementId::new("t"),
        kind,
        position: Percent::CENTER,
        size: 40.0,
        rotation,
        layer: 1,
    }
}

/// Inclusive bounds `(x0, y0, x1, y1)` of dark pixels.
fn ink_box(frame: &FrameRGBA) -> Option<(u32, u32, u32, u32)> {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for y in 0..frame.height {
        for x in 0..frame.width {
            let px = frame.pixel(x, y).unwrap();
            if px[0] < 128 && px[3] > 0 {
                bounds = Some(match bounds {
                    None => (x, y, x, y),
                    Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
                });
            }
        }
    }
    bounds
}

fn render_text(el: Element) -> (u32, u32, u32, u32) {
    let card = Card {
        elements: vec![el],
        ..Card::default()
    };
    let frame = CpuRasterizer::new()
        .render(
            &card,
            LogicalSize::new(400, 400).unwrap(),
            1,
            &ResolvedAssets::new(),
            &fixture_fonts(),
        )
        .unwrap();
    ink_box(&frame).expect("text should leave ink")
}

#[test]
fn centered_text_straddles_the_anchor() {
    let (x0, y0, x1, y1) = render_text(text_el("HHHH", TextAlign::Center, 0.0));
    assert!(x1 - x0 > 80, "{x0}..{x1}");
    assert!((i64::from(x0 + x1) / 2 - 200).abs() <= 4, "{x0}..{x1}");
    assert!((i64::from(y0 + y1) / 2 - 200).abs() <= 6, "{y0}..{y1}");
}

#[test]
fn left_and_right_alignment_anchor_line_edges() {
    let (lx0, _, lx1, _) = render_text(text_el("HHHH", TextAlign::Left, 0.0));
    assert!((198..=210).contains(&lx0), "{lx0}");
    assert!(lx1 > 280, "{lx1}");

    let (rx0, _, rx1, _) = render_text(text_el("HHHH", TextAlign::Right, 0.0));
    assert!((190..=202).contains(&rx1), "{rx1}");
    assert!(rx0 < 120, "{rx0}");
}

#[test]
fn two_lines_stack_around_the_anchor() {
    let (_, y0, _, y1) = render_text(text_el("HHHH", TextAlign::Center, 0.0));
    let (_, sy0, _, sy1) = render_text(text_el("HHHH\nHHHH", TextAlign::Center, 0.0));
    // line pitch is 1.2 x size = 48 px, split evenly above and below the anchor
    let single = y1 - y0;
    assert!(((sy1 - sy0) as i64 - (single as i64 + 48)).abs() <= 2, "{sy0}..{sy1}");
    assert!((i64::from(sy0 + sy1) / 2 - i64::from(y0 + y1) / 2).abs() <= 1);
}

#[test]
fn rotated_text_turns_around_its_anchor() {
    let (x0, y0, x1, y1) = render_text(text_el("HHHH", TextAlign::Center, 0.0));
    assert!(x1 - x0 > 2 * (y1 - y0));

    let (rx0, ry0, rx1, ry1) = render_text(text_el("HHHH", TextAlign::Center, 90.0));
    assert!(ry1 - ry0 > 2 * (rx1 - rx0), "{rx0},{ry0}..{rx1},{ry1}");
    assert!((i64::from(ry0 + ry1) / 2 - 200).abs() <= 4);
    assert!(((ry1 - ry0) as i64 - (x1 - x0) as i64).abs() <= 2);
}

#[test]
fn glyph_decals_render_centered_in_black() {
    let el = Element {
        id: ElementId::new("g"),
        kind: ElementKind::glyph("\u{2665}"),
        position: Percent::CENTER,
        size: 64.0,
        rotation: 0.0,
        layer: 1,
    };
    let (x0, y0, x1, y1) = render_text(el);
    assert!(x1 - x0 > 20 && y1 - y0 > 20, "{x0},{y0}..{x1},{y1}");
    assert!((i64::from(x0 + x1) / 2 - 200).abs() <= 4);
    assert!((i64::from(y0 + y1) / 2 - 200).abs() <= 12);
}
