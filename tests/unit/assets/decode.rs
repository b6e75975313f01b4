use std::io::Cursor;

use super::*;

fn png_bytes(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(px));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

const SQUARE_SVG: &[u8] = br##"<svg xmlns="http://www.w3.org/2000/svg" width="20" height="10"><rect width="20" height="10" fill="#ff0000"/></svg>"##;

#[test]
fn decode_image_png_dimensions_and_premul() {
    let prepared = decode_image(&png_bytes(1, 1, [100, 50, 200, 128])).unwrap();
    assert_eq!(prepared.width, 1);
    assert_eq!(prepared.height, 1);
    assert_eq!(
        prepared.rgba8_premul.as_slice(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn decode_asset_sniffs_svg_and_raster() {
    let svg = decode_asset(SQUARE_SVG).unwrap();
    assert!(matches!(svg, PreparedAsset::Svg(_)));
    assert_eq!(svg.intrinsic_size(), (20.0, 10.0));

    let png = decode_asset(&png_bytes(4, 2, [0, 0, 0, 255])).unwrap();
    assert!(matches!(png, PreparedAsset::Raster(_)));
    assert_eq!(png.intrinsic_size(), (4.0, 2.0));
}

#[test]
fn decode_rejects_garbage() {
    let err = decode_asset(b"definitely not an image").unwrap_err();
    assert!(matches!(err, LoveNotesError::Decode(_)));
    assert!(parse_svg(b"<svg").is_err());
}

#[test]
fn svg_raster_params_follow_transform_scale() {
    let PreparedAsset::Svg(svg) = decode_asset(SQUARE_SVG).unwrap() else {
        panic!("expected svg");
    };
    let (w, h, adjust) = svg_raster_params(&svg.tree, Affine::scale(3.0)).unwrap();
    assert_eq!((w, h), (60, 30));
    let corner = adjust * crate::foundation::core::Point::new(60.0, 30.0);
    assert!((corner.x - 60.0).abs() < 1e-9);
    assert!((corner.y - 30.0).abs() < 1e-9);

    let rgba = rasterize_svg_to_premul_rgba8(&svg.tree, w, h).unwrap();
    assert_eq!(rgba.len(), 60 * 30 * 4);
    assert_eq!(&rgba[0..4], &[255, 0, 0, 255]);
}

#[test]
fn svg_raster_params_keep_fractional_extent() {
    let bytes = br##"<svg xmlns="http://www.w3.org/2000/svg" width="10.5" height="10"><rect width="10.5" height="10" fill="#00ff00"/></svg>"##;
    let PreparedAsset::Svg(svg) = decode_asset(bytes).unwrap() else {
        panic!("expected svg");
    };
    assert_eq!(PreparedAsset::Svg(svg.clone()).intrinsic_size(), (10.5, 10.0));

    let t = Affine::translate((100.0, 50.0)) * Affine::scale(1.0);
    let (w, h, adjust) = svg_raster_params(&svg.tree, t).unwrap();
    assert_eq!((w, h), (11, 10));

    // the pixmap's far corner lands on the tree's far corner, not on the rounded-up pixel grid
    let corner = adjust * crate::foundation::core::Point::new(f64::from(w), f64::from(h));
    let want = t * crate::foundation::core::Point::new(10.5, 10.0);
    assert!((corner.x - want.x).abs() < 1e-9, "{corner:?} vs {want:?}");
    assert!((corner.y - want.y).abs() < 1e-9);

    let (w2, _, _) = svg_raster_params(&svg.tree, Affine::scale(2.0)).unwrap();
    assert_eq!(w2, 21);
}
