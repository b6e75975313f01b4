use std::io::Cursor;

use super::*;
use crate::assets::loader::MemoryAssetLoader;
use crate::scene::background::Background;
use crate::scene::element::ElementKind;
use crate::scene::model::SceneModel;

fn png(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([10, 20, 30, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn card_with(assets: &[&str], background: Option<&str>) -> Card {
    let mut m = SceneModel::new();
    for a in assets {
        m.add_default(ElementKind::sticker(*a));
    }
    if let Some(bg) = background {
        m.set_background(Background::image(bg));
    }
    m.to_card()
}

#[test]
fn resolves_background_and_elements_once() {
    let loader = MemoryAssetLoader::new()
        .with("/stickers/dove.png", png(4, 2))
        .with("/backgrounds/white-paper.jpg", png(3, 3));
    let card = card_with(
        &["/stickers/dove.png", "/stickers/dove.png"],
        Some("/backgrounds/white-paper.jpg"),
    );
    let resolved = pollster::block_on(resolve_assets(&card, &loader)).unwrap();
    assert_eq!(resolved.len(), 2);
    assert_eq!(
        resolved
            .get(&AssetRef::from("/stickers/dove.png"))
            .unwrap()
            .intrinsic_size(),
        (4.0, 2.0)
    );
}

#[test]
fn text_only_card_needs_nothing() {
    let mut m = SceneModel::new();
    m.add_default(ElementKind::text("hello"));
    let resolved =
        pollster::block_on(resolve_assets(&m.to_card(), &MemoryAssetLoader::new())).unwrap();
    assert!(resolved.is_empty());
    assert!(resolved.get(&AssetRef::from("/nope.png")).is_err());
}

#[test]
fn one_missing_asset_fails_the_set() {
    let loader = MemoryAssetLoader::new().with("/stickers/dove.png", png(1, 1));
    let card = card_with(&["/stickers/dove.png", "/stickers/missing.png"], None);
    let err = pollster::block_on(resolve_assets(&card, &loader)).unwrap_err();
    assert!(matches!(err, LoveNotesError::Asset(_)));
}

#[test]
fn undecodable_asset_is_named_in_the_error() {
    let loader = MemoryAssetLoader::new().with("/stickers/broken.png", b"nope".to_vec());
    let card = card_with(&["/stickers/broken.png"], None);
    let err = pollster::block_on(resolve_assets(&card, &loader)).unwrap_err();
    let LoveNotesError::Decode(msg) = err else {
        panic!("expected decode error, got {err:?}");
    };
    assert!(msg.contains("/stickers/broken.png"), "{msg}");
}
