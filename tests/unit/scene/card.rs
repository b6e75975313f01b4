use serde_json::json;

use super::*;
use crate::scene::element::ElementKind;

#[test]
fn card_id_validation() {
    assert!(CardId::parse("card-1700000000000").is_ok());
    assert!(CardId::parse("abc_DEF-123").is_ok());
    assert!(CardId::parse("").is_err());
    assert!(CardId::parse("../etc/passwd").is_err());
    assert!(CardId::parse("a b").is_err());
    assert!(CardId::parse("x".repeat(129)).is_err());
}

#[test]
fn generated_ids_are_valid_and_distinct() {
    let a = CardId::generate();
    let b = CardId::generate();
    assert_ne!(a, b);
    assert!(a.as_str().starts_with("card-"));
    assert_eq!(CardId::parse(a.as_str()).unwrap(), a);
}

#[test]
fn legacy_document_loads() {
    let doc = json!({
        "elements": [
            {"id": "element-1", "type": "text", "content": "Hi", "x": 50, "y": 20,
             "size": 32, "rotation": 0, "layer": 1, "color": "#b14949",
             "font": "'Dancing Script', cursive", "textAlign": "center"},
            {"id": "element-2", "type": "image", "content": "/stickers/dove.png",
             "x": 30, "y": 70, "size": 64, "rotation": 15, "layer": 2}
        ],
        "background": "url(/backgrounds/pink-paper.jpg)",
        "youtubeUrl": "https://youtu.be/dQw4w9WgXcQ"
    });
    let card: Card = serde_json::from_value(doc).unwrap();
    assert_eq!(card.elements.len(), 2);
    assert_eq!(card.audio_url(), Some("https://youtu.be/dQw4w9WgXcQ"));
    assert_eq!(
        card.referenced_assets(),
        vec![
            AssetRef::from("/backgrounds/pink-paper.jpg"),
            AssetRef::from("/stickers/dove.png")
        ]
    );

    let v = serde_json::to_value(&card).unwrap();
    assert_eq!(v["audioUrl"], "https://youtu.be/dQw4w9WgXcQ");
    assert!(v.get("youtubeUrl").is_none());
}

#[test]
fn missing_fields_take_defaults() {
    let card = Card::from_json_str("{}").unwrap();
    assert!(card.elements.is_empty());
    assert_eq!(card.background, Background::default());
    assert_eq!(card.audio_url(), None);

    let blank = Card::from_json_str(r#"{"audioUrl": "  "}"#).unwrap();
    assert_eq!(blank.audio_url(), None);
}

#[test]
fn referenced_assets_are_deduplicated() {
    let mk = |id: &str, kind: ElementKind| Element {
        id: id.into(),
        kind,
        position: crate::foundation::core::Percent::CENTER,
        size: 64.0,
        rotation: 0.0,
        layer: 1,
    };
    let card = Card {
        elements: vec![
            mk("a", ElementKind::sticker("/stickers/swans.png")),
            mk("b", ElementKind::text("x")),
            mk("c", ElementKind::image("/stickers/swans.png")),
            mk("d", ElementKind::glyph("*")),
        ],
        ..Card::default()
    };
    assert_eq!(
        card.referenced_assets(),
        vec![AssetRef::from("/stickers/swans.png")]
    );
}

#[test]
fn bad_background_fails_the_document() {
    let err = Card::from_json_str(r#"{"background": "not-a-color"}"#).unwrap_err();
    assert!(matches!(err, LoveNotesError::Serde(_)));
}
