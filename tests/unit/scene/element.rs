use serde_json::json;

use super::*;

fn text_element() -> Element {
    Element {
        id: ElementId::new("el-1"),
        kind: ElementKind::text("hello"),
        position: Percent::CENTER,
        size: 32.0,
        rotation: 0.0,
        layer: 1,
    }
}

#[test]
fn partial_patch_leaves_other_fields_alone() {
    let mut el = text_element();
    assert!(el.apply(&ElementPatch::rotation(30.0)));
    assert_eq!(el.rotation, 30.0);
    assert_eq!(el.position, Percent::CENTER);
    assert_eq!(el.size, 32.0);
    let ElementKind::Text(t) = &el.kind else {
        panic!("expected text");
    };
    assert_eq!(t.content, "hello");
    assert_eq!(t.font_family, DEFAULT_FONT_FAMILY);
}

#[test]
fn patch_clamps_ranges_and_ignores_non_finite() {
    let mut el = text_element();
    el.apply(&ElementPatch {
        x: Some(120.0),
        y: Some(f64::NAN),
        size: Some(4000.0),
        rotation: Some(-999.0),
        ..ElementPatch::default()
    });
    assert_eq!(el.position, Percent { x: 100.0, y: 50.0 });
    assert_eq!(el.size, 600.0);
    assert_eq!(el.rotation, -180.0);
}

#[test]
fn unchanged_patch_reports_no_change() {
    let mut el = text_element();
    assert!(!el.apply(&ElementPatch::position(50.0, 50.0)));
    assert!(!el.apply(&ElementPatch::default()));
}

#[test]
fn text_style_is_ignored_on_images() {
    let mut el = text_element();
    el.kind = ElementKind::image("/photo.png");
    let changed = el.apply(&ElementPatch {
        color: Some("#ff0000".to_string()),
        text_align: Some(TextAlign::Left),
        ..ElementPatch::default()
    });
    assert!(!changed);
    assert_eq!(el.kind, ElementKind::image("/photo.png"));
}

#[test]
fn content_patch_targets_kind_payload() {
    let mut el = text_element();
    el.kind = ElementKind::sticker("/stickers/dove.png");
    el.apply(&ElementPatch::content("/stickers/swans.png"));
    assert_eq!(el.kind.asset(), Some(&AssetRef::from("/stickers/swans.png")));

    el.kind = ElementKind::glyph("A");
    el.apply(&ElementPatch::content("B"));
    assert_eq!(el.kind, ElementKind::glyph("B"));
    assert!(el.kind.asset().is_none());
}

#[test]
fn record_round_trip_keeps_text_style() {
    let el = text_element();
    let v = serde_json::to_value(&el).unwrap();
    assert_eq!(v["type"], "text");
    assert_eq!(v["fontFamily"], DEFAULT_FONT_FAMILY);
    assert_eq!(v["textAlign"], "center");
    let back: Element = serde_json::from_value(v).unwrap();
    assert_eq!(back, el);
}

#[test]
fn legacy_record_shape_is_accepted() {
    let v = json!({
        "id": "element-1700000000000",
        "type": "text",
        "content": "Be mine\nforever",
        "x": 40, "y": 60, "size": 48, "rotation": -10, "layer": 3,
        "color": "#b14949",
        "font": "'Pacifico', cursive",
        "textAlign": "right"
    });
    let el: Element = serde_json::from_value(v).unwrap();
    let ElementKind::Text(t) = &el.kind else {
        panic!("expected text");
    };
    assert_eq!(t.font_family, "'Pacifico', cursive");
    assert_eq!(t.text_align, TextAlign::Right);
    assert_eq!(el.layer, 3);

    let sticker: Element = serde_json::from_value(json!({
        "id": "element-2", "type": "image", "content": "/stickers/dove.png",
        "x": 50, "y": 50, "size": 64, "rotation": 0, "layer": 1
    }))
    .unwrap();
    assert_eq!(sticker.kind, ElementKind::image("/stickers/dove.png"));

    let emoji: Element = serde_json::from_value(json!({
        "id": "element-3", "type": "emoji", "content": "\u{2764}",
        "x": 50, "y": 50, "size": 64, "layer": 2
    }))
    .unwrap();
    assert_eq!(emoji.kind, ElementKind::glyph("\u{2764}"));
    assert_eq!(emoji.rotation, 0.0);
}

#[test]
fn unknown_record_type_is_rejected() {
    let r = serde_json::from_value::<Element>(json!({
        "id": "x", "type": "video", "content": "", "x": 0, "y": 0, "size": 10
    }));
    assert!(r.is_err());
}

#[test]
fn sanitize_forces_ranges() {
    let mut el = text_element();
    el.position = Percent { x: 105.0, y: -1.0 };
    el.size = 2.0;
    el.rotation = 400.0;
    el.sanitize();
    assert_eq!(el.position, Percent { x: 100.0, y: 0.0 });
    assert_eq!(el.size, 10.0);
    assert_eq!(el.rotation, 180.0);
}
