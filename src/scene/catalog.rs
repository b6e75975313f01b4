//! Built-in stickers, backgrounds and templates.
//!
//! Asset paths are site-root references resolved by the configured [`crate::AssetLoader`].

use crate::foundation::core::Percent;
use crate::foundation::error::LoveNotesResult;
use crate::scene::background::Background;
use crate::scene::element::{Element, ElementId, ElementKind, Placement, TextAlign};

/// A sticker offered by the editor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StickerEntry {
    /// Catalog id.
    pub id: &'static str,
    /// Site-root image path.
    pub image: &'static str,
}

impl StickerEntry {
    /// Element kind placed when the sticker is picked.
    pub fn kind(&self) -> ElementKind {
        ElementKind::sticker(self.image)
    }
}

/// A background offered by the editor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BackgroundEntry {
    /// Catalog id.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Background expression.
    pub value: &'static str,
}

impl BackgroundEntry {
    /// Parsed background.
    pub fn background(&self) -> LoveNotesResult<Background> {
        Background::parse(self.value)
    }
}

macro_rules! stickers {
    ($($id:literal),* $(,)?) => {
        &[$(StickerEntry { id: $id, image: concat!("/stickers/", $id, ".png") }),*]
    };
}

const STICKERS: &[StickerEntry] = stickers![
    "best-friends",
    "disco-ball",
    "dove",
    "favorite-person",
    "film-strip",
    "heart-wax-stamp",
    "love-you-heart",
    "love-you-more",
    "love-you",
    "nikon-cam",
    "red-clip",
    "red-photo-strip",
    "swans",
    "te-amo",
    "vinyl",
];

macro_rules! backgrounds {
    ($(($id:literal, $file:literal, $name:literal)),* $(,)?) => {
        &[$(BackgroundEntry {
            id: $id,
            name: $name,
            value: concat!("url(/backgrounds/", $file, ")"),
        }),*]
    };
}

const BACKGROUNDS: &[BackgroundEntry] = backgrounds![
    ("stripe1", "1-stripe.jpg", "Stripe 1"),
    ("stripe2", "2-stripe.jpg", "Stripe 2"),
    ("stripe3", "3-stripe.jpg", "Stripe 3"),
    ("stripe4", "4-stripe.jpg", "Stripe 4"),
    ("blue-gingham", "blue-gingham.jpg", "Blue Gingham"),
    ("love-everywhere", "love-is-everywhere.jpg", "Love Is Everywhere"),
    ("maroon-paper", "maroon-paper.jpg", "Maroon Paper"),
    ("mocha-mousse", "mocha-mousse.jpg", "Mocha Mousse"),
    ("pink-lined", "pink-lined.jpg", "Pink Lined"),
    ("pink-paper", "pink-paper.jpg", "Pink Paper"),
    ("pink-swirl", "pink-swirl.jpg", "Pink Swirl"),
    ("red-gingham", "red-gingham.jpg", "Red Gingham"),
    ("white-paper", "white-paper.jpg", "White Paper"),
];

/// Every built-in sticker, in menu order.
pub fn stickers() -> &'static [StickerEntry] {
    STICKERS
}

/// Sticker by catalog id.
pub fn sticker(id: &str) -> Option<&'static StickerEntry> {
    STICKERS.iter().find(|s| s.id == id)
}

/// Every built-in background, in menu order.
pub fn backgrounds() -> &'static [BackgroundEntry] {
    BACKGROUNDS
}

/// Background by catalog id.
pub fn background(id: &str) -> Option<&'static BackgroundEntry> {
    BACKGROUNDS.iter().find(|b| b.id == id)
}

/// A ready-made card layout. Element ids are placeholders and are replaced on apply.
#[derive(Clone, Debug, PartialEq)]
pub struct Template {
    /// Catalog id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Background set on apply.
    pub background: Background,
    /// Elements placed on apply.
    pub elements: Vec<Element>,
}

fn item(n: usize, kind: ElementKind, x: f64, y: f64, size: f64, rotation: f64) -> Element {
    Element {
        id: ElementId::new(format!("template-{n}")),
        kind,
        position: Percent::new(x, y),
        size,
        rotation,
        layer: n as i64,
    }
}

fn styled_text(content: &str, color: &str, font: &str) -> ElementKind {
    let mut kind = ElementKind::text(content);
    if let ElementKind::Text(style) = &mut kind {
        style.color = color.to_string();
        style.font_family = font.to_string();
        style.text_align = TextAlign::Center;
    }
    kind
}

/// Built-in templates.
pub fn templates() -> Vec<Template> {
    vec![
        Template {
            id: "classic-valentine".to_string(),
            name: "Classic Valentine".to_string(),
            background: Background::image("/backgrounds/pink-paper.jpg"),
            elements: vec![
                item(
                    1,
                    styled_text("Be My Valentine", "#b14949", "'Playfair Display', serif"),
                    50.0,
                    25.0,
                    40.0,
                    0.0,
                ),
                item(2, STICKERS[6].kind(), 50.0, 55.0, 150.0, 0.0),
                item(
                    3,
                    styled_text("Love,\nMe", "#7a2e2e", "'Dancing Script', cursive"),
                    50.0,
                    85.0,
                    28.0,
                    0.0,
                ),
            ],
        },
        Template {
            id: "retro-love".to_string(),
            name: "Retro Love".to_string(),
            background: Background::image("/backgrounds/red-gingham.jpg"),
            elements: vec![
                item(1, STICKERS[14].kind(), 30.0, 30.0, 160.0, -12.0),
                item(2, STICKERS[12].kind(), 72.0, 68.0, 120.0, 8.0),
                item(
                    3,
                    styled_text("You & Me", "#ffffff", "'Pacifico', cursive"),
                    50.0,
                    88.0,
                    Placement::TEXT.size + 12.0,
                    -4.0,
                ),
            ],
        },
    ]
}
