use serde::{Deserialize, Serialize};

use crate::assets::source::AssetRef;
use crate::foundation::core::{Percent, clamp_layer, clamp_percent, clamp_rotation, clamp_size};
use crate::foundation::error::{LoveNotesError, LoveNotesResult};

/// Default font stack for new text elements.
pub const DEFAULT_FONT_FAMILY: &str = "'Playfair Display', serif";
/// Default text fill.
pub const DEFAULT_TEXT_COLOR: &str = "#000000";
/// Placeholder content for new text elements.
pub const DEFAULT_TEXT: &str = "Your text here";

/// Opaque element identifier, unique for the lifetime of a scene.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    /// Wrap an existing identifier.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Horizontal anchoring of text lines relative to the element origin.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Lines start at the origin.
    Left,
    /// Lines are centered on the origin.
    #[default]
    Center,
    /// Lines end at the origin.
    Right,
}

/// Text payload and style.
#[derive(Clone, Debug, PartialEq)]
pub struct TextStyle {
    /// Literal text; `\n` separates lines.
    pub content: String,
    /// CSS color expression.
    pub color: String,
    /// CSS `font-family` list.
    pub font_family: String,
    /// Line anchoring.
    pub text_align: TextAlign,
}

impl TextStyle {
    /// Text with the editor's default style.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            color: DEFAULT_TEXT_COLOR.to_string(),
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            text_align: TextAlign::Center,
        }
    }
}

/// What a decal shows.
#[derive(Clone, Debug, PartialEq)]
pub enum DecalSource {
    /// Raster or SVG sticker.
    Image(AssetRef),
    /// Symbolic glyph such as an emoji, drawn like centered text.
    Glyph(String),
}

/// Kind-specific element payload.
#[derive(Clone, Debug, PartialEq)]
pub enum ElementKind {
    /// Styled, possibly multi-line text.
    Text(TextStyle),
    /// User photo.
    Image {
        /// Image payload reference.
        source: AssetRef,
    },
    /// Sticker-type decoration.
    Decal(DecalSource),
}

impl ElementKind {
    /// Text kind with default style.
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(TextStyle::new(content))
    }

    /// Photo kind.
    pub fn image(source: impl Into<AssetRef>) -> Self {
        Self::Image {
            source: source.into(),
        }
    }

    /// Image sticker kind.
    pub fn sticker(source: impl Into<AssetRef>) -> Self {
        Self::Decal(DecalSource::Image(source.into()))
    }

    /// Glyph sticker kind.
    pub fn glyph(glyph: impl Into<String>) -> Self {
        Self::Decal(DecalSource::Glyph(glyph.into()))
    }

    /// Record tag used in persisted cards.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Image { .. } => "image",
            Self::Decal(DecalSource::Glyph(_)) => "emoji",
            Self::Decal(DecalSource::Image(_)) => "decal",
        }
    }

    /// Asset the rasterizer must resolve before drawing, if any.
    pub fn asset(&self) -> Option<&AssetRef> {
        match self {
            Self::Image { source } | Self::Decal(DecalSource::Image(source)) => Some(source),
            Self::Text(_) | Self::Decal(DecalSource::Glyph(_)) => None,
        }
    }

    fn content(&self) -> &str {
        match self {
            Self::Text(t) => &t.content,
            Self::Image { source } | Self::Decal(DecalSource::Image(source)) => source.as_str(),
            Self::Decal(DecalSource::Glyph(g)) => g,
        }
    }

    fn set_content(&mut self, content: String) {
        match self {
            Self::Text(t) => t.content = content,
            Self::Image { source } | Self::Decal(DecalSource::Image(source)) => {
                *source = AssetRef::new(content)
            }
            Self::Decal(DecalSource::Glyph(g)) => *g = content,
        }
    }
}

/// Initial size and rotation for a new element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    /// Font size for text, bounding box edge for images and decals.
    pub size: f64,
    /// Degrees, clockwise positive.
    pub rotation: f64,
}

impl Placement {
    /// Text default.
    pub const TEXT: Self = Self {
        size: 32.0,
        rotation: 0.0,
    };
    /// Sticker default.
    pub const STICKER: Self = Self {
        size: 64.0,
        rotation: 0.0,
    };
    /// Photo default.
    pub const PHOTO: Self = Self {
        size: 150.0,
        rotation: 0.0,
    };

    /// The default placement for a kind.
    pub fn for_kind(kind: &ElementKind) -> Self {
        match kind {
            ElementKind::Text(_) => Self::TEXT,
            ElementKind::Image { .. } => Self::PHOTO,
            ElementKind::Decal(_) => Self::STICKER,
        }
    }
}

/// One placed item on the card.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ElementRecord", into = "ElementRecord")]
pub struct Element {
    /// Stable identifier.
    pub id: ElementId,
    /// Kind and payload.
    pub kind: ElementKind,
    /// Anchor, in canvas percentages.
    pub position: Percent,
    /// Scale control, see [`Placement::size`].
    pub size: f64,
    /// Degrees around the element center.
    pub rotation: f64,
    /// Paint order key, ascending.
    pub layer: i64,
}

impl Element {
    /// Merge a patch. Returns whether anything changed.
    ///
    /// Coordinates, size and rotation are clamped into their ranges; non-finite values and
    /// text-only attributes on other kinds are ignored.
    pub fn apply(&mut self, patch: &ElementPatch) -> bool {
        let before = self.clone();

        let finite = |v: Option<f64>| v.filter(|v| v.is_finite());
        if let Some(x) = finite(patch.x) {
            self.position.x = clamp_percent(x);
        }
        if let Some(y) = finite(patch.y) {
            self.position.y = clamp_percent(y);
        }
        if let Some(size) = finite(patch.size) {
            self.size = clamp_size(size);
        }
        if let Some(rotation) = finite(patch.rotation) {
            self.rotation = clamp_rotation(rotation);
        }
        if let Some(layer) = patch.layer {
            self.layer = clamp_layer(layer);
        }
        if let Some(content) = &patch.content {
            self.kind.set_content(content.clone());
        }

        match &mut self.kind {
            ElementKind::Text(t) => {
                if let Some(color) = &patch.color {
                    t.color = color.clone();
                }
                if let Some(font) = &patch.font_family {
                    t.font_family = font.clone();
                }
                if let Some(align) = patch.text_align {
                    t.text_align = align;
                }
            }
            _ => {
                if patch.has_text_style() {
                    tracing::debug!(id = %self.id, "ignoring text style on non-text element");
                }
            }
        }

        *self != before
    }

    /// Force every numeric attribute into its editor range.
    pub(crate) fn sanitize(&mut self) {
        let or = |v: f64, d: f64| if v.is_finite() { v } else { d };
        self.position = Percent::new(or(self.position.x, 50.0), or(self.position.y, 50.0));
        self.size = clamp_size(or(self.size, Placement::for_kind(&self.kind).size));
        self.rotation = clamp_rotation(or(self.rotation, 0.0));
        self.layer = clamp_layer(self.layer);
    }
}

/// Partial attribute update; `None` leaves a field untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ElementPatch {
    /// Text content, or a new asset reference / glyph for other kinds.
    pub content: Option<String>,
    /// Horizontal position in percent.
    pub x: Option<f64>,
    /// Vertical position in percent.
    pub y: Option<f64>,
    /// Element size.
    pub size: Option<f64>,
    /// Rotation in degrees.
    pub rotation: Option<f64>,
    /// Paint order key.
    pub layer: Option<i64>,
    /// Text color.
    pub color: Option<String>,
    /// Text font family list.
    pub font_family: Option<String>,
    /// Text alignment.
    pub text_align: Option<TextAlign>,
}

impl ElementPatch {
    /// Patch that moves the element.
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    /// Patch that resizes the element.
    pub fn size(size: f64) -> Self {
        Self {
            size: Some(size),
            ..Self::default()
        }
    }

    /// Patch that rotates the element.
    pub fn rotation(deg: f64) -> Self {
        Self {
            rotation: Some(deg),
            ..Self::default()
        }
    }

    /// Patch that replaces the content.
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    fn has_text_style(&self) -> bool {
        self.color.is_some() || self.font_family.is_some() || self.text_align.is_some()
    }
}

/// Persisted element shape, shared with records written by older editor builds.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ElementRecord {
    #[serde(default)]
    id: String,
    #[serde(rename = "type")]
    kind: String,
    content: String,
    x: f64,
    y: f64,
    size: f64,
    #[serde(default)]
    rotation: f64,
    #[serde(default)]
    layer: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    color: Option<String>,
    #[serde(default, alias = "font", skip_serializing_if = "Option::is_none")]
    font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text_align: Option<TextAlign>,
}

impl TryFrom<ElementRecord> for Element {
    type Error = LoveNotesError;

    fn try_from(r: ElementRecord) -> LoveNotesResult<Self> {
        let kind = match r.kind.as_str() {
            "text" => ElementKind::Text(TextStyle {
                content: r.content,
                color: r.color.unwrap_or_else(|| DEFAULT_TEXT_COLOR.to_string()),
                font_family: r
                    .font_family
                    .unwrap_or_else(|| DEFAULT_FONT_FAMILY.to_string()),
                text_align: r.text_align.unwrap_or_default(),
            }),
            "image" | "photo" => ElementKind::image(r.content),
            "decal" | "sticker" => ElementKind::sticker(r.content),
            "emoji" | "glyph" => ElementKind::glyph(r.content),
            other => {
                return Err(LoveNotesError::validation(format!(
                    "unknown element type \"{other}\""
                )));
            }
        };
        Ok(Self {
            id: ElementId(r.id),
            kind,
            position: Percent { x: r.x, y: r.y },
            size: r.size,
            rotation: r.rotation,
            layer: r.layer,
        })
    }
}

impl From<Element> for ElementRecord {
    fn from(e: Element) -> Self {
        let kind = e.kind.type_name().to_string();
        let content = e.kind.content().to_string();
        let (color, font_family, text_align) = match e.kind {
            ElementKind::Text(t) => (Some(t.color), Some(t.font_family), Some(t.text_align)),
            _ => (None, None, None),
        };
        Self {
            id: e.id.0,
            kind,
            content,
            x: e.position.x,
            y: e.position.y,
            size: e.size,
            rotation: e.rotation,
            layer: e.layer,
            color,
            font_family,
            text_align,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/element.rs"]
mod tests;
