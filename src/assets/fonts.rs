use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use usvg::fontdb;

use crate::foundation::error::{LoveNotesError, LoveNotesResult};

/// RGBA8 brush color used by Parley text layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

impl From<[u8; 4]> for TextBrushRgba8 {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self { r, g, b, a }
    }
}

/// A concrete font face picked for a CSS family list.
#[derive(Clone, Debug)]
pub struct ResolvedFont {
    /// Face identity inside the owning [`FontBook`].
    pub id: fontdb::ID,
    /// Primary family name of the face.
    pub family: String,
    /// Raw font file bytes.
    pub data: Arc<Vec<u8>>,
    /// Face index within a collection file.
    pub index: u32,
}

/// Registry of font faces available to text and glyph elements.
///
/// Family lists use CSS syntax (`'Playfair Display', serif`); the first family present wins, then
/// the generic fallbacks, then any face at all.
pub struct FontBook {
    db: fontdb::Database,
}

impl Default for FontBook {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook")
            .field("faces", &self.db.len())
            .finish()
    }
}

impl FontBook {
    /// Empty book.
    pub fn new() -> Self {
        Self {
            db: fontdb::Database::new(),
        }
    }

    /// Book preloaded with the platform's installed fonts.
    pub fn with_system_fonts() -> Self {
        let mut book = Self::new();
        book.db.load_system_fonts();
        tracing::debug!(faces = book.db.len(), "loaded system fonts");
        book
    }

    /// Load every `.ttf`, `.otf` and `.ttc` file directly inside `dir`.
    ///
    /// Unreadable entries are skipped. Returns the number of faces added.
    pub fn load_dir(&mut self, dir: &Path) -> usize {
        let before = self.db.len();
        let Ok(rd) = std::fs::read_dir(dir) else {
            return 0;
        };

        for entry in rd.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
                continue;
            };
            let ext = ext.to_ascii_lowercase();
            if ext != "ttf" && ext != "otf" && ext != "ttc" {
                continue;
            }
            if let Err(e) = self.db.load_font_file(&path) {
                tracing::warn!(path = %path.display(), error = %e, "skipping unreadable font");
            }
        }
        self.db.len() - before
    }

    /// Register a font from memory.
    pub fn load_font_data(&mut self, bytes: Vec<u8>) {
        self.db.load_font_data(bytes);
    }

    /// Number of registered faces.
    pub fn len(&self) -> usize {
        self.db.len()
    }

    /// Whether no face is registered.
    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }

    /// Pick a face for a CSS `font-family` list.
    pub fn resolve(&self, css_families: &str) -> Option<ResolvedFont> {
        let names = parse_family_list(css_families);
        let mut families: Vec<fontdb::Family<'_>> = names.iter().map(|n| to_family(n)).collect();
        families.push(fontdb::Family::SansSerif);
        families.push(fontdb::Family::Serif);

        let query = fontdb::Query {
            families: &families,
            weight: fontdb::Weight::NORMAL,
            stretch: fontdb::Stretch::Normal,
            style: fontdb::Style::Normal,
        };

        let id = match self.db.query(&query) {
            Some(id) => id,
            None => {
                let id = self.db.faces().next()?.id;
                tracing::warn!(families = css_families, "no matching font family, using first face");
                id
            }
        };
        self.face(id)
    }

    fn face(&self, id: fontdb::ID) -> Option<ResolvedFont> {
        let family = self
            .db
            .face(id)
            .and_then(|f| f.families.first().map(|(name, _)| name.clone()))
            .unwrap_or_default();
        let (data, index) = self
            .db
            .with_face_data(id, |data, index| (data.to_vec(), index))?;
        Some(ResolvedFont {
            id,
            family,
            data: Arc::new(data),
            index,
        })
    }
}

/// Split a CSS family list into unquoted names.
pub(crate) fn parse_family_list(css: &str) -> Vec<String> {
    css.split(',')
        .map(|part| {
            part.trim()
                .trim_matches(|c| c == '\'' || c == '"')
                .trim()
                .to_string()
        })
        .filter(|s| !s.is_empty())
        .collect()
}

fn to_family(name: &str) -> fontdb::Family<'_> {
    match name.to_ascii_lowercase().as_str() {
        "serif" => fontdb::Family::Serif,
        "sans-serif" | "system-ui" => fontdb::Family::SansSerif,
        "cursive" => fontdb::Family::Cursive,
        "fantasy" => fontdb::Family::Fantasy,
        "monospace" => fontdb::Family::Monospace,
        _ => fontdb::Family::Name(name),
    }
}

/// Stateful helper for building Parley text layouts from resolved faces.
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    registered: HashMap<fontdb::ID, String>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    pub(crate) fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            registered: HashMap::new(),
        }
    }

    fn family_name_for(&mut self, font: &ResolvedFont) -> LoveNotesResult<String> {
        if let Some(name) = self.registered.get(&font.id) {
            return Ok(name.clone());
        }
        let families = self.font_ctx.collection.register_fonts(
            parley::fontique::Blob::from(font.data.as_ref().clone()),
            None,
        );
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| LoveNotesError::decode("no font families registered from font bytes"))?;
        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| LoveNotesError::decode("registered font family has no name"))?
            .to_string();
        self.registered.insert(font.id, family_name.clone());
        Ok(family_name)
    }

    /// Shape and lay out a single line of text.
    pub(crate) fn layout_line(
        &mut self,
        text: &str,
        font: &ResolvedFont,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> LoveNotesResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(LoveNotesError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let family_name = self.family_name_for(font)?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        layout.align(
            None,
            parley::Alignment::Start,
            parley::AlignmentOptions::default(),
        );
        Ok(layout)
    }
}
