use std::io::Cursor;
use std::path::{Path, PathBuf};

use crate::assets::fonts::FontBook;
use crate::assets::loader::AssetLoader;
use crate::foundation::core::{LogicalSize, unpremultiply_rgba8_in_place};
use crate::foundation::error::{LoveNotesError, LoveNotesResult};
use crate::render::FrameRGBA;
use crate::render::cpu::CpuRasterizer;
use crate::render::resolve::resolve_assets;
use crate::scene::card::Card;

/// Download name of exported cards.
pub const EXPORT_FILE_NAME: &str = "love-note.png";

/// Default pixel density multiplier.
pub const DEFAULT_SUPERSAMPLE: u32 = 2;

/// Which presentation the export matches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportMode {
    /// Editing canvas, 450 × 600 logical pixels.
    #[default]
    Editor,
    /// Shared read-only view, 600 × 800 logical pixels.
    View,
}

impl ExportMode {
    /// Logical canvas size for this mode.
    pub fn canvas(self) -> LogicalSize {
        match self {
            Self::Editor => LogicalSize {
                width: 450,
                height: 600,
            },
            Self::View => LogicalSize {
                width: 600,
                height: 800,
            },
        }
    }
}

/// Export options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExportOpts {
    /// Canvas size selector.
    pub mode: ExportMode,
    /// Pixel density multiplier, at least 1.
    pub supersample: u32,
}

impl Default for ExportOpts {
    fn default() -> Self {
        Self {
            mode: ExportMode::Editor,
            supersample: DEFAULT_SUPERSAMPLE,
        }
    }
}

/// An encoded export artifact.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportedPng {
    /// Suggested download name.
    pub file_name: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// PNG file bytes.
    pub bytes: Vec<u8>,
}

impl ExportedPng {
    /// Write into `dir` under [`ExportedPng::file_name`]; returns the written path.
    pub fn write_into(&self, dir: &Path) -> LoveNotesResult<PathBuf> {
        let path = dir.join(&self.file_name);
        self.write_to(&path)?;
        Ok(path)
    }

    /// Write to an explicit path, creating parent directories.
    pub fn write_to(&self, path: &Path) -> LoveNotesResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                LoveNotesError::encode(format!("create output dir '{}': {e}", parent.display()))
            })?;
        }
        std::fs::write(path, &self.bytes)
            .map_err(|e| LoveNotesError::encode(format!("write '{}': {e}", path.display())))
    }
}

/// Resolve every asset, rasterize the card and encode it as PNG.
///
/// Any asset failure aborts the export before drawing starts; no partial image is produced.
#[tracing::instrument(skip(card, loader, fonts), fields(mode = ?opts.mode, supersample = opts.supersample))]
pub async fn export_png(
    card: &Card,
    opts: ExportOpts,
    loader: &dyn AssetLoader,
    fonts: &FontBook,
) -> LoveNotesResult<ExportedPng> {
    let assets = resolve_assets(card, loader).await?;
    let frame = CpuRasterizer::new().render(
        card,
        opts.mode.canvas(),
        opts.supersample,
        &assets,
        fonts,
    )?;
    let bytes = encode_png(&frame)?;
    tracing::info!(
        width = frame.width,
        height = frame.height,
        bytes = bytes.len(),
        "card exported"
    );
    Ok(ExportedPng {
        file_name: EXPORT_FILE_NAME.to_string(),
        width: frame.width,
        height: frame.height,
        bytes,
    })
}

/// Encode a frame as a straight-alpha RGBA8 PNG.
pub fn encode_png(frame: &FrameRGBA) -> LoveNotesResult<Vec<u8>> {
    let mut data = frame.data.clone();
    if frame.premultiplied {
        unpremultiply_rgba8_in_place(&mut data);
    }
    let img = image::RgbaImage::from_raw(frame.width, frame.height, data)
        .ok_or_else(|| LoveNotesError::encode("frame byte length does not match its size"))?;

    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| LoveNotesError::encode(format!("png encode: {e}")))?;
    Ok(buf)
}
