//! LoveNotes is a greeting-card composition engine.
//!
//! A card is a small scene of text, photos and stickers over a background. The crate provides:
//!
//! - an editable [`SceneModel`] with linear undo/redo ([`History`])
//! - deterministic, supersampled CPU rasterization to PNG ([`export_png`])
//! - card persistence with a legacy fallback ([`CardRepository`])
//! - share links and an [`EditorSession`] that ties the flows together
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod foundation;

pub(crate) mod audio;
pub(crate) mod config;
pub(crate) mod render;
pub(crate) mod scene;
pub(crate) mod session;
pub(crate) mod share;
pub(crate) mod store;

/// Built-in stickers, backgrounds and templates.
pub mod catalog {
    pub use crate::scene::catalog::{
        BackgroundEntry, StickerEntry, Template, background, backgrounds, sticker, stickers,
        templates,
    };
}

pub use crate::foundation::core::{
    Affine, LAYER_LIMIT, LogicalSize, Percent, Point, Rect, Rgba8Premul, Vec2, clamp_layer,
    clamp_percent, clamp_rotation, clamp_size,
};
pub use crate::foundation::error::{LoveNotesError, LoveNotesResult};

pub use crate::assets::color::ColorDef;
pub use crate::assets::fonts::{FontBook, ResolvedFont};
pub use crate::assets::loader::{AssetLoader, FsAssetLoader, MemoryAssetLoader};
pub use crate::assets::source::AssetRef;

pub use crate::scene::background::{Background, GradientDirection, LinearGradient};
pub use crate::scene::card::{Card, CardId};
pub use crate::scene::element::{
    DecalSource, Element, ElementId, ElementKind, ElementPatch, Placement, TextAlign, TextStyle,
};
pub use crate::scene::gesture::DragGesture;
pub use crate::scene::history::History;
pub use crate::scene::model::SceneModel;

pub use crate::render::FrameRGBA;
pub use crate::render::cpu::CpuRasterizer;
pub use crate::render::export::{
    EXPORT_FILE_NAME, ExportMode, ExportOpts, ExportedPng, encode_png, export_png,
};
pub use crate::render::resolve::{ResolvedAssets, resolve_assets};

pub use crate::store::card_store::{CardStore, FsCardStore, MemoryCardStore};
pub use crate::store::legacy::{FsLegacyStore, LegacyStore, MemoryLegacyStore, legacy_key};
pub use crate::store::repository::CardRepository;

pub use crate::audio::{VideoId, embed_url, extract_video_id};
pub use crate::config::StudioConfig;
pub use crate::session::editor::{EditorSession, Notice, NoticeLevel, SessionMode};
pub use crate::share::{EntryMode, share_url};
