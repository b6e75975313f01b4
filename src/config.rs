//! Studio configuration: where assets, fonts and cards live, and how exports are rendered.
//!
//! Values come from defaults, then an optional JSON file, then `LOVENOTES_*` environment
//! variables. The CLI applies its own flags last.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::assets::fonts::FontBook;
use crate::assets::loader::FsAssetLoader;
use crate::foundation::error::{LoveNotesError, LoveNotesResult};
use crate::render::export::{DEFAULT_SUPERSAMPLE, ExportMode, ExportOpts};
use crate::store::card_store::FsCardStore;
use crate::store::legacy::FsLegacyStore;
use crate::store::repository::CardRepository;

/// Environment variable overriding [`StudioConfig::assets_root`].
pub const ENV_ASSETS_DIR: &str = "LOVENOTES_ASSETS_DIR";
/// Environment variable overriding [`StudioConfig::store_dir`].
pub const ENV_STORE_DIR: &str = "LOVENOTES_STORE_DIR";
/// Environment variable overriding [`StudioConfig::legacy_file`].
pub const ENV_LEGACY_FILE: &str = "LOVENOTES_LEGACY_FILE";
/// Environment variable overriding [`StudioConfig::page_url`].
pub const ENV_PAGE_URL: &str = "LOVENOTES_PAGE_URL";
/// Environment variable overriding [`StudioConfig::supersample`].
pub const ENV_SUPERSAMPLE: &str = "LOVENOTES_SUPERSAMPLE";

/// Settings shared by the CLI and embedding applications.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct StudioConfig {
    /// Directory that site paths such as `/stickers/x.png` resolve against.
    pub assets_root: PathBuf,
    /// Extra directories scanned for font files.
    pub font_dirs: Vec<PathBuf>,
    /// Directory of the primary card store.
    pub store_dir: PathBuf,
    /// Exported legacy key/value storage, if any.
    pub legacy_file: Option<PathBuf>,
    /// Page location that share links are built on.
    pub page_url: String,
    /// Export pixel density multiplier.
    pub supersample: u32,
    /// Whether installed system fonts are loaded.
    pub load_system_fonts: bool,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            assets_root: PathBuf::from("."),
            font_dirs: Vec::new(),
            store_dir: PathBuf::from("lovenotes-cards"),
            legacy_file: None,
            page_url: "http://localhost:5173/".to_string(),
            supersample: DEFAULT_SUPERSAMPLE,
            load_system_fonts: true,
        }
    }
}

impl StudioConfig {
    /// Read a JSON config file. Missing fields keep their defaults.
    pub fn from_json_file(path: &Path) -> LoveNotesResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            LoveNotesError::validation(format!("read config '{}': {e}", path.display()))
        })?;
        let cfg: Self = serde_json::from_slice(&bytes)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Apply `LOVENOTES_*` overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// Empty values are ignored. An unparsable supersample factor is logged and ignored.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(v) = var(ENV_ASSETS_DIR) {
            self.assets_root = PathBuf::from(v);
        }
        if let Some(v) = var(ENV_STORE_DIR) {
            self.store_dir = PathBuf::from(v);
        }
        if let Some(v) = var(ENV_LEGACY_FILE) {
            self.legacy_file = Some(PathBuf::from(v));
        }
        if let Some(v) = var(ENV_PAGE_URL) {
            self.page_url = v;
        }
        if let Some(v) = var(ENV_SUPERSAMPLE) {
            match v.trim().parse::<u32>() {
                Ok(n) if n > 0 => self.supersample = n,
                _ => tracing::warn!(value = %v, "ignoring invalid {ENV_SUPERSAMPLE}"),
            }
        }
    }

    /// Check values that cannot be expressed in the types.
    pub fn validate(&self) -> LoveNotesResult<()> {
        if self.supersample == 0 {
            return Err(LoveNotesError::validation("supersample must be at least 1"));
        }
        self.page_url()?;
        Ok(())
    }

    /// Parsed [`StudioConfig::page_url`].
    pub fn page_url(&self) -> LoveNotesResult<Url> {
        Url::parse(&self.page_url).map_err(|e| {
            LoveNotesError::validation(format!("page url '{}' is invalid: {e}", self.page_url))
        })
    }

    /// Export options for `mode` at the configured density.
    pub fn export_opts(&self, mode: ExportMode) -> ExportOpts {
        ExportOpts {
            mode,
            supersample: self.supersample,
        }
    }

    /// Asset loader rooted at [`StudioConfig::assets_root`].
    pub fn asset_loader(&self) -> FsAssetLoader {
        FsAssetLoader::new(&self.assets_root)
    }

    /// Font registry with system fonts (if enabled) and every configured font directory.
    pub fn font_book(&self) -> FontBook {
        let mut fonts = if self.load_system_fonts {
            FontBook::with_system_fonts()
        } else {
            FontBook::new()
        };
        for dir in &self.font_dirs {
            let n = fonts.load_dir(dir);
            tracing::debug!(dir = %dir.display(), faces = n, "loaded font directory");
        }
        fonts
    }

    /// Card repository over the file store, with the legacy file as fallback when set.
    pub fn repository(&self) -> CardRepository {
        let repo = CardRepository::new(Arc::new(FsCardStore::new(&self.store_dir)));
        match &self.legacy_file {
            Some(path) => repo.with_legacy(Arc::new(FsLegacyStore::new(path))),
            None => repo,
        }
    }
}
