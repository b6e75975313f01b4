use std::collections::HashMap;
use std::path::{Path, PathBuf};

use futures::future::BoxFuture;

use crate::assets::source::{AssetLocation, AssetRef, decode_data_url};
use crate::foundation::error::{LoveNotesError, LoveNotesResult};

/// Fetches the raw bytes behind an [`AssetRef`].
///
/// Each call is an independent asynchronous operation; the rasterizer may have several in flight
/// and only draws once every one of them has resolved.
pub trait AssetLoader: Send + Sync {
    /// Fetch the bytes for `asset`. Any failure aborts the containing export.
    fn load<'a>(&'a self, asset: &'a AssetRef) -> BoxFuture<'a, LoveNotesResult<Vec<u8>>>;
}

/// Loader that reads site paths and relative paths below a root directory.
///
/// `data:` URLs are decoded inline. Remote URLs are rejected.
#[derive(Clone, Debug)]
pub struct FsAssetLoader {
    root: PathBuf,
}

impl FsAssetLoader {
    /// Create a loader rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory that site paths resolve against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read(&self, rel: &str) -> LoveNotesResult<Vec<u8>> {
        let norm = normalize_rel_path(rel)?;
        let p = self.root.join(Path::new(&norm));
        std::fs::read(&p).map_err(|e| {
            LoveNotesError::asset(format!("failed to read asset '{}': {e}", p.display()))
        })
    }
}

impl AssetLoader for FsAssetLoader {
    fn load<'a>(&'a self, asset: &'a AssetRef) -> BoxFuture<'a, LoveNotesResult<Vec<u8>>> {
        Box::pin(async move {
            match asset.location()? {
                AssetLocation::Data {
                    base64, payload, ..
                } => decode_data_url(base64, payload),
                AssetLocation::Remote(url) => Err(LoveNotesError::asset(format!(
                    "remote asset '{url}' cannot be fetched by the filesystem loader"
                ))),
                AssetLocation::SiteRoot(p) | AssetLocation::Relative(p) => self.read(p),
            }
        })
    }
}

/// In-memory loader keyed by the exact reference string.
///
/// `data:` URLs are decoded inline, so only path-like references need registering.
#[derive(Clone, Debug, Default)]
pub struct MemoryAssetLoader {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryAssetLoader {
    /// Empty loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register bytes for a reference string.
    pub fn insert(&mut self, asset: impl Into<String>, bytes: Vec<u8>) {
        self.entries.insert(asset.into(), bytes);
    }

    /// Builder-style [`MemoryAssetLoader::insert`].
    pub fn with(mut self, asset: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(asset, bytes);
        self
    }
}

impl AssetLoader for MemoryAssetLoader {
    fn load<'a>(&'a self, asset: &'a AssetRef) -> BoxFuture<'a, LoveNotesResult<Vec<u8>>> {
        Box::pin(async move {
            if let AssetLocation::Data {
                base64, payload, ..
            } = asset.location()?
            {
                return decode_data_url(base64, payload);
            }
            self.entries
                .get(asset.as_str())
                .cloned()
                .ok_or_else(|| LoveNotesError::asset(format!("asset '{asset}' not found")))
        })
    }
}

/// Normalize and validate root-relative asset paths.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub(crate) fn normalize_rel_path(source: &str) -> LoveNotesResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(LoveNotesError::asset("asset paths must be relative"));
    }
    if s.is_empty() {
        return Err(LoveNotesError::asset("asset path must be non-empty"));
    }
    // Query strings and fragments never name a file.
    let s = s.split(['?', '#']).next().unwrap_or_default();

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(LoveNotesError::asset("asset paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(LoveNotesError::asset("asset path must contain a file name"));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
