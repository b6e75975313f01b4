use std::collections::HashMap;
use std::path::{Path, PathBuf};

use futures::future::BoxFuture;

use crate::foundation::error::{LoveNotesError, LoveNotesResult};
use crate::scene::card::CardId;

/// Key prefix used by the older key/value card storage.
pub const LEGACY_KEY_PREFIX: &str = "lovenotes-card-";

/// Legacy key for a card id.
pub fn legacy_key(id: &CardId) -> String {
    format!("{LEGACY_KEY_PREFIX}{id}")
}

/// Read side of the older string key/value storage, consulted only when the primary store
/// misses.
pub trait LegacyStore: Send + Sync {
    /// Raw stored string for `key`, or `None` if absent.
    fn get_item<'a>(&'a self, key: &'a str) -> BoxFuture<'a, LoveNotesResult<Option<String>>>;
}

/// In-memory legacy storage.
#[derive(Clone, Debug, Default)]
pub struct MemoryLegacyStore {
    items: HashMap<String, String>,
}

impl MemoryLegacyStore {
    /// Empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a raw item.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.items.insert(key.into(), value.into());
    }
}

impl LegacyStore for MemoryLegacyStore {
    fn get_item<'a>(&'a self, key: &'a str) -> BoxFuture<'a, LoveNotesResult<Option<String>>> {
        Box::pin(async move { Ok(self.items.get(key).cloned()) })
    }
}

/// Legacy storage exported to a single JSON object file of string values.
///
/// A missing file behaves like empty storage.
#[derive(Clone, Debug)]
pub struct FsLegacyStore {
    path: PathBuf,
}

impl FsLegacyStore {
    /// Storage backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> LoveNotesResult<HashMap<String, String>> {
        let bytes = match std::fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => {
                return Err(LoveNotesError::store(format!(
                    "read legacy storage '{}': {e}",
                    self.path.display()
                )));
            }
        };
        serde_json::from_slice(&bytes).map_err(|e| {
            LoveNotesError::store(format!(
                "legacy storage '{}' is not a string map: {e}",
                self.path.display()
            ))
        })
    }
}

impl LegacyStore for FsLegacyStore {
    fn get_item<'a>(&'a self, key: &'a str) -> BoxFuture<'a, LoveNotesResult<Option<String>>> {
        Box::pin(async move { Ok(self.read_all()?.remove(key)) })
    }
}
