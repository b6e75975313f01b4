use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::foundation::error::{LoveNotesError, LoveNotesResult};
use crate::scene::card::{Card, CardId};

/// Primary card persistence, keyed by card id.
///
/// Each call is atomic: a `put` either fully replaces the stored card or leaves the previous
/// value intact.
pub trait CardStore: Send + Sync {
    /// Stored card for `id`, or `None` if absent.
    fn get<'a>(&'a self, id: &'a CardId) -> BoxFuture<'a, LoveNotesResult<Option<Card>>>;

    /// Store `card` under `id`, replacing any previous value.
    fn put<'a>(&'a self, id: &'a CardId, card: &'a Card) -> BoxFuture<'a, LoveNotesResult<()>>;
}

/// On-disk and in-memory record shape: the card plus its id.
#[derive(Debug, Serialize, Deserialize)]
struct StoredCard {
    id: CardId,
    data: Card,
}

/// Process-local store. Values are kept serialized, so callers never share state with it.
#[derive(Debug, Default)]
pub struct MemoryCardStore {
    records: Mutex<HashMap<CardId, String>>,
}

impl MemoryCardStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored cards.
    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> LoveNotesResult<std::sync::MutexGuard<'_, HashMap<CardId, String>>> {
        self.records
            .lock()
            .map_err(|_| LoveNotesError::store("memory card store lock poisoned"))
    }
}

impl CardStore for MemoryCardStore {
    fn get<'a>(&'a self, id: &'a CardId) -> BoxFuture<'a, LoveNotesResult<Option<Card>>> {
        Box::pin(async move {
            let json = self.lock()?.get(id).cloned();
            json.map(|s| serde_json::from_str::<StoredCard>(&s).map(|r| r.data))
                .transpose()
                .map_err(|e| LoveNotesError::store(format!("card '{id}' is corrupt: {e}")))
        })
    }

    fn put<'a>(&'a self, id: &'a CardId, card: &'a Card) -> BoxFuture<'a, LoveNotesResult<()>> {
        Box::pin(async move {
            let json = serde_json::to_string(&StoredCard {
                id: id.clone(),
                data: card.clone(),
            })?;
            self.lock()?.insert(id.clone(), json);
            Ok(())
        })
    }
}

/// One JSON file per card under a directory: `<dir>/<id>.json`.
///
/// Writes go to a temporary file in the same directory and are renamed into place.
#[derive(Clone, Debug)]
pub struct FsCardStore {
    dir: PathBuf,
}

impl FsCardStore {
    /// Store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Backing directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File that holds `id`.
    pub fn path_for(&self, id: &CardId) -> PathBuf {
        self.dir.join(format!("{}.json", id.as_str()))
    }

    fn read(&self, id: &CardId) -> LoveNotesResult<Option<Card>> {
        let path = self.path_for(id);
        let bytes = match std::fs::read(&path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(LoveNotesError::store(format!(
                    "read '{}': {e}",
                    path.display()
                )));
            }
        };
        let record: StoredCard = serde_json::from_slice(&bytes).map_err(|e| {
            LoveNotesError::store(format!("card file '{}' is corrupt: {e}", path.display()))
        })?;
        if &record.id != id {
            tracing::warn!(file = %path.display(), stored = %record.id, "card file id mismatch");
        }
        Ok(Some(record.data))
    }

    fn write(&self, id: &CardId, card: &Card) -> LoveNotesResult<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            LoveNotesError::store(format!("create store dir '{}': {e}", self.dir.display()))
        })?;
        let json = serde_json::to_vec_pretty(&StoredCard {
            id: id.clone(),
            data: card.clone(),
        })?;

        let dest = self.path_for(id);
        let tmp = self.dir.join(format!(
            ".{}.{}.tmp",
            id.as_str(),
            uuid::Uuid::new_v4().simple()
        ));
        std::fs::write(&tmp, &json)
            .map_err(|e| LoveNotesError::store(format!("write '{}': {e}", tmp.display())))?;
        std::fs::rename(&tmp, &dest).map_err(|e| {
            let _ = std::fs::remove_file(&tmp);
            LoveNotesError::store(format!("replace '{}': {e}", dest.display()))
        })?;
        tracing::debug!(path = %dest.display(), "card written");
        Ok(())
    }
}

impl CardStore for FsCardStore {
    fn get<'a>(&'a self, id: &'a CardId) -> BoxFuture<'a, LoveNotesResult<Option<Card>>> {
        Box::pin(async move { self.read(id) })
    }

    fn put<'a>(&'a self, id: &'a CardId, card: &'a Card) -> BoxFuture<'a, LoveNotesResult<()>> {
        Box::pin(async move { self.write(id, card) })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/store/card_store.rs"]
mod tests;
