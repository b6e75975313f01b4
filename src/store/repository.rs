use std::sync::Arc;

use crate::foundation::error::{LoveNotesError, LoveNotesResult};
use crate::scene::card::{Card, CardId};
use crate::store::card_store::CardStore;
use crate::store::legacy::{LegacyStore, legacy_key};

/// Card lookup and save over the primary store, with a read-only legacy fallback.
#[derive(Clone)]
pub struct CardRepository {
    primary: Arc<dyn CardStore>,
    legacy: Option<Arc<dyn LegacyStore>>,
}

impl std::fmt::Debug for CardRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardRepository")
            .field("legacy", &self.legacy.is_some())
            .finish_non_exhaustive()
    }
}

impl CardRepository {
    /// Repository over a primary store only.
    pub fn new(primary: Arc<dyn CardStore>) -> Self {
        Self {
            primary,
            legacy: None,
        }
    }

    /// Add a legacy store consulted on primary misses.
    pub fn with_legacy(mut self, legacy: Arc<dyn LegacyStore>) -> Self {
        self.legacy = Some(legacy);
        self
    }

    /// Find a card by id.
    ///
    /// On a primary miss the legacy store is checked; a hit there is copied into the primary
    /// store before returning. Migrating the same id again is harmless.
    #[tracing::instrument(skip(self), fields(card = %id))]
    pub async fn load(&self, id: &CardId) -> LoveNotesResult<Option<Card>> {
        if let Some(card) = self.primary.get(id).await? {
            tracing::debug!("card found in primary store");
            return Ok(Some(card));
        }
        let Some(legacy) = &self.legacy else {
            return Ok(None);
        };
        let Some(raw) = legacy.get_item(&legacy_key(id)).await? else {
            tracing::debug!("card not found");
            return Ok(None);
        };

        let card = Card::from_json_str(&raw)
            .map_err(|e| LoveNotesError::store(format!("legacy card '{id}' is corrupt: {e}")))?;
        self.primary.put(id, &card).await?;
        tracing::info!("migrated card from legacy storage");
        Ok(Some(card))
    }

    /// Store a card, reusing `existing` as its id or allocating a fresh one.
    #[tracing::instrument(skip(self, card), fields(elements = card.elements.len()))]
    pub async fn save(&self, existing: Option<&CardId>, card: &Card) -> LoveNotesResult<CardId> {
        let id = existing.cloned().unwrap_or_else(CardId::generate);
        self.primary.put(&id, card).await?;
        tracing::info!(card = %id, "card saved");
        Ok(id)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/store/repository.rs"]
mod tests;
