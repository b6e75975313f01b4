use std::collections::HashMap;

use crate::assets::decode::{PreparedAsset, decode_asset};
use crate::assets::loader::AssetLoader;
use crate::assets::source::AssetRef;
use crate::foundation::error::{LoveNotesError, LoveNotesResult};
use crate::scene::card::Card;

/// Decoded assets for one card, keyed by reference.
#[derive(Clone, Debug, Default)]
pub struct ResolvedAssets {
    map: HashMap<AssetRef, PreparedAsset>,
}

impl ResolvedAssets {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a decoded asset.
    pub fn insert(&mut self, asset: AssetRef, prepared: PreparedAsset) {
        self.map.insert(asset, prepared);
    }

    /// Decoded asset for `asset`.
    pub fn get(&self, asset: &AssetRef) -> LoveNotesResult<&PreparedAsset> {
        self.map.get(asset).ok_or_else(|| {
            LoveNotesError::asset(format!("asset '{asset}' was not resolved before drawing"))
        })
    }

    /// Number of decoded assets.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether nothing was resolved.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Fetch and decode every asset a card references.
///
/// Loads run concurrently; the first failure aborts the whole set. Completion order has no
/// effect on the result.
#[tracing::instrument(skip(card, loader), fields(count = tracing::field::Empty))]
pub async fn resolve_assets(
    card: &Card,
    loader: &dyn AssetLoader,
) -> LoveNotesResult<ResolvedAssets> {
    let refs = card.referenced_assets();
    tracing::Span::current().record("count", refs.len());

    let loads = refs.iter().map(|asset| async move {
        let bytes = loader.load(asset).await?;
        let prepared = decode_asset(&bytes).map_err(|e| match e {
            LoveNotesError::Decode(msg) => {
                LoveNotesError::decode(format!("{}: {msg}", asset.display_name()))
            }
            other => other,
        })?;
        Ok::<_, LoveNotesError>((asset.clone(), prepared))
    });

    let mut out = ResolvedAssets::new();
    for (asset, prepared) in futures::future::try_join_all(loads).await? {
        out.insert(asset, prepared);
    }
    tracing::debug!(resolved = out.len(), "assets resolved");
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/render/resolve.rs"]
mod tests;
