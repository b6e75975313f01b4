use serde::{Deserialize, Serialize};

use crate::assets::source::AssetRef;
use crate::foundation::error::{LoveNotesError, LoveNotesResult};
use crate::scene::background::Background;
use crate::scene::element::Element;

const CARD_ID_MAX_LEN: usize = 128;

/// Opaque identifier of a stored card.
///
/// Ids are carried in share URLs and used as store keys, so they are restricted to ASCII
/// alphanumerics, `-` and `_`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CardId(String);

impl CardId {
    /// Validate an existing identifier.
    pub fn parse(s: impl Into<String>) -> LoveNotesResult<Self> {
        let s = s.into();
        if s.is_empty() || s.len() > CARD_ID_MAX_LEN {
            return Err(LoveNotesError::validation(format!(
                "card id must be 1..={CARD_ID_MAX_LEN} characters"
            )));
        }
        if let Some(c) = s
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(LoveNotesError::validation(format!(
                "card id contains invalid character {c:?}"
            )));
        }
        Ok(Self(s))
    }

    /// Fresh collision-resistant identifier.
    pub fn generate() -> Self {
        Self(format!("card-{}", uuid::Uuid::new_v4().simple()))
    }

    /// Identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for CardId {
    type Err = LoveNotesError;

    fn from_str(s: &str) -> LoveNotesResult<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CardId {
    type Error = LoveNotesError;

    fn try_from(s: String) -> LoveNotesResult<Self> {
        Self::parse(s)
    }
}

impl From<CardId> for String {
    fn from(id: CardId) -> Self {
        id.0
    }
}

/// The persisted unit of work.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    /// Elements in insertion order; paint order comes from `layer`.
    #[serde(default)]
    pub elements: Vec<Element>,
    /// Active background.
    #[serde(default)]
    pub background: Background,
    /// Pasted video URL for background audio.
    #[serde(default, alias = "youtubeUrl", skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
}

impl Card {
    /// Parse a stored card document.
    pub fn from_json_str(s: &str) -> LoveNotesResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Parse a stored card document from bytes.
    pub fn from_json_slice(bytes: &[u8]) -> LoveNotesResult<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Compact JSON document.
    pub fn to_json_string(&self) -> LoveNotesResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Pretty JSON document.
    pub fn to_json_pretty(&self) -> LoveNotesResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Every asset the rasterizer needs, background first, deduplicated in first-seen order.
    pub fn referenced_assets(&self) -> Vec<AssetRef> {
        let mut out: Vec<AssetRef> = Vec::new();
        let all = self
            .background
            .asset()
            .into_iter()
            .chain(self.elements.iter().filter_map(|e| e.kind.asset()));
        for r in all {
            if !out.contains(r) {
                out.push(r.clone());
            }
        }
        out
    }

    /// Audio URL with blank values treated as unset.
    pub fn audio_url(&self) -> Option<&str> {
        self.audio_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/card.rs"]
mod tests;
