//! Share links and the page entry point.
//!
//! A share link is the page location with the card id as its only query parameter. Opening a
//! page URL that carries the parameter selects read-only view mode.

use url::Url;

use crate::scene::card::CardId;

/// Query parameter carrying the card id.
pub const CARD_QUERY_PARAM: &str = "card";

/// Share link for `id`: `page`'s origin and path plus `?card=<id>`.
///
/// Any other query parameters and the fragment of `page` are dropped.
pub fn share_url(page: &Url, id: &CardId) -> Url {
    let mut out = page.clone();
    out.set_fragment(None);
    out.set_query(None);
    out.query_pairs_mut().append_pair(CARD_QUERY_PARAM, id.as_str());
    out
}

/// How a page URL asks the editor to start.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntryMode {
    /// Fresh card in the editor.
    Edit,
    /// Load the card and present it read-only.
    View(CardId),
}

impl EntryMode {
    /// Inspect the page URL's `card` parameter.
    ///
    /// An absent or empty parameter means editing. An id that is not well-formed is logged and
    /// also falls back to editing.
    pub fn from_url(page: &Url) -> Self {
        let Some((_, raw)) = page.query_pairs().find(|(k, _)| k == CARD_QUERY_PARAM) else {
            return Self::Edit;
        };
        if raw.is_empty() {
            return Self::Edit;
        }
        match CardId::parse(raw.to_string()) {
            Ok(id) => Self::View(id),
            Err(e) => {
                tracing::warn!(card = %raw, error = %e, "ignoring malformed card id in page url");
                Self::Edit
            }
        }
    }

    /// Card id to load, when in view mode.
    pub fn card_id(&self) -> Option<&CardId> {
        match self {
            Self::Edit => None,
            Self::View(id) => Some(id),
        }
    }
}
