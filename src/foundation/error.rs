/// Result alias used across the crate.
pub type LoveNotesResult<T> = Result<T, LoveNotesError>;

/// Errors surfaced by the card engine.
///
/// Mutations that target a missing element id are not errors; they are silent no-ops on
/// [`crate::SceneModel`].
#[derive(thiserror::Error, Debug)]
pub enum LoveNotesError {
    /// Malformed input: ids, colors, background expressions, option values.
    #[error("validation error: {0}")]
    Validation(String),

    /// An asset could not be located or fetched.
    #[error("asset error: {0}")]
    Asset(String),

    /// Asset bytes were fetched but could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// The persistence layer failed to read or write a card.
    #[error("store error: {0}")]
    Store(String),

    /// The rendered buffer could not be encoded.
    #[error("encode error: {0}")]
    Encode(String),

    /// A mutation was attempted while the session is in view mode.
    #[error("card is opened read-only in view mode")]
    ReadOnly,

    /// JSON (de)serialization failed.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Any other failure, with its source chain preserved.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LoveNotesError {
    /// Build a [`LoveNotesError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`LoveNotesError::Asset`].
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    /// Build a [`LoveNotesError::Decode`].
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`LoveNotesError::Store`].
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Build a [`LoveNotesError::Encode`].
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`LoveNotesError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for LoveNotesError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}
