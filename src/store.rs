//! Card persistence: the primary store, the legacy key/value fallback, and the repository that
//! ties them together.

pub(crate) mod card_store;
pub(crate) mod legacy;
pub(crate) mod repository;
