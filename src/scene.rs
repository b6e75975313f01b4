//! In-memory card model: elements, background, undo history and editing gestures.

pub(crate) mod background;
pub(crate) mod card;
pub(crate) mod catalog;
pub(crate) mod element;
pub(crate) mod gesture;
pub(crate) mod history;
pub(crate) mod model;
