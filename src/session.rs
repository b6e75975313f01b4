//! Editing sessions: selection, view mode and the user-facing open/save/export flows.

pub(crate) mod editor;
