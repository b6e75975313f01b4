//! Asset references, loading, decoding, colors and fonts.

pub(crate) mod color;
pub(crate) mod decode;
pub(crate) mod fonts;
pub(crate) mod loader;
pub(crate) mod source;
