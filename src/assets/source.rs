use base64::Engine as _;

use crate::foundation::error::{LoveNotesError, LoveNotesResult};

/// Opaque reference to an image payload: a URL, a site path, or embedded `data:` bytes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct AssetRef(String);

/// How an [`AssetRef`] is resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssetLocation<'a> {
    /// Inline payload (`data:<mime>[;base64],<payload>`).
    Data {
        /// Declared media type, empty when omitted.
        mime: &'a str,
        /// Whether the payload is base64 encoded.
        base64: bool,
        /// Raw payload text after the comma.
        payload: &'a str,
    },
    /// Network URL (`http://`, `https://`).
    Remote(&'a str),
    /// Site-root path such as `/stickers/dove.png`, resolved below the asset root.
    SiteRoot(&'a str),
    /// Relative path, resolved below the asset root.
    Relative(&'a str),
}

impl AssetRef {
    /// Wrap a reference string.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// The reference as stored.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Classify the reference.
    pub fn location(&self) -> LoveNotesResult<AssetLocation<'_>> {
        let s = self.0.trim();
        if s.is_empty() {
            return Err(LoveNotesError::asset("asset reference is empty"));
        }
        if let Some(rest) = strip_prefix_ignore_case(s, "data:") {
            let (header, payload) = rest
                .split_once(',')
                .ok_or_else(|| LoveNotesError::asset("data url is missing ','"))?;
            let (mime, base64) = match header.strip_suffix(";base64") {
                Some(m) => (m, true),
                None => (header, false),
            };
            return Ok(AssetLocation::Data {
                mime,
                base64,
                payload,
            });
        }
        if strip_prefix_ignore_case(s, "http://").is_some()
            || strip_prefix_ignore_case(s, "https://").is_some()
            || s.starts_with("//")
        {
            return Ok(AssetLocation::Remote(s));
        }
        if let Some(path) = s.strip_prefix('/') {
            return Ok(AssetLocation::SiteRoot(path));
        }
        Ok(AssetLocation::Relative(s))
    }

    /// Short form for logs; embedded payloads are elided.
    pub fn display_name(&self) -> String {
        match self.location() {
            Ok(AssetLocation::Data { mime, payload, .. }) => {
                format!("data:{mime} ({} bytes)", payload.len())
            }
            _ => self.0.clone(),
        }
    }
}

impl From<&str> for AssetRef {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for AssetRef {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for AssetRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display_name())
    }
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    if s.len() >= prefix.len()
        && s.is_char_boundary(prefix.len())
        && s[..prefix.len()].eq_ignore_ascii_case(prefix)
    {
        Some(&s[prefix.len()..])
    } else {
        None
    }
}

/// Decode the payload of a `data:` URL.
pub fn decode_data_url(base64: bool, payload: &str) -> LoveNotesResult<Vec<u8>> {
    if base64 {
        let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
        return base64::engine::general_purpose::STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| LoveNotesError::asset(format!("invalid base64 in data url: {e}")));
    }
    percent_decode(payload)
}

fn percent_decode(s: &str) -> LoveNotesResult<Vec<u8>> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes
                .get(i + 1..i + 3)
                .and_then(|h| std::str::from_utf8(h).ok())
                .and_then(|h| u8::from_str_radix(h, 16).ok())
                .ok_or_else(|| LoveNotesError::asset("invalid percent escape in data url"))?;
            out.push(hex);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    Ok(out)
}
