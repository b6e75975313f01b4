//! Background audio: video-id extraction from pasted links and the embed URL.

use std::sync::LazyLock;

use regex::Regex;

/// Length of a video id.
pub const VIDEO_ID_LEN: usize = 11;

/// A well-formed video id.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VideoId(String);

impl VideoId {
    /// Validate an id: exactly 11 characters from `[A-Za-z0-9_-]`.
    pub fn parse(s: &str) -> Option<Self> {
        let ok = s.len() == VIDEO_ID_LEN
            && s
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        ok.then(|| Self(s.to_string()))
    }

    /// Id text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Autoplaying, looping embed URL for this video.
    pub fn embed_url(&self) -> String {
        embed_url(self)
    }
}

impl std::fmt::Display for VideoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extract the video id from a pasted link.
///
/// Recognized markers are `youtu.be/`, `v/`, `u/<w>/`, `embed/`, `watch?v=` and `&v=`. When
/// several occur, the last one wins. The id runs from the marker up to the first `#`, `&` or
/// `?`. Anything that does not yield a well-formed id is `None`.
pub fn extract_video_id(link: &str) -> Option<VideoId> {
    let caps = VIDEO_LINK_RE.captures(link.trim())?;
    VideoId::parse(caps.get(2)?.as_str())
}

/// Embed URL for `id`.
pub fn embed_url(id: &VideoId) -> String {
    format!(
        "https://www.youtube.com/embed/{id}?autoplay=1&loop=1&playlist={id}&mute=0",
        id = id.as_str()
    )
}

// Greedy `^.*` makes the last marker on the first line win.
static VIDEO_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^.*(youtu.be/|v/|u/[0-9A-Za-z_]/|embed/|watch\?v=|&v=)([^#&?]*).*")
        .expect("valid video link regex")
});
