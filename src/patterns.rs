//! Media URL patterns shared by the normalizer and the translator.
//!
//! The publishing service only embeds three kinds of media by link: direct
//! `.mp4` files, YouTube videos and Vimeo videos. Everything else stays a
//! plain anchor.

#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use regex::Regex;

/// Substrings that mark a piece of text or a link target as embeddable media.
pub const MEDIA_MARKERS: [&str; 4] = ["vimeo.com", "youtu.be", "youtube.com", ".mp4"];

/// Matches the whitespace-delimited token carrying a media marker.
static MEDIA_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\S*(?:vimeo\.com|youtu\.be|youtube\.com|\.mp4)\S*").expect("MEDIA_URL regex")
});

/// Kind of media a URL resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    /// Direct `.mp4` file, rendered as a `video` element.
    Video,
    /// YouTube link (`youtu.be` or `youtube.com`), embedded through the proxy.
    YouTube,
    /// Vimeo link, embedded through the proxy.
    Vimeo,
}

impl MediaKind {
    /// Classify a link target.
    ///
    /// A target ending in `.mp4` is a video even when hosted on a provider
    /// domain.
    #[must_use]
    pub fn detect(href: &str) -> Option<Self> {
        if href.ends_with(".mp4") {
            Some(Self::Video)
        } else if href.contains("youtu.be") || href.contains("youtube.com") {
            Some(Self::YouTube)
        } else if href.contains("vimeo.com") {
            Some(Self::Vimeo)
        } else {
            None
        }
    }

    /// Provider segment of the embed-proxy path, `None` for direct videos.
    #[must_use]
    pub fn provider(self) -> Option<&'static str> {
        match self {
            Self::Video => None,
            Self::YouTube => Some("youtube"),
            Self::Vimeo => Some("vimeo"),
        }
    }
}

/// Check whether text mentions any media marker.
#[inline]
#[must_use]
pub fn has_media_marker(text: &str) -> bool {
    MEDIA_MARKERS.iter().any(|marker| text.contains(marker))
}

/// Extract the media URL out of free text, e.g. `"Watch https://youtu.be/x"`.
#[must_use]
pub fn find_media_url(text: &str) -> Option<&str> {
    MEDIA_URL.find(text).map(|m| m.as_str())
}
