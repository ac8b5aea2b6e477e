//! URL Utility Functions
//!
//! Qualifying media sources against the service origin, and building or
//! decoding embed-proxy paths of the form `/embed/{provider}?url=<encoded>`.

use url::{form_urlencoded, Url};

/// Check if a string is an absolute `http(s)` URL with a host.
#[must_use]
pub fn is_absolute_url(s: &str) -> bool {
    let s = s.trim();
    if !s.starts_with("http://") && !s.starts_with("https://") {
        return false;
    }
    Url::parse(s).is_ok_and(|url| url.host().is_some())
}

/// Prefix a relative media source with the service origin.
///
/// Absolute and protocol-relative sources are returned unchanged.
#[must_use]
pub fn qualify(base_url: &str, src: &str) -> String {
    if is_absolute_url(src) || src.starts_with("//") {
        return src.to_string();
    }
    let base = base_url.trim_end_matches('/');
    if src.is_empty() || src.starts_with('/') {
        format!("{base}{src}")
    } else {
        format!("{base}/{src}")
    }
}

/// Strip the service origin from a link so it becomes a relative source.
#[must_use]
pub fn relativize(base_url: &str, href: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if base.is_empty() {
        return href.to_string();
    }
    href.strip_prefix(base).unwrap_or(href).to_string()
}

/// Build the embed-proxy path for a third-party video URL.
#[must_use]
pub fn embed_src(embed_path: &str, provider: &str, original: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(original.as_bytes()).collect();
    format!("{}/{provider}?url={encoded}", embed_path.trim_end_matches('/'))
}

/// Recover the original URL from an embed-proxy path.
///
/// Returns an empty string when the path carries no `url` parameter.
#[must_use]
pub fn extract_embed_url(src: &str) -> String {
    let Some((_, query)) = src.split_once('?') else {
        return String::new();
    };
    let query = query.split('#').next().unwrap_or(query);
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "url")
        .map(|(_, value)| value.into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://telegra.ph";

    #[test]
    fn test_is_absolute_url() {
        assert!(is_absolute_url("https://telegra.ph/file/a.jpg"));
        assert!(is_absolute_url("http://example.com"));
        assert!(!is_absolute_url("/file/a.jpg"));
        assert!(!is_absolute_url("ftp://example.com"));
        assert!(!is_absolute_url(""));
    }

    #[test]
    fn test_qualify_relative_path() {
        assert_eq!(qualify(BASE, "/file/x.jpg"), "https://telegra.ph/file/x.jpg");
        assert_eq!(qualify("https://telegra.ph/", "/file/x.jpg"), "https://telegra.ph/file/x.jpg");
        assert_eq!(qualify(BASE, "file/x.jpg"), "https://telegra.ph/file/x.jpg");
    }

    #[test]
    fn test_qualify_keeps_absolute() {
        assert_eq!(qualify(BASE, "https://cdn.example/x.jpg"), "https://cdn.example/x.jpg");
        assert_eq!(qualify(BASE, "//cdn.example/x.jpg"), "//cdn.example/x.jpg");
    }

    #[test]
    fn test_relativize() {
        assert_eq!(relativize(BASE, "https://telegra.ph/file/v.mp4"), "/file/v.mp4");
        assert_eq!(relativize(BASE, "https://cdn.example/v.mp4"), "https://cdn.example/v.mp4");
        assert_eq!(relativize(BASE, "/file/v.mp4"), "/file/v.mp4");
    }

    #[test]
    fn test_embed_src_encodes_original() {
        assert_eq!(
            embed_src("/embed", "youtube", "https://youtu.be/abc123"),
            "/embed/youtube?url=https%3A%2F%2Fyoutu.be%2Fabc123"
        );
        assert_eq!(
            embed_src("/embed/", "vimeo", "https://vimeo.com/1?a=b&c=d"),
            "/embed/vimeo?url=https%3A%2F%2Fvimeo.com%2F1%3Fa%3Db%26c%3Dd"
        );
    }

    #[test]
    fn test_extract_embed_url() {
        assert_eq!(
            extract_embed_url("/embed/youtube?url=https%3A%2F%2Fyoutu.be%2Fabc123"),
            "https://youtu.be/abc123"
        );
        assert_eq!(
            extract_embed_url("/embed/vimeo?autoplay=1&url=https%3A%2F%2Fvimeo.com%2F9"),
            "https://vimeo.com/9"
        );
    }

    #[test]
    fn test_extract_embed_url_roundtrip_with_query() {
        let original = "https://www.youtube.com/watch?v=x&t=10s";
        assert_eq!(extract_embed_url(&embed_src("/embed", "youtube", original)), original);
    }

    #[test]
    fn test_extract_embed_url_missing_parameter() {
        assert_eq!(extract_embed_url("/embed/youtube"), "");
        assert_eq!(extract_embed_url("/embed/youtube?v=1"), "");
        assert_eq!(extract_embed_url(""), "");
    }
}
