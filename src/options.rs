//! Configuration options for conversion.
//!
//! The defaults target the public Telegraph service. The glue layer only
//! needs to override them when talking to a mirror or a test server.

/// Base URL that relative media sources are resolved against.
pub const DEFAULT_BASE_URL: &str = "https://telegra.ph";

/// Path prefix of the embed proxy used for third-party video iframes.
pub const DEFAULT_EMBED_PATH: &str = "/embed";

/// Configuration options for the conversion pipeline.
///
/// All fields are public for easy configuration. Use `Default::default()`
/// for standard settings.
///
/// # Example
///
/// ```rust
/// use telegraph_content::Options;
///
/// let options = Options {
///     base_url: "https://mirror.example".to_string(),
///     ..Options::default()
/// };
/// assert_eq!(options.embed_path, "/embed");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Origin of the publishing service, without a trailing slash.
    ///
    /// Stripped from `.mp4` links when they become `video` sources, and
    /// prepended to relative `img`/`video` sources when rendering HTML.
    ///
    /// Default: `https://telegra.ph`
    pub base_url: String,

    /// Embed-proxy path prefix. Iframe sources take the form
    /// `{embed_path}/{provider}?url=<encoded original>`.
    ///
    /// Default: `/embed`
    pub embed_path: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            embed_path: DEFAULT_EMBED_PATH.to_string(),
        }
    }
}
