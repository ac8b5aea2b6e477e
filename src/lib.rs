//! # telegraph-content
//!
//! Converts rich-text editor HTML into the JSON node tree accepted by the
//! Telegraph publishing API, and renders such node trees back into HTML.
//!
//! ## Quick Start
//!
//! ```rust
//! use telegraph_content::{to_html, to_nodes};
//!
//! let nodes = to_nodes("<h2>Title</h2><div>Some <span style=\"font-weight: bold;\">bold</span> text</div>");
//! let json = serde_json::to_string(&nodes)?;
//! assert_eq!(
//!     json,
//!     r#"[{"tag":"h3","children":["Title"]},{"tag":"p","children":["Some ",{"tag":"strong","children":["bold"]}," text"]}]"#
//! );
//!
//! let html = to_html(&nodes);
//! assert_eq!(html, "<h2>Title</h2><p>Some <strong>bold</strong> text</p>");
//! # Ok::<(), serde_json::Error>(())
//! ```
//!
//! ## Pipeline
//!
//! - **Normalizer** ([`normalize`]): canonical HTML subset, no spans or
//!   inline styles, `div` kept only for media figures.
//! - **Translator** ([`to_nodes`]): normalized DOM to output nodes, with
//!   media links turned into `video`/`iframe` figures.
//! - **Renderer** ([`to_html`]): output nodes back to editor HTML.
//!
//! None of the three fail on malformed HTML; the parser recovers and the
//! rewrite passes skip elements whose shape they do not recognise.

mod error;
mod options;

/// Arena DOM with parent/child index links.
pub mod dom;

/// HTML normalization passes.
pub mod html_processing;

/// Output node model (JSON shape of the publishing API).
pub mod node;

/// Media URL detection.
pub mod patterns;

/// Node tree to HTML rendering.
pub mod render;

/// Normalized DOM to node tree translation.
pub mod translator;

/// Media source qualification and embed-proxy paths.
pub mod url_utils;

use serde::Deserialize;

// Public API - re-exports
pub use error::{Error, Result};
pub use node::{Element, Node, Tag};
pub use options::{Options, DEFAULT_BASE_URL, DEFAULT_EMBED_PATH};
pub use patterns::MediaKind;

/// Normalizes editor HTML into the canonical subset.
///
/// Standalone "clean" operation; [`to_nodes`] runs it internally.
///
/// # Example
///
/// ```rust
/// use telegraph_content::normalize;
///
/// let html = normalize("<div><span style=\"font-style: italic;\">hi</span></div>");
/// assert_eq!(html, "<p><em>hi</em></p>");
/// ```
#[must_use]
pub fn normalize(html: &str) -> String {
    html_processing::normalize(html)
}

/// Converts editor HTML into output nodes using default options.
///
/// # Example
///
/// ```rust
/// use telegraph_content::{to_nodes, Tag};
///
/// let nodes = to_nodes("<div><img src=\"/file/x.jpg\"></div>");
/// let figure = nodes[0].as_element().unwrap();
/// assert_eq!(figure.tag, Tag::Figure);
/// assert_eq!(figure.children[0].as_element().unwrap().attr("src"), Some("/file/x.jpg"));
/// ```
#[must_use]
pub fn to_nodes(html: &str) -> Vec<Node> {
    to_nodes_with_options(html, &Options::default())
}

/// Converts editor HTML into output nodes with custom options.
#[must_use]
pub fn to_nodes_with_options(html: &str, options: &Options) -> Vec<Node> {
    translator::to_nodes(html, options)
}

/// Renders output nodes back to HTML using default options.
#[must_use]
pub fn to_html(nodes: &[Node]) -> String {
    to_html_with_options(nodes, &Options::default())
}

/// Renders output nodes back to HTML with custom options.
#[must_use]
pub fn to_html_with_options(nodes: &[Node], options: &Options) -> String {
    render::to_html(nodes, options)
}

/// Converts editor HTML straight to the JSON text sent to the API.
///
/// `pretty` selects two-space indented output.
///
/// # Example
///
/// ```rust
/// use telegraph_content::to_json;
///
/// let json = to_json("<p>Hi</p>", false)?;
/// assert_eq!(json, r#"[{"tag":"p","children":["Hi"]}]"#);
/// # Ok::<(), telegraph_content::Error>(())
/// ```
pub fn to_json(html: &str, pretty: bool) -> Result<String> {
    let nodes = to_nodes(html);
    let json = if pretty {
        serde_json::to_string_pretty(&nodes)?
    } else {
        serde_json::to_string(&nodes)?
    };
    Ok(json)
}

/// Node content as returned by the API: usually an array, sometimes a
/// single node.
#[derive(Deserialize)]
#[serde(untagged)]
enum Content {
    Many(Vec<Node>),
    One(Node),
}

/// Renders JSON node text returned by the API into HTML.
///
/// # Example
///
/// ```rust
/// use telegraph_content::json_to_html;
///
/// let html = json_to_html(r#"[{"tag":"h4","children":["Sub"]}]"#)?;
/// assert_eq!(html, "<h3>Sub</h3>");
/// # Ok::<(), telegraph_content::Error>(())
/// ```
pub fn json_to_html(json: &str) -> Result<String> {
    json_to_html_with_options(json, &Options::default())
}

/// Renders JSON node text into HTML with custom options.
pub fn json_to_html_with_options(json: &str, options: &Options) -> Result<String> {
    let nodes = match serde_json::from_str::<Content>(json)? {
        Content::Many(nodes) => nodes,
        Content::One(node) => vec![node],
    };
    Ok(to_html_with_options(&nodes, options))
}
