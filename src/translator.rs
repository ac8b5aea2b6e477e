//! DOM to node translation.
//!
//! Walks a normalized tree and produces the output node sequence. The walk
//! carries a [`WalkState`] holding the most recently classified tag, which
//! decides whether an `em` is a figure caption and whether text following
//! a synthesized `video`/`iframe` is dropped.

use std::collections::BTreeMap;

use crate::dom::{Attribute, NodeData, NodeId, Tree};
use crate::html_processing::normalize_tree;
use crate::node::{Element, Node, Tag};
use crate::options::Options;
use crate::patterns::MediaKind;
use crate::url_utils::{embed_src, relativize};

/// Attribute name prefix reserved for editor bookkeeping.
const RESERVED_ATTR_PREFIX: &str = "data-";

/// Attributes never forwarded to the output.
const EXCLUDED_ATTRS: &[&str] = &["contenteditable", "dir", "style"];

/// State threaded through a single translation walk.
#[derive(Debug, Clone, Default)]
pub struct WalkState {
    /// Most recently classified tag, in document order.
    last: Option<Tag>,
    /// Depth of enclosing code blocks.
    code_depth: usize,
}

impl WalkState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recently classified tag.
    #[must_use]
    pub fn last(&self) -> Option<&Tag> {
        self.last.as_ref()
    }

    /// An `em` right after media is that media's caption.
    #[must_use]
    pub fn follows_media(&self) -> bool {
        self.last.as_ref().is_some_and(Tag::is_media)
    }

    /// Text after a synthesized video or iframe repeats its source URL.
    #[must_use]
    pub fn suppresses_text(&self) -> bool {
        matches!(self.last, Some(Tag::Video | Tag::Iframe))
    }

    fn classify(&mut self, tag: Tag) {
        self.last = Some(tag);
    }
}

/// Normalize HTML and translate it into output nodes.
#[must_use]
pub fn to_nodes(html: &str, options: &Options) -> Vec<Node> {
    let mut tree = Tree::parse(html);
    normalize_tree(&mut tree);
    let nodes = translate_tree(&tree, options);
    log::debug!("to_nodes: {} bytes in, {} top-level nodes out", html.len(), nodes.len());
    nodes
}

/// Translate an already normalized tree.
#[must_use]
pub fn translate_tree(tree: &Tree, options: &Options) -> Vec<Node> {
    let mut state = WalkState::new();
    let mut out = Vec::new();
    for &child in tree.children(NodeId::ROOT) {
        translate_node(tree, child, &mut state, options, &mut out);
    }
    out
}

/// Translate `id` and push the result into `out`.
///
/// Elided wrappers (`span`, code nested in code) push their children
/// directly, and suppressed text pushes nothing.
pub fn translate_node(
    tree: &Tree,
    id: NodeId,
    state: &mut WalkState,
    options: &Options,
    out: &mut Vec<Node>,
) {
    match tree.data(id) {
        NodeData::Text(text) => {
            if state.suppresses_text() {
                log::trace!("dropping text after {:?}", state.last());
            } else {
                out.push(Node::Text(text.clone()));
            }
        }
        NodeData::Element { name, .. } => match name.as_str() {
            "span" => translate_children(tree, id, state, options, out),
            "code" | "pre" if state.code_depth > 0 => {
                state.classify(Tag::Code);
                translate_children(tree, id, state, options, out);
            }
            _ => {
                let element = translate_element(tree, id, name, state, options);
                out.push(element.into());
            }
        },
        NodeData::Document => translate_children(tree, id, state, options, out),
    }
}

fn translate_children(
    tree: &Tree,
    id: NodeId,
    state: &mut WalkState,
    options: &Options,
    out: &mut Vec<Node>,
) {
    for &child in tree.children(id) {
        translate_node(tree, child, state, options, out);
    }
}

fn translate_element(
    tree: &Tree,
    id: NodeId,
    name: &str,
    state: &mut WalkState,
    options: &Options,
) -> Element {
    let mut attrs = filter_attributes(tree.attrs(id));

    let tag = match name {
        "div" => Tag::Figure,
        "a" => match tree.attr(id, "href") {
            Some(href) => classify_link(href, &mut attrs, options),
            None => Tag::A,
        },
        "h2" => Tag::H3,
        "h3" => Tag::H4,
        "em" if state.follows_media() => Tag::Figcaption,
        "code" | "pre" => Tag::Code,
        other => Tag::from_name(other),
    };
    state.classify(if tag == Tag::Figcaption { Tag::Em } else { tag.clone() });

    let is_code = tag == Tag::Code;
    let mut element = Element {
        tag,
        attrs,
        children: Vec::new(),
    };

    if is_code {
        state.code_depth += 1;
    }
    translate_children(tree, id, state, options, &mut element.children);
    if is_code {
        state.code_depth -= 1;
        return Element::new(Tag::P).with_child(element);
    }
    element
}

/// Copy attributes, dropping editor-only ones.
fn filter_attributes(attrs: &[Attribute]) -> BTreeMap<String, String> {
    attrs
        .iter()
        .filter(|a| {
            !a.name.starts_with(RESERVED_ATTR_PREFIX) && !EXCLUDED_ATTRS.contains(&a.name.as_str())
        })
        .map(|a| (a.name.clone(), a.value.clone()))
        .collect()
}

/// Reinterpret a link to media as `video` or `iframe`, rewriting its
/// attributes in place.
fn classify_link(href: &str, attrs: &mut BTreeMap<String, String>, options: &Options) -> Tag {
    let Some(kind) = MediaKind::detect(href) else {
        return Tag::A;
    };
    attrs.remove("href");

    match kind.provider() {
        None => {
            let src = relativize(&options.base_url, href);
            for (name, value) in [
                ("src", src.as_str()),
                ("preload", "auto"),
                ("autoplay", "autoplay"),
                ("loop", "loop"),
                ("muted", "muted"),
            ] {
                attrs.insert(name.to_string(), value.to_string());
            }
            Tag::Video
        }
        Some(provider) => {
            let src = embed_src(&options.embed_path, provider, href);
            for (name, value) in [
                ("src", src.as_str()),
                ("width", "640"),
                ("height", "360"),
                ("frameborder", "0"),
                ("allowtransparency", "true"),
                ("allowfullscreen", "true"),
                ("scrolling", "no"),
            ] {
                attrs.insert(name.to_string(), value.to_string());
            }
            Tag::Iframe
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn nodes_json(html: &str) -> serde_json::Value {
        serde_json::to_value(to_nodes(html, &Options::default())).unwrap()
    }

    #[test]
    fn test_paragraph_with_inline_tags() {
        assert_eq!(
            nodes_json("<p>Hi <strong>there</strong> <em>you</em></p>"),
            json!([{"tag": "p", "children": [
                "Hi ",
                {"tag": "strong", "children": ["there"]},
                " ",
                {"tag": "em", "children": ["you"]}
            ]}])
        );
    }

    #[test]
    fn test_headings_shift_down() {
        assert_eq!(
            nodes_json("<h2>Title</h2><h3>Sub</h3>"),
            json!([
                {"tag": "h3", "children": ["Title"]},
                {"tag": "h4", "children": ["Sub"]}
            ])
        );
    }

    #[test]
    fn test_image_figure_with_caption() {
        assert_eq!(
            nodes_json(r#"<div><img src="/file/x.jpg"><br><em>Caption</em></div>"#),
            json!([{"tag": "figure", "children": [
                {"tag": "img", "attrs": {"src": "/file/x.jpg"}},
                {"tag": "figcaption", "children": ["Caption"]}
            ]}])
        );
    }

    #[test]
    fn test_em_outside_figure_stays_em() {
        let value = nodes_json("<p><strong>a</strong><em>b</em></p>");
        assert_eq!(value[0]["children"][1]["tag"], "em");
    }

    #[test]
    fn test_video_link() {
        assert_eq!(
            nodes_json(r#"<div><a href="https://telegra.ph/file/clip.mp4">https://telegra.ph/file/clip.mp4</a></div>"#),
            json!([{"tag": "figure", "children": [
                {"tag": "video", "attrs": {
                    "src": "/file/clip.mp4",
                    "preload": "auto",
                    "autoplay": "autoplay",
                    "loop": "loop",
                    "muted": "muted"
                }}
            ]}])
        );
    }

    #[test]
    fn test_vimeo_link_becomes_iframe() {
        let value = nodes_json(r#"<div><a href="https://vimeo.com/42">watch</a></div>"#);
        let iframe = &value[0]["children"][0];
        assert_eq!(iframe["tag"], "iframe");
        assert_eq!(iframe["attrs"]["src"], "/embed/vimeo?url=https%3A%2F%2Fvimeo.com%2F42");
        assert_eq!(iframe["attrs"]["width"], "640");
        assert_eq!(iframe["attrs"]["height"], "360");
        assert_eq!(iframe["attrs"]["frameborder"], "0");
        assert_eq!(iframe["attrs"]["allowtransparency"], "true");
        assert_eq!(iframe["attrs"]["allowfullscreen"], "true");
        assert_eq!(iframe["attrs"]["scrolling"], "no");
        assert!(iframe["attrs"].get("href").is_none());
        assert!(iframe.get("children").is_none());
    }

    #[test]
    fn test_iframe_caption() {
        let value = nodes_json("<p>https://youtu.be/abc<br><em>Talk</em></p>");
        assert_eq!(value[0]["tag"], "figure");
        assert_eq!(value[0]["children"][0]["tag"], "iframe");
        assert_eq!(value[0]["children"][1], json!({"tag": "figcaption", "children": ["Talk"]}));
    }

    #[test]
    fn test_plain_link_keeps_attributes() {
        assert_eq!(
            nodes_json(r#"<p><a href="https://example.com" target="_blank" data-x="1" dir="ltr">ex</a></p>"#),
            json!([{"tag": "p", "children": [
                {"tag": "a", "attrs": {"href": "https://example.com", "target": "_blank"}, "children": ["ex"]}
            ]}])
        );
    }

    #[test]
    fn test_link_without_href() {
        assert_eq!(
            nodes_json("<p><a>anchor</a></p>"),
            json!([{"tag": "p", "children": [{"tag": "a", "children": ["anchor"]}]}])
        );
    }

    #[test]
    fn test_code_block_wrapped_in_paragraph() {
        assert_eq!(
            nodes_json("<pre><div><span>x=1</span></div></pre>"),
            json!([{"tag": "p", "children": [{"tag": "code", "children": ["x=1"]}]}])
        );
    }

    #[test]
    fn test_nested_code_collapses() {
        assert_eq!(
            nodes_json("<pre><code>let a = 1;</code></pre>"),
            json!([{"tag": "p", "children": [{"tag": "code", "children": ["let a = 1;"]}]}])
        );
    }

    #[test]
    fn test_lists_and_quotes_pass_through() {
        assert_eq!(
            nodes_json("<ul><li>one</li></ul><blockquote>q</blockquote>"),
            json!([
                {"tag": "ul", "children": [{"tag": "li", "children": ["one"]}]},
                {"tag": "blockquote", "children": ["q"]}
            ])
        );
    }

    #[test]
    fn test_unknown_tag_passes_through() {
        let nodes = to_nodes("<h1>Big</h1>", &Options::default());
        assert_eq!(nodes[0].tag(), Some(&Tag::Other("h1".to_string())));
    }

    #[test]
    fn test_stray_span_is_elided() {
        let mut tree = Tree::new();
        let span = tree.new_element("span", Vec::new());
        let text = tree.new_text("inner");
        tree.append(NodeId::ROOT, span);
        tree.append(span, text);
        let nodes = translate_tree(&tree, &Options::default());
        assert_eq!(nodes, vec![Node::Text("inner".to_string())]);
    }

    #[test]
    fn test_walk_state() {
        let mut state = WalkState::new();
        assert!(!state.follows_media());
        assert!(!state.suppresses_text());
        state.classify(Tag::Img);
        assert!(state.follows_media());
        assert!(!state.suppresses_text());
        state.classify(Tag::Iframe);
        assert!(state.suppresses_text());
        state.classify(Tag::P);
        assert_eq!(state.last(), Some(&Tag::P));
        assert!(!state.follows_media());
    }

    #[test]
    fn test_custom_embed_path() {
        let options = Options {
            embed_path: "/proxy".to_string(),
            ..Options::default()
        };
        let nodes = to_nodes(r#"<div><a href="https://youtu.be/z">z</a></div>"#, &options);
        let figure = nodes[0].as_element().unwrap();
        let iframe = figure.children[0].as_element().unwrap();
        assert_eq!(iframe.attr("src"), Some("/proxy/youtube?url=https%3A%2F%2Fyoutu.be%2Fz"));
    }
}
