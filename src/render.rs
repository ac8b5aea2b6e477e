//! Node to HTML rendering.
//!
//! A fold over the output node tree that emits the HTML a rich-text editor
//! understands. It reverses the translator's tag choices: headings shift
//! back up a level, figures become a `div` holding an image or a link to
//! the media, and code goes back into `pre`.
//!
//! Missing optional fields (no caption, no `src`, no children) render as
//! empty output for that part instead of failing.

use std::fmt::Write as _;

use html_escape::{encode_double_quoted_attribute, encode_quoted_attribute};

use crate::node::{Element, Node, Tag};
use crate::options::Options;
use crate::url_utils::{extract_embed_url, qualify};

/// Render a node sequence, concatenating the output of each node.
#[must_use]
pub fn to_html(nodes: &[Node], options: &Options) -> String {
    let html: String = nodes.iter().map(|node| render_node(node, options)).collect();
    log::debug!("to_html: {} top-level nodes in, {} bytes out", nodes.len(), html.len());
    html
}

/// Render one node. Text passes through verbatim.
#[must_use]
pub fn render_node(node: &Node, options: &Options) -> String {
    match node {
        Node::Text(text) => text.clone(),
        Node::Element(element) => render_element(element, options),
    }
}

fn render_element(element: &Element, options: &Options) -> String {
    match &element.tag {
        Tag::Figure => render_figure(element, options),
        Tag::P => format!("<p>{}</p>", render_children(element, options)),
        Tag::H3 => format!("<h2>{}</h2>", first_child(element, options)),
        Tag::H4 => format!("<h3>{}</h3>", first_child(element, options)),
        Tag::Ul => format!("<ul>{}</ul>", render_list_items(element, options)),
        Tag::Ol => format!("<ol>{}</ol>", render_list_items(element, options)),
        Tag::Li => render_children(element, options),
        Tag::Blockquote => render_blockquote(element, options),
        Tag::Strong => format!("<strong>{}</strong>", first_child(element, options)),
        Tag::Em => format!("<em>{}</em>", first_child(element, options)),
        Tag::A => render_link(element, options),
        Tag::Br => "<br>".to_string(),
        Tag::Code => format!("<pre>{}</pre>", encode_quoted_attribute(&code_text(element))),
        _ => first_child(element, options),
    }
}

fn render_children(element: &Element, options: &Options) -> String {
    element
        .children
        .iter()
        .map(|child| render_node(child, options))
        .collect()
}

/// Content of the first child, empty when there is none.
fn first_child(element: &Element, options: &Options) -> String {
    element
        .children
        .first()
        .map(|child| render_node(child, options))
        .unwrap_or_default()
}

fn render_figure(element: &Element, options: &Options) -> String {
    let mut html = String::from("<div>");

    if let Some(media) = element.children.first().and_then(Node::as_element) {
        let src = media.attr("src").unwrap_or_default();
        match media.tag {
            Tag::Img => {
                let url = qualify(&options.base_url, src);
                let _ = write!(html, "<img src=\"{}\" />", encode_double_quoted_attribute(&url));
            }
            Tag::Video => push_media_link(&mut html, &qualify(&options.base_url, src)),
            Tag::Iframe => push_media_link(&mut html, &extract_embed_url(src)),
            _ => log::trace!("figure headed by {} has no media", media.tag),
        }
    }

    if let Some(caption) = element
        .children
        .get(1)
        .and_then(Node::as_element)
        .filter(|c| c.tag == Tag::Figcaption)
    {
        let text = first_child(caption, options);
        if !text.is_empty() {
            let _ = write!(html, "<br><em>{text}</em>");
        }
    }

    html.push_str("</div>");
    html
}

fn push_media_link(html: &mut String, url: &str) {
    let _ = write!(html, "<a href=\"{}\">{url}</a>", encode_double_quoted_attribute(url));
}

/// Wrap each child in `li`. Items render their own children; whitespace
/// between items is dropped.
fn render_list_items(element: &Element, options: &Options) -> String {
    let mut html = String::new();
    for child in &element.children {
        let item = match child {
            Node::Text(text) if text.trim().is_empty() => continue,
            Node::Text(text) => text.clone(),
            Node::Element(item) => render_element(item, options),
        };
        let _ = write!(html, "<li>{item}</li>");
    }
    html
}

/// Newlines in quoted text become hard breaks, then blank lines go.
fn render_blockquote(element: &Element, options: &Options) -> String {
    let mut html = String::from("<blockquote>");
    for child in &element.children {
        match child {
            Node::Text(text) => html.push_str(&text.replace('\n', "  \n")),
            Node::Element(inner) => html.push_str(&render_element(inner, options)),
        }
    }
    let mut html = html
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    html.push_str("</blockquote>");
    html
}

fn render_link(element: &Element, options: &Options) -> String {
    let href = element.attr("href").unwrap_or_default();
    let mut html = format!("<a href=\"{}\"", encode_double_quoted_attribute(href));
    if let Some(target) = element.attr("target") {
        let _ = write!(html, " target=\"{}\"", encode_double_quoted_attribute(target));
    }
    let _ = write!(html, ">{}</a>", first_child(element, options));
    html
}

/// Plain text of a code block; `br` counts as a newline.
fn code_text(element: &Element) -> String {
    let mut out = String::new();
    collect_code_text(element, &mut out);
    out
}

fn collect_code_text(element: &Element, out: &mut String) {
    for child in &element.children {
        match child {
            Node::Text(text) => out.push_str(text),
            Node::Element(inner) if inner.tag == Tag::Br => out.push('\n'),
            Node::Element(inner) => collect_code_text(inner, out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(nodes: &[Node]) -> String {
        to_html(nodes, &Options::default())
    }

    fn el(tag: Tag) -> Element {
        Element::new(tag)
    }

    #[test]
    fn test_paragraph_folds_children() {
        let p = el(Tag::P)
            .with_child("Hello ")
            .with_child(el(Tag::Strong).with_child("bold"))
            .with_child(el(Tag::Br));
        assert_eq!(render(&[p.into()]), "<p>Hello <strong>bold</strong><br></p>");
    }

    #[test]
    fn test_headings_shift_up() {
        let nodes = vec![
            el(Tag::H3).with_child("Title").into(),
            el(Tag::H4).with_child("Sub").into(),
        ];
        assert_eq!(render(&nodes), "<h2>Title</h2><h3>Sub</h3>");
    }

    #[test]
    fn test_image_figure_with_caption() {
        let figure = el(Tag::Figure)
            .with_child(el(Tag::Img).with_attr("src", "/file/x.jpg"))
            .with_child(el(Tag::Figcaption).with_child("Cap"));
        assert_eq!(
            render(&[figure.into()]),
            r#"<div><img src="https://telegra.ph/file/x.jpg" /><br><em>Cap</em></div>"#
        );
    }

    #[test]
    fn test_video_figure() {
        let figure = el(Tag::Figure).with_child(el(Tag::Video).with_attr("src", "/file/v.mp4"));
        assert_eq!(
            render(&[figure.into()]),
            r#"<div><a href="https://telegra.ph/file/v.mp4">https://telegra.ph/file/v.mp4</a></div>"#
        );
    }

    #[test]
    fn test_iframe_figure_decodes_original_url() {
        let figure = el(Tag::Figure).with_child(
            el(Tag::Iframe).with_attr("src", "/embed/youtube?url=https%3A%2F%2Fyoutu.be%2Fabc123"),
        );
        assert_eq!(
            render(&[figure.into()]),
            r#"<div><a href="https://youtu.be/abc123">https://youtu.be/abc123</a></div>"#
        );
    }

    #[test]
    fn test_iframe_with_broken_src_degrades_to_empty_link() {
        let figure = el(Tag::Figure).with_child(el(Tag::Iframe).with_attr("src", "/embed/youtube"));
        assert_eq!(render(&[figure.into()]), r#"<div><a href=""></a></div>"#);
    }

    #[test]
    fn test_figure_without_children_or_caption() {
        assert_eq!(render(&[el(Tag::Figure).into()]), "<div></div>");
        let empty_caption = el(Tag::Figure)
            .with_child(el(Tag::Img).with_attr("src", "/a.png"))
            .with_child(el(Tag::Figcaption));
        assert_eq!(
            render(&[empty_caption.into()]),
            r#"<div><img src="https://telegra.ph/a.png" /></div>"#
        );
    }

    #[test]
    fn test_lists_wrap_items() {
        let ul = el(Tag::Ul)
            .with_child(el(Tag::Li).with_child("one"))
            .with_child("\n")
            .with_child(el(Tag::Li).with_child("two ").with_child(el(Tag::Em).with_child("em")));
        assert_eq!(render(&[ul.into()]), "<ul><li>one</li><li>two <em>em</em></li></ul>");
        let ol = el(Tag::Ol).with_child(el(Tag::Li).with_child("first"));
        assert_eq!(render(&[ol.into()]), "<ol><li>first</li></ol>");
    }

    #[test]
    fn test_blockquote_hard_breaks_and_blank_lines() {
        let quote = el(Tag::Blockquote).with_child("line one\n\nline two");
        assert_eq!(render(&[quote.into()]), "<blockquote>line one  \nline two</blockquote>");
    }

    #[test]
    fn test_link_emits_href_and_target() {
        let a = el(Tag::A)
            .with_attr("href", "https://example.com")
            .with_attr("target", "_blank")
            .with_child("ex");
        assert_eq!(
            render(&[a.into()]),
            r#"<a href="https://example.com" target="_blank">ex</a>"#
        );
        let bare = el(Tag::A).with_attr("href", "/x").with_child("x");
        assert_eq!(render(&[bare.into()]), r#"<a href="/x">x</a>"#);
    }

    #[test]
    fn test_code_is_escaped() {
        let code = el(Tag::Code).with_child("if a < b && c > d {}");
        assert_eq!(
            render(&[el(Tag::P).with_child(code).into()]),
            "<p><pre>if a &lt; b &amp;&amp; c &gt; d {}</pre></p>"
        );
    }

    #[test]
    fn test_code_breaks_become_newlines() {
        let code = el(Tag::Code)
            .with_child("a")
            .with_child(el(Tag::Br))
            .with_child("b");
        assert_eq!(render(&[code.into()]), "<pre>a\nb</pre>");
    }

    #[test]
    fn test_unknown_tag_renders_first_child() {
        let aside = el(Tag::Aside).with_child("side").with_child("ignored");
        assert_eq!(render(&[aside.into()]), "side");
        assert_eq!(render(&[el(Tag::Other("table".to_string())).into()]), "");
    }

    #[test]
    fn test_top_level_nodes_concatenate() {
        let nodes = vec![
            el(Tag::P).with_child("a").into(),
            Node::from("loose"),
            el(Tag::P).with_child("b").into(),
        ];
        assert_eq!(render(&nodes), "<p>a</p>loose<p>b</p>");
    }

    #[test]
    fn test_custom_base_url() {
        let options = Options {
            base_url: "https://mirror.example".to_string(),
            ..Options::default()
        };
        let figure = el(Tag::Figure).with_child(el(Tag::Img).with_attr("src", "/file/x.jpg"));
        assert_eq!(
            to_html(&[figure.into()], &options),
            r#"<div><img src="https://mirror.example/file/x.jpg" /></div>"#
        );
    }
}
