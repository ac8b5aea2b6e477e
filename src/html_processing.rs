//! HTML Normalization
//!
//! Rewrites editor HTML into the canonical subset the translator expects:
//! no `span` wrappers, no inline styles, `div` only for media figures and
//! `p` for everything else. Each pass is a no-op for elements that do not
//! meet its precondition, so odd editor markup never aborts the pipeline.
//!
//! Passes run in a fixed order; later passes rely on the earlier ones:
//!
//! 1. flatten `div`/`span` wrappers inside single-child `pre`/`code`
//! 2. styled `span` to `em`/`strong`
//! 3. unwrap every remaining `span`
//! 4. drop `style` attributes
//! 5. remove the placeholder line break between media and caption
//! 6. `div` to `p` unless it is a figure candidate
//! 7. promote paragraphs holding a bare media URL to figure candidates

use crate::dom::{Attribute, NodeId, Tree};
use crate::patterns::{find_media_url, has_media_marker};

/// Elements whose start tag closes an open `<p>` in an HTML5 parser. A
/// non-figure `div` with any of these below it is unwrapped rather than
/// turned into a paragraph.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "center", "dd", "details", "dialog", "dir",
    "div", "dl", "dt", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3",
    "h4", "h5", "h6", "header", "hgroup", "hr", "li", "listing", "main", "menu", "nav", "ol",
    "p", "plaintext", "pre", "search", "section", "summary", "table", "ul", "xmp",
];

/// Normalize an HTML string.
#[must_use]
pub fn normalize(html: &str) -> String {
    let mut tree = Tree::parse(html);
    normalize_tree(&mut tree);
    let out = tree.html();
    log::debug!("normalize: {} bytes in, {} bytes out", html.len(), out.len());
    out
}

/// Run every normalization pass over a parsed tree, in place.
pub fn normalize_tree(tree: &mut Tree) {
    flatten_code_blocks(tree);
    convert_styled_spans(tree);
    unwrap_spans(tree);
    strip_style_attributes(tree);
    clean_figure_breaks(tree);
    convert_divs(tree);
    promote_media_paragraphs(tree);
}

/// Check if an element holds media directly: an `img`, a link to a media
/// URL, or text mentioning one.
#[must_use]
pub fn is_figure_candidate(tree: &Tree, id: NodeId) -> bool {
    tree.children(id).iter().any(|&child| {
        if tree.is_element(child, "img") {
            return true;
        }
        if tree.is_element(child, "a") {
            return tree.attr(child, "href").is_some_and(has_media_marker);
        }
        tree.text(child).is_some_and(has_media_marker)
    })
}

// === Passes ===

/// Strip `div`/`span` wrappers out of code blocks.
fn flatten_code_blocks(tree: &mut Tree) {
    for block in tree.find_all(&["pre", "code"]) {
        if tree.children(block).len() != 1 {
            log::trace!("code block with {} children left as is", tree.children(block).len());
            continue;
        }
        let flat = flatten_wrappers(tree, block);
        tree.set_children(block, flat);
    }
}

fn flatten_wrappers(tree: &Tree, id: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    for &child in tree.children(id) {
        if tree.is_element(child, "div") || tree.is_element(child, "span") {
            out.extend(flatten_wrappers(tree, child));
        } else {
            out.push(child);
        }
    }
    out
}

/// Turn `font-style: italic` spans into `em` and `font-weight: bold`
/// spans into `strong`.
fn convert_styled_spans(tree: &mut Tree) {
    for span in tree.find_all(&["span"]) {
        let Some(style) = tree.attr(span, "style") else {
            continue;
        };
        let tag = match declaration(style) {
            "font-style: italic" => "em",
            "font-weight: bold" => "strong",
            _ => continue,
        };
        tree.rename(span, tag);
        tree.remove_attr(span, "style");
    }
}

/// A single declaration without surrounding whitespace and its `;`.
/// Spacing and case inside are left as written.
fn declaration(style: &str) -> &str {
    let style = style.trim();
    style.strip_suffix(';').unwrap_or(style).trim_end()
}

fn unwrap_spans(tree: &mut Tree) {
    for span in tree.find_all(&["span"]) {
        tree.unwrap(span);
    }
}

fn strip_style_attributes(tree: &mut Tree) {
    for id in tree.descendants(NodeId::ROOT) {
        tree.remove_attr(id, "style");
    }
}

/// Editors put a blank-line `br` between a media element and its caption.
/// Inside a figure candidate the second child is that placeholder.
fn clean_figure_breaks(tree: &mut Tree) {
    for br in tree.find_all(&["br"]) {
        let Some(parent) = tree.parent(br) else {
            continue;
        };
        if parent == NodeId::ROOT || !is_figure_candidate(tree, parent) {
            continue;
        }
        if let Some(&second) = tree.children(parent).get(1) {
            tree.detach(second);
        }
    }
}

fn convert_divs(tree: &mut Tree) {
    for div in tree.find_all(&["div"]) {
        if tree.parent(div).is_none() {
            continue;
        }
        if is_figure_candidate(tree, div) {
            promote_media_text(tree, div);
        } else if has_block_descendant(tree, div) {
            tree.unwrap(div);
        } else {
            let p = tree.new_element("p", Vec::new());
            let children = tree.children(div).to_vec();
            tree.set_children(p, children);
            tree.replace(div, p);
        }
    }
}

fn has_block_descendant(tree: &Tree, id: NodeId) -> bool {
    tree.descendants(id)
        .into_iter()
        .any(|c| tree.name(c).is_some_and(|name| BLOCK_TAGS.contains(&name)))
}

/// Anchors do not nest, so nothing inside one is promoted to a link.
fn inside_link(tree: &Tree, id: NodeId) -> bool {
    let mut current = tree.parent(id);
    while let Some(node) = current {
        if tree.is_element(node, "a") {
            return true;
        }
        current = tree.parent(node);
    }
    false
}

fn promote_media_paragraphs(tree: &mut Tree) {
    for p in tree.find_all(&["p"]) {
        promote_media_text(tree, p);
    }
}

/// Replace `id` with a `div` in which every text child mentioning a media
/// URL becomes a link to that URL. Other children move over unchanged.
fn promote_media_text(tree: &mut Tree, id: NodeId) {
    if inside_link(tree, id) {
        log::trace!("media text inside a link left as is");
        return;
    }
    let has_media_text = tree
        .children(id)
        .iter()
        .any(|&c| tree.text(c).is_some_and(has_media_marker));
    if !has_media_text {
        return;
    }

    let mut children = Vec::new();
    for child in tree.children(id).to_vec() {
        let url = tree
            .text(child)
            .filter(|text| has_media_marker(text))
            .map(|text| find_media_url(text).unwrap_or(text.trim()).to_string());
        match url {
            Some(url) => {
                let a = tree.new_element(
                    "a",
                    vec![Attribute {
                        name: "href".to_string(),
                        value: url.clone(),
                    }],
                );
                let text = tree.new_text(&url);
                tree.append(a, text);
                children.push(a);
            }
            None => children.push(child),
        }
    }

    let div = tree.new_element("div", Vec::new());
    tree.set_children(div, children);
    tree.replace(id, div);
}
