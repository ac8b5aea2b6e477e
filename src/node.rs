//! Output node model.
//!
//! The JSON tree accepted by the publishing API: each node is either a raw
//! string or an object with `tag`, optional `attrs` and optional `children`.
//! Empty `attrs`/`children` are never written, because the remote schema
//! treats an empty container differently from a missing one.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Tag of an output element.
///
/// Every tag the publishing service accepts has its own variant; anything
/// else is carried verbatim in [`Tag::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tag {
    P,
    H3,
    H4,
    A,
    Strong,
    Em,
    Br,
    Code,
    Figure,
    Figcaption,
    Img,
    Video,
    Iframe,
    Ul,
    Ol,
    Li,
    Blockquote,
    Hr,
    Aside,
    B,
    I,
    U,
    S,
    Pre,
    /// Pass-through tag outside the service vocabulary.
    Other(String),
}

impl Tag {
    /// Map a tag name to its variant.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "p" => Self::P,
            "h3" => Self::H3,
            "h4" => Self::H4,
            "a" => Self::A,
            "strong" => Self::Strong,
            "em" => Self::Em,
            "br" => Self::Br,
            "code" => Self::Code,
            "figure" => Self::Figure,
            "figcaption" => Self::Figcaption,
            "img" => Self::Img,
            "video" => Self::Video,
            "iframe" => Self::Iframe,
            "ul" => Self::Ul,
            "ol" => Self::Ol,
            "li" => Self::Li,
            "blockquote" => Self::Blockquote,
            "hr" => Self::Hr,
            "aside" => Self::Aside,
            "b" => Self::B,
            "i" => Self::I,
            "u" => Self::U,
            "s" => Self::S,
            "pre" => Self::Pre,
            other => Self::Other(other.to_string()),
        }
    }

    /// Tag name as written in JSON.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::P => "p",
            Self::H3 => "h3",
            Self::H4 => "h4",
            Self::A => "a",
            Self::Strong => "strong",
            Self::Em => "em",
            Self::Br => "br",
            Self::Code => "code",
            Self::Figure => "figure",
            Self::Figcaption => "figcaption",
            Self::Img => "img",
            Self::Video => "video",
            Self::Iframe => "iframe",
            Self::Ul => "ul",
            Self::Ol => "ol",
            Self::Li => "li",
            Self::Blockquote => "blockquote",
            Self::Hr => "hr",
            Self::Aside => "aside",
            Self::B => "b",
            Self::I => "i",
            Self::U => "u",
            Self::S => "s",
            Self::Pre => "pre",
            Self::Other(name) => name,
        }
    }

    /// Media element that can head a figure.
    #[must_use]
    pub fn is_media(&self) -> bool {
        matches!(self, Self::Img | Self::Video | Self::Iframe)
    }

    /// Part of the publishing service vocabulary.
    #[must_use]
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Tag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Tag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::from_name(&name))
    }
}

/// Element node: tag, attributes and children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub tag: Tag,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Element {
    /// Create an element without attributes or children.
    #[must_use]
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            attrs: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute setter.
    #[must_use]
    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    /// Builder-style child appender.
    #[must_use]
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Get an attribute value.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }
}

/// A node of the output tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Text(String),
    Element(Element),
}

impl Node {
    /// Element payload, `None` for text.
    #[must_use]
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(element) => Some(element),
            Self::Text(_) => None,
        }
    }

    /// Text payload, `None` for elements.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Element(_) => None,
        }
    }

    /// Tag of an element node.
    #[must_use]
    pub fn tag(&self) -> Option<&Tag> {
        self.as_element().map(|e| &e.tag)
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}
