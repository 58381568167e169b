//! Element tree types for parsed SVG.
//!
//! The tree is a strict ownership tree: the parser builds it, the transformer
//! mutates it in place, and the code generator reads it.

use crate::error::ParseError;
use crate::span::Span;
use indexmap::IndexMap;
use smol_str::SmolStr;

/// Void elements: never have children and are always emitted self-closing.
///
/// The HTML void set plus the SVG shape elements that are conventionally
/// written without content.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr", "circle", "ellipse", "line", "path", "polygon", "polyline", "rect", "stop",
    "use",
];

/// Returns true if the given element name is a void element (case-insensitive).
pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.iter().any(|void| void.eq_ignore_ascii_case(name))
}

/// A parsed SVG document.
#[derive(Debug, Clone)]
pub struct SvgDocument {
    /// The root `<svg>` element.
    pub root: Element,
    /// Malformations the parser recovered from.
    pub recovered: Vec<ParseError>,
}

/// A node in the element tree.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "camelCase"))]
pub enum Node {
    /// An element.
    Element(Element),
    /// Character data.
    Text(Text),
    /// A comment.
    Comment(Comment),
}

impl Node {
    /// Returns the span of this node.
    pub fn span(&self) -> Span {
        match self {
            Node::Element(el) => el.span,
            Node::Text(text) => text.span,
            Node::Comment(comment) => comment.span,
        }
    }

    /// Returns the element if this node is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }
}

/// An element with its attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Element {
    /// The span of the element, from `<` to the end of its closing tag.
    pub span: Span,
    /// The tag name, case preserved.
    pub name: SmolStr,
    /// Attributes in source order.
    pub attributes: Attributes,
    /// Child nodes.
    pub children: Vec<Node>,
    /// Whether the element is written as `<name ... />`.
    pub self_closing: bool,
}

impl Element {
    /// Creates an empty element with no source position.
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            span: Span::default(),
            name: name.into(),
            attributes: Attributes::default(),
            children: Vec::new(),
            self_closing: false,
        }
    }

    /// Returns true if this is a void element.
    pub fn is_void(&self) -> bool {
        is_void_element(&self.name)
    }

    /// Returns the value of an attribute, if present and valued.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).flatten()
    }

    /// Iterates over child elements, skipping text and comments.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Returns true if any child is text with non-whitespace content.
    pub fn has_text_content(&self) -> bool {
        self.children
            .iter()
            .any(|child| matches!(child, Node::Text(text) if !text.is_whitespace()))
    }
}

/// Ordered attribute list with unique names.
///
/// A value of `None` is a bare attribute (`<svg focusable>`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Attributes(IndexMap<SmolStr, Option<String>>);

impl Attributes {
    /// Creates an empty attribute list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no attributes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if an attribute with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Looks up an attribute. The outer `Option` is presence, the inner is the value.
    pub fn get(&self, name: &str) -> Option<Option<&str>> {
        self.0.get(name).map(|value| value.as_deref())
    }

    /// Appends an attribute.
    ///
    /// Returns `false` and leaves the list unchanged if the name already exists.
    pub fn insert(&mut self, name: impl Into<SmolStr>, value: Option<String>) -> bool {
        let name = name.into();
        if self.0.contains_key(&name) {
            return false;
        }
        self.0.insert(name, value);
        true
    }

    /// Removes an attribute, preserving the order of the rest.
    pub fn remove(&mut self, name: &str) -> Option<Option<String>> {
        self.0.shift_remove(name)
    }

    /// Renames attributes in place, keeping their positions.
    ///
    /// `rename` returns the new name, or `None` to keep the current one. When
    /// a new name is already taken by an earlier attribute, the later one is
    /// dropped; the dropped names are returned.
    pub fn rename_with(&mut self, mut rename: impl FnMut(&str) -> Option<SmolStr>) -> Vec<SmolStr> {
        let mut renamed = IndexMap::with_capacity(self.0.len());
        let mut dropped = Vec::new();

        for (name, value) in self.0.drain(..) {
            let new_name = rename(&name).unwrap_or_else(|| name.clone());
            if renamed.contains_key(&new_name) {
                dropped.push(name);
                continue;
            }
            renamed.insert(new_name, value);
        }

        self.0 = renamed;
        dropped
    }

    /// Iterates over `(name, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.0
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_deref()))
    }

    /// Iterates over attribute names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(SmolStr::as_str)
    }
}

impl<N: Into<SmolStr>> FromIterator<(N, Option<String>)> for Attributes {
    fn from_iter<T: IntoIterator<Item = (N, Option<String>)>>(iter: T) -> Self {
        let mut attributes = Attributes::new();
        for (name, value) in iter {
            attributes.insert(name, value);
        }
        attributes
    }
}

/// Character data inside an element.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Text {
    /// The span of the text (for CDATA, including the delimiters).
    pub span: Span,
    /// The raw text, entities left as written.
    pub data: String,
    /// Whether the text came from a `<![CDATA[...]]>` section.
    pub cdata: bool,
}

impl Text {
    /// Returns true if the text consists only of whitespace.
    pub fn is_whitespace(&self) -> bool {
        self.data.chars().all(char::is_whitespace)
    }
}

/// A comment node.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Comment {
    /// The span of the comment including `<!--` and `-->`.
    pub span: Span,
    /// The comment body, untrimmed.
    pub data: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_void_elements_case_insensitive() {
        assert!(is_void_element("path"));
        assert!(is_void_element("BR"));
        assert!(is_void_element("Rect"));
        assert!(!is_void_element("g"));
        assert!(!is_void_element("svg"));
    }

    #[test]
    fn test_attributes_keep_first_duplicate() {
        let mut attributes = Attributes::new();
        assert!(attributes.insert("fill", Some("red".to_string())));
        assert!(!attributes.insert("fill", Some("blue".to_string())));
        assert_eq!(attributes.get("fill"), Some(Some("red")));
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut attributes: Attributes = [
            ("a", Some("1".to_string())),
            ("id", Some("x".to_string())),
            ("b", None),
        ]
        .into_iter()
        .collect();
        attributes.remove("id");
        assert_eq!(attributes.names().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_rename_with_keeps_positions() {
        let mut attributes: Attributes = [
            ("class", Some("c".to_string())),
            ("stroke-width", Some("2".to_string())),
            ("d", Some("M0 0".to_string())),
        ]
        .into_iter()
        .collect();
        let dropped = attributes.rename_with(|name| match name {
            "class" => Some("className".into()),
            "stroke-width" => Some("strokeWidth".into()),
            _ => None,
        });
        assert!(dropped.is_empty());
        assert_eq!(
            attributes.names().collect::<Vec<_>>(),
            vec!["className", "strokeWidth", "d"]
        );
    }

    #[test]
    fn test_rename_collision_drops_later() {
        let mut attributes: Attributes = [
            ("strokeWidth", Some("1".to_string())),
            ("stroke-width", Some("2".to_string())),
        ]
        .into_iter()
        .collect();
        let dropped = attributes.rename_with(|name| {
            (name == "stroke-width").then(|| SmolStr::new("strokeWidth"))
        });
        assert_eq!(dropped, vec![SmolStr::new("stroke-width")]);
        assert_eq!(attributes.get("strokeWidth"), Some(Some("1")));
        assert_eq!(attributes.len(), 1);
    }

    #[test]
    fn test_has_text_content() {
        let mut el = Element::new("text");
        el.children.push(Node::Text(Text {
            span: Span::default(),
            data: "  \n ".to_string(),
            cdata: false,
        }));
        assert!(!el.has_text_content());
        el.children.push(Node::Text(Text {
            span: Span::default(),
            data: "Hi".to_string(),
            cdata: false,
        }));
        assert!(el.has_text_content());
    }
}
