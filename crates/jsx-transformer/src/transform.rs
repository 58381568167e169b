//! In-place tree rewriting to JSX conventions.

use crate::attributes::jsx_attribute_name;
use crate::options::ConversionOptions;
use smol_str::SmolStr;
use svg_parser::{Element, Node};

/// Per-request inputs to the transformer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransformContext {
    /// Strip `id` attributes from every element.
    pub remove_ids: bool,
}

impl TransformContext {
    /// Builds the context for a request.
    ///
    /// `optimized` is true only when the optimizer ran successfully on this
    /// input, in which case its own id cleanup is trusted and ids are kept.
    pub fn new(options: &ConversionOptions, optimized: bool) -> Self {
        Self {
            remove_ids: options.remove_ids && !optimized,
        }
    }
}

/// Rewrites `element` and its descendants for JSX.
///
/// - attribute names are mapped to their JSX spelling (`class` → `className`)
/// - `id` attributes are removed when the context asks for it
/// - void elements are marked self-closing and lose their children
///
/// Comments and text are left untouched. Applying it twice is the same as
/// applying it once.
pub fn transform(element: &mut Element, context: &TransformContext) {
    if context.remove_ids {
        element.attributes.remove("id");
    }

    let dropped = element
        .attributes
        .rename_with(|name| jsx_attribute_name(name).map(SmolStr::new_static));
    for name in dropped {
        tracing::debug!(
            element = %element.name,
            attribute = %name,
            "dropping attribute that collides with an existing JSX name"
        );
    }

    if element.is_void() {
        element.self_closing = true;
        element.children.clear();
    }

    for child in &mut element.children {
        if let Node::Element(child) = child {
            transform(child, context);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use svg_parser::parse;

    fn names(element: &Element) -> Vec<&str> {
        element.attributes.names().collect()
    }

    #[test]
    fn test_renames_attributes_recursively() {
        let mut doc = parse(
            r#"<svg class="icon"><g fill-rule="evenodd"><path stroke-width="2" d="M0"/></g></svg>"#,
        )
        .unwrap();
        transform(&mut doc.root, &TransformContext::default());

        assert_eq!(names(&doc.root), vec!["className"]);
        let g = doc.root.child_elements().next().unwrap();
        assert_eq!(names(g), vec!["fillRule"]);
        let path = g.child_elements().next().unwrap();
        assert_eq!(names(path), vec!["strokeWidth", "d"]);
        assert_eq!(path.attr("strokeWidth"), Some("2"));
    }

    #[test]
    fn test_removes_ids_everywhere() {
        let mut doc = parse(r#"<svg id="a"><g id="b"><rect id="c" x="1"/></g></svg>"#).unwrap();
        transform(&mut doc.root, &TransformContext { remove_ids: true });

        assert!(!doc.root.attributes.contains("id"));
        let g = doc.root.child_elements().next().unwrap();
        assert!(!g.attributes.contains("id"));
        let rect = g.child_elements().next().unwrap();
        assert_eq!(names(rect), vec!["x"]);
    }

    #[test]
    fn test_ids_kept_after_successful_optimization() {
        let options = ConversionOptions {
            remove_ids: true,
            ..ConversionOptions::default()
        };
        assert!(!TransformContext::new(&options, true).remove_ids);
        assert!(TransformContext::new(&options, false).remove_ids);
    }

    #[test]
    fn test_void_elements_marked_self_closing() {
        let mut root = Element::new("svg");
        let mut path = Element::new("path");
        path.children.push(Node::Element(Element::new("title")));
        root.children.push(Node::Element(path));

        transform(&mut root, &TransformContext::default());

        let path = root.child_elements().next().unwrap();
        assert!(path.self_closing);
        assert!(path.children.is_empty());
    }

    #[test]
    fn test_comments_untouched() {
        let mut doc = parse("<svg><!--  keep me  --></svg>").unwrap();
        transform(&mut doc.root, &TransformContext::default());
        match &doc.root.children[0] {
            Node::Comment(comment) => assert_eq!(comment.data, "  keep me  "),
            other => panic!("Expected Comment, got {other:?}"),
        }
    }

    #[test]
    fn test_idempotent() {
        let source = r##"<svg class="a" xmlns:xlink="x"><use xlink:href="#p" id="u"/><circle stroke-width="1"></circle></svg>"##;
        let context = TransformContext { remove_ids: true };

        let mut once = parse(source).unwrap();
        transform(&mut once.root, &context);
        let mut twice = once.clone();
        transform(&mut twice.root, &context);

        assert_eq!(once.root, twice.root);
    }

    #[test]
    fn test_collision_keeps_first() {
        let mut doc = parse(r#"<svg strokeWidth="1" stroke-width="2"></svg>"#).unwrap();
        transform(&mut doc.root, &TransformContext::default());
        assert_eq!(names(&doc.root), vec!["strokeWidth"]);
        assert_eq!(doc.root.attr("strokeWidth"), Some("1"));
    }
}
