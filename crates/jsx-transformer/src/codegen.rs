//! JSX serialization and component scaffolding.

use crate::error::GenerationError;
use crate::naming::is_valid_identifier;
use crate::options::{ConversionOptions, ExportStyle, QuoteStyle};
use svg_parser::{Comment, Element, Node};

/// Indentation used while generating; the postprocessor re-indents.
const INDENT: &str = "  ";

/// Elements whose text content is emitted as a template literal.
const RAW_TEXT_ELEMENTS: &[&str] = &["style", "script"];

/// Elements where whitespace between child elements is rendered.
const TEXT_CONTENT_ELEMENTS: &[&str] = &["text", "tspan", "textPath"];

/// Generates the component source for a transformed tree.
///
/// The output is laid out one element per line with two-space indentation
/// and no trailing newline.
pub fn generate(
    root: &Element,
    component_name: &str,
    options: &ConversionOptions,
) -> Result<String, GenerationError> {
    if root.name != "svg" {
        return Err(GenerationError::MissingSvgRoot {
            found: root.name.to_string(),
        });
    }
    check_identifier(component_name)?;
    if let Some(export_name) = options.export_name() {
        check_identifier(export_name)?;
    }

    let mut markup = String::new();
    JsxWriter::new(options).write_element(&mut markup, root, 2, true);

    let props_type = if options.typescript {
        ": React.SVGProps<SVGSVGElement>"
    } else {
        ""
    };
    let (memo_open, memo_close) = if options.memo {
        ("memo(", ")")
    } else {
        ("", "")
    };
    let component = format!(
        "{memo_open}(props{props_type}) => {{\n{INDENT}return (\n{markup}{INDENT});\n}}{memo_close}"
    );

    let export = export_statement(component_name, &component, options);
    let imports = imports(options);

    tracing::debug!(
        component = component_name,
        export_style = ?options.export_style,
        "generated component"
    );

    if imports.is_empty() {
        Ok(export)
    } else {
        Ok(format!("{}\n\n{}", imports.join("\n"), export))
    }
}

fn check_identifier(name: &str) -> Result<(), GenerationError> {
    if is_valid_identifier(name) {
        Ok(())
    } else {
        Err(GenerationError::InvalidComponentName {
            name: name.to_string(),
        })
    }
}

fn imports(options: &ConversionOptions) -> Vec<&'static str> {
    let mut imports = Vec::new();
    if options.omit_imports {
        return imports;
    }
    if options.typescript {
        imports.push("import React from 'react';");
    }
    if options.memo {
        imports.push("import { memo } from 'react';");
    }
    imports
}

fn export_statement(component_name: &str, component: &str, options: &ConversionOptions) -> String {
    match options.export_style {
        ExportStyle::Const => {
            let name = options.export_name().unwrap_or(component_name);
            format!("export const {name} = {component};")
        }
        ExportStyle::Default => format!("export default {component};"),
        ExportStyle::Named => {
            let export_clause = match options.export_name() {
                Some(export_name) if export_name != component_name => {
                    format!("{component_name} as {export_name}")
                }
                _ => component_name.to_string(),
            };
            format!("const {component_name} = {component};\n\nexport {{ {export_clause} }};")
        }
    }
}

/// Serializes elements as JSX.
struct JsxWriter {
    quote: QuoteStyle,
    pass_props: bool,
}

impl JsxWriter {
    fn new(options: &ConversionOptions) -> Self {
        Self {
            quote: options.quote_style,
            pass_props: options.pass_props,
        }
    }

    /// Writes an element and its subtree, one node per line.
    fn write_element(&self, out: &mut String, element: &Element, depth: usize, is_root: bool) {
        let indent = INDENT.repeat(depth);

        // Text is whitespace-sensitive in JSX, so such elements stay on one line.
        if element.has_text_content() || renders_whitespace(element) {
            out.push_str(&indent);
            self.write_inline(out, element, is_root);
            out.push('\n');
            return;
        }

        let children: Vec<&Node> = element
            .children
            .iter()
            .filter(|child| !matches!(child, Node::Text(_)))
            .collect();

        out.push_str(&indent);
        self.write_open_tag(out, element, is_root);
        if element.self_closing || children.is_empty() {
            out.push_str(" />\n");
            return;
        }
        out.push_str(">\n");

        for child in children {
            match child {
                Node::Element(el) => self.write_element(out, el, depth + 1, false),
                Node::Comment(comment) => {
                    out.push_str(&INDENT.repeat(depth + 1));
                    out.push_str(&jsx_comment(comment));
                    out.push('\n');
                }
                Node::Text(_) => {}
            }
        }

        out.push_str(&indent);
        out.push_str("</");
        out.push_str(&element.name);
        out.push_str(">\n");
    }

    /// Writes an element and its subtree without line breaks.
    fn write_inline(&self, out: &mut String, element: &Element, is_root: bool) {
        self.write_open_tag(out, element, is_root);
        if element.self_closing || element.children.is_empty() {
            out.push_str(" />");
            return;
        }
        out.push('>');

        if RAW_TEXT_ELEMENTS.contains(&element.name.as_str()) {
            let text: String = element
                .children
                .iter()
                .filter_map(|child| match child {
                    Node::Text(text) if text.cdata => Some(text.data.clone()),
                    Node::Text(text) => Some(decode_xml_entities(&text.data)),
                    _ => None,
                })
                .collect();
            out.push_str(&template_literal(&text));
        } else {
            let last = element.children.len().saturating_sub(1);
            for (index, child) in element.children.iter().enumerate() {
                match child {
                    // Line-broken indentation at the edges is layout, not content.
                    Node::Text(text)
                        if (index == 0 || index == last)
                            && text.is_whitespace()
                            && text.data.contains(['\n', '\r']) => {}
                    Node::Element(el) => self.write_inline(out, el, false),
                    Node::Text(text) => out.push_str(&escape_text(&text.data, text.cdata)),
                    Node::Comment(comment) => out.push_str(&jsx_comment(comment)),
                }
            }
        }

        out.push_str("</");
        out.push_str(&element.name);
        out.push('>');
    }

    fn write_open_tag(&self, out: &mut String, element: &Element, is_root: bool) {
        out.push('<');
        out.push_str(&element.name);
        for (name, value) in element.attributes.iter() {
            out.push(' ');
            out.push_str(&format_attribute(name, value, self.quote));
        }
        if is_root && self.pass_props {
            out.push_str(" {...props}");
        }
    }
}

/// Returns true for a text container whose children are separated by
/// whitespace, which must survive as a space between inline siblings.
fn renders_whitespace(element: &Element) -> bool {
    TEXT_CONTENT_ELEMENTS.contains(&element.name.as_str())
        && element
            .children
            .iter()
            .any(|child| matches!(child, Node::Text(_)))
}

/// Formats one attribute.
///
/// Values take the preferred quote unless they contain it. Values that no
/// JSX string can hold verbatim (both quotes, backslashes, line breaks) become
/// a JSON string in an expression container.
fn format_attribute(name: &str, value: Option<&str>, quote: QuoteStyle) -> String {
    let Some(value) = value else {
        return name.to_string();
    };

    let needs_expression = value.contains(['\\', '\n', '\r'])
        || (value.contains('"') && value.contains('\''));
    if needs_expression {
        let literal = serde_json::Value::String(value.to_string());
        return format!("{name}={{{literal}}}");
    }

    let quote = if value.contains(quote.as_char()) {
        quote.other()
    } else {
        quote
    };
    let q = quote.as_char();
    format!("{name}={q}{value}{q}")
}

fn jsx_comment(comment: &Comment) -> String {
    let text = comment.data.trim().replace("*/", "* /");
    if text.is_empty() {
        "{/* */}".to_string()
    } else {
        format!("{{/* {text} */}}")
    }
}

/// Escapes text content for JSX.
///
/// Whitespace runs containing a line break collapse to one space; characters
/// JSX text cannot hold, and quotes, become entities.
fn escape_text(data: &str, cdata: bool) -> String {
    let mut out = String::with_capacity(data.len());
    let mut chars = data.chars().peekable();

    while let Some(c) = chars.next() {
        if c.is_whitespace() {
            let mut run = String::from(c);
            while let Some(&next) = chars.peek() {
                if !next.is_whitespace() {
                    break;
                }
                run.push(next);
                chars.next();
            }
            if run.contains(['\n', '\r']) {
                out.push(' ');
            } else {
                out.push_str(&run);
            }
            continue;
        }

        match c {
            '{' => out.push_str("&#123;"),
            '}' => out.push_str("&#125;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '`' => out.push_str("&#96;"),
            '&' if cdata => out.push_str("&amp;"),
            '<' if cdata => out.push_str("&lt;"),
            _ => out.push(c),
        }
    }

    out
}

fn decode_xml_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Wraps raw text in a single-line template literal expression.
fn template_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 4);
    out.push_str("{`");
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            '`' => out.push_str("\\`"),
            '$' if chars.peek() == Some(&'{') => out.push_str("\\$"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out.push_str("`}");
    out
}
