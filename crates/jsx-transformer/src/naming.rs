//! Component naming and output file conventions.

use crate::options::ConversionOptions;
use std::path::Path;

/// Name used when no better one is known.
pub const DEFAULT_COMPONENT_NAME: &str = "MyIcon";

/// Reserved words that cannot name a component.
const RESERVED_WORDS: &[&str] = &[
    "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default",
    "delete", "do", "else", "enum", "export", "extends", "false", "finally", "for", "function",
    "if", "implements", "import", "in", "instanceof", "interface", "let", "new", "null",
    "package", "private", "protected", "public", "return", "static", "super", "switch", "this",
    "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield",
];

/// Derives a PascalCase component name from a file path.
///
/// `arrow-left.svg` becomes `ArrowLeft`; names starting with a digit get an
/// `Svg` prefix (`24px-add.svg` → `Svg24pxAdd`).
pub fn component_name_from_path(path: impl AsRef<Path>) -> String {
    let stem = path
        .as_ref()
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();

    sanitize_component_name(stem)
}

/// Converts an arbitrary string into a PascalCase identifier.
/// - Separators (`-`, `_`, `.`, whitespace) start a new word
/// - Other invalid characters are dropped
fn sanitize_component_name(name: &str) -> String {
    let mut result = String::with_capacity(name.len() + 3);
    let mut capitalize_next = true;

    for c in name.chars() {
        if c.is_alphanumeric() {
            if capitalize_next {
                result.extend(c.to_uppercase());
                capitalize_next = false;
            } else {
                result.push(c);
            }
        } else if matches!(c, '-' | '_' | '.') || c.is_whitespace() {
            capitalize_next = true;
        }
    }

    match result.chars().next() {
        None => DEFAULT_COMPONENT_NAME.to_string(),
        Some(first) if first.is_numeric() => format!("Svg{result}"),
        Some(_) => result,
    }
}

/// Returns true if `name` can be used as a JavaScript binding name.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };

    (first.is_alphabetic() || first == '_' || first == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        && !RESERVED_WORDS.contains(&name)
}

/// File extension for the generated component: `tsx` or `jsx`.
pub fn output_extension(options: &ConversionOptions) -> &'static str {
    if options.typescript {
        "tsx"
    } else {
        "jsx"
    }
}
