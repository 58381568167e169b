//! Built-in indenter and minifier for generated component source.
//!
//! Both work on text, not on a syntax tree. They rely on the shape of the
//! generator's output: one element per line, text content inlined, and
//! quotes inside JSX text written as entities.

use crate::options::FormatterStyle;

/// Re-indents generated source.
///
/// Indentation decreases before lines starting with `</`, `}`, `)` or `]`,
/// and increases after lines ending with `{`, `(` or `[` and after opening
/// tags that neither self-close nor close on the same line. Continuation
/// lines of a multi-line `{/* ... */}` comment keep the current level.
pub fn indent(code: &str, style: &FormatterStyle) -> String {
    let unit = style.indent_unit();
    let normalized = code.replace("\r\n", "\n").replace('\r', "\n");

    let mut depth = 0usize;
    let mut in_comment = false;
    let mut lines = Vec::new();

    for line in normalized.split('\n') {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            lines.push(String::new());
            continue;
        }

        if in_comment {
            lines.push(format!("{}{}", unit.repeat(depth), trimmed));
            in_comment = !trimmed.contains("*/");
            continue;
        }

        if starts_closing(trimmed) {
            depth = depth.saturating_sub(1);
        }

        lines.push(format!("{}{}", unit.repeat(depth), trimmed));

        if trimmed.starts_with("{/*") && !trimmed.contains("*/") {
            in_comment = true;
        } else if ends_opening(trimmed) || is_open_tag_line(trimmed) {
            depth += 1;
        }
    }

    lines.join("\n")
}

fn starts_closing(line: &str) -> bool {
    line.starts_with("</") || line.starts_with(['}', ')', ']'])
}

fn ends_opening(line: &str) -> bool {
    line.ends_with(['{', '(', '['])
}

fn is_open_tag_line(line: &str) -> bool {
    line.starts_with('<')
        && !line.starts_with("</")
        && !line.ends_with("/>")
        && !line.contains("</")
}

/// Collapses generated source onto a single line.
///
/// String literals (`"`, `'`, `` ` ``) are copied verbatim and block
/// comments keep their text with line breaks folded. For every other
/// whitespace run:
/// - next to one of `{ } , =` it is removed
/// - a run with a line break after `>` or before `<` is removed
/// - anything else becomes a single space
pub fn minify(code: &str) -> String {
    let chars: Vec<char> = code.chars().collect();
    let len = chars.len();
    let mut out = String::with_capacity(code.len());
    let mut i = 0;

    while i < len {
        let c = chars[i];
        match c {
            '"' | '\'' | '`' => {
                let start = i;
                i += 1;
                while i < len {
                    let d = chars[i];
                    i += 1;
                    if d == '\\' {
                        i += 1;
                    } else if d == c {
                        break;
                    }
                }
                i = i.min(len);
                out.extend(&chars[start..i]);
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                let start = i;
                i += 2;
                while i < len && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                    i += 1;
                }
                i = (i + 2).min(len);
                push_folded(&mut out, &chars[start..i]);
            }
            c if c.is_whitespace() => {
                let start = i;
                while i < len && chars[i].is_whitespace() {
                    i += 1;
                }
                let has_newline = chars[start..i].iter().any(|&w| w == '\n' || w == '\r');
                let (Some(prev), Some(&next)) = (out.chars().next_back(), chars.get(i)) else {
                    continue;
                };
                if is_tight(prev) || is_tight(next) {
                    continue;
                }
                if has_newline && (prev == '>' || next == '<') {
                    continue;
                }
                out.push(' ');
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }

    out
}

/// Punctuation whose surrounding whitespace is dropped.
fn is_tight(c: char) -> bool {
    matches!(c, '{' | '}' | ',' | '=')
}

/// Copies comment text, folding whitespace runs that contain a line break.
fn push_folded(out: &mut String, chars: &[char]) {
    let mut pending_break = false;
    let mut pending_space = String::new();
    for &c in chars {
        if c.is_whitespace() {
            pending_break |= c == '\n' || c == '\r';
            pending_space.push(c);
            continue;
        }
        if pending_break {
            out.push(' ');
        } else {
            out.push_str(&pending_space);
        }
        pending_space.clear();
        pending_break = false;
        out.push(c);
    }
}
