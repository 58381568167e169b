//! Parse error types.

use crate::span::{LineIndex, Span};
use thiserror::Error;

/// An error found while parsing SVG markup.
///
/// Only [`ParseErrorKind::NoSvgRoot`] is fatal; every other kind is recovered
/// from and collected in [`SvgDocument::recovered`](crate::SvgDocument::recovered).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct ParseError {
    /// The kind of error.
    pub kind: ParseErrorKind,
    /// Where in the source the error was found.
    pub span: Span,
}

impl ParseError {
    /// Creates a new parse error.
    pub fn new(kind: ParseErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Returns true if the error aborts the conversion.
    pub fn is_fatal(&self) -> bool {
        matches!(self.kind, ParseErrorKind::NoSvgRoot)
    }

    /// Renders the error with its 1-based position in `source`.
    pub fn display_with_position(&self, source: &str) -> String {
        let position = LineIndex::new(source).line_col(self.span.start);
        format!("{} (at {})", self.kind, position)
    }
}

/// The kind of parse error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// No well-formed `<svg>...</svg>` root was found.
    #[error("no <svg> root element found")]
    NoSvgRoot,

    /// An element was still open when its parent (or the input) ended.
    #[error("unclosed tag: <{tag_name}>")]
    UnclosedTag {
        /// The name of the unclosed element.
        tag_name: String,
    },

    /// A closing tag did not match any open element.
    #[error("unexpected closing tag: </{tag_name}>")]
    UnexpectedClosingTag {
        /// The name in the closing tag.
        tag_name: String,
    },

    /// The same attribute appeared twice on one element.
    #[error("duplicate attribute: {name}")]
    DuplicateAttribute {
        /// The repeated attribute name.
        name: String,
    },

    /// A quoted attribute value ran to the end of the input.
    #[error("unterminated value for attribute: {name}")]
    UnterminatedAttributeValue {
        /// The attribute whose value is unterminated.
        name: String,
    },

    /// A comment, CDATA section or declaration was never closed.
    #[error("unterminated {construct}")]
    Unterminated {
        /// What was left open (`comment`, `CDATA section`, ...).
        construct: &'static str,
    },

    /// A token that cannot appear at this position.
    #[error("unexpected token: expected {expected}, found {found}")]
    UnexpectedToken {
        /// What was expected.
        expected: String,
        /// What was found.
        found: String,
    },
}
