//! Tolerant SVG markup parser for svg2jsx.
//!
//! This crate turns SVG-flavored XML into an element tree:
//! - Lexer (tokenizer) using `logos`
//! - Recursive descent parser with error recovery
//! - Element tree types ([`Element`], [`Node`], [`Attributes`])
//! - Byte spans and a [`LineIndex`] for positioned messages
//!
//! Only a missing or unclosed `<svg>` root fails the parse. Other
//! malformations (unclosed children, stray closing tags, duplicate
//! attributes) are repaired and reported in [`SvgDocument::recovered`].
//!
//! # Example
//!
//! ```
//! use svg_parser::parse;
//!
//! let source = r#"
//! <?xml version="1.0"?>
//! <svg viewBox="0 0 24 24">
//!     <path stroke-width="2" d="M0 0L24 24">
//! </svg>
//! "#;
//!
//! let document = parse(source).unwrap();
//! assert_eq!(document.root.name, "svg");
//! assert!(document.recovered.is_empty());
//! ```

mod ast;
mod error;
mod lexer;
mod parser;
mod span;

pub use ast::*;
pub use error::{ParseError, ParseErrorKind};
pub use lexer::{Lexer, Token, TokenKind};
pub use span::{LineCol, LineIndex, Span};

/// Parses SVG markup into a document rooted at `<svg>`.
///
/// Anything before the root (XML declaration, doctype, comments) and
/// anything after it is skipped.
pub fn parse(source: &str) -> Result<SvgDocument, ParseError> {
    parser::Parser::new(source).parse()
}
