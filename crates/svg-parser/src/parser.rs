//! Recursive descent parser for SVG markup.

use crate::ast::*;
use crate::error::{ParseError, ParseErrorKind};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::span::Span;
use smol_str::SmolStr;
use text_size::TextSize;

/// An element together with whether it was properly closed.
struct ParsedElement {
    element: Element,
    closed: bool,
}

/// The SVG parser.
pub struct Parser<'src> {
    /// The source being parsed.
    source: &'src str,
    /// The token stream.
    tokens: Vec<Token>,
    /// Current position in the token stream.
    pos: usize,
    /// Malformations recovered from during parsing.
    recovered: Vec<ParseError>,
    /// Names of the elements currently open, outermost first.
    open: Vec<SmolStr>,
    /// EOF token for when we're past the end
    eof_token: Token,
}

impl<'src> Parser<'src> {
    /// Creates a new parser.
    pub fn new(source: &'src str) -> Self {
        let tokens: Vec<Token> = Lexer::new(source).collect();
        let eof_token = Token {
            kind: TokenKind::Eof,
            span: Span::empty(TextSize::from(source.len() as u32)),
        };
        Self {
            source,
            tokens,
            pos: 0,
            recovered: Vec::new(),
            open: Vec::new(),
            eof_token,
        }
    }

    /// Parses the source into a document rooted at `<svg>`.
    pub fn parse(mut self) -> Result<SvgDocument, ParseError> {
        loop {
            match self.current_kind() {
                TokenKind::Eof => {
                    return Err(ParseError::new(
                        ParseErrorKind::NoSvgRoot,
                        Span::from_offsets(0, self.source.len()),
                    ));
                }
                TokenKind::CommentOpen => {
                    self.parse_comment();
                }
                TokenKind::CdataOpen => {
                    self.parse_cdata();
                }
                TokenKind::PiOpen | TokenKind::DeclarationOpen => self.skip_declaration(),
                TokenKind::LAngle => break,
                // Stray text or closing tags before the root.
                _ => self.advance(),
            }
        }

        let root_start = self.current().span.start;
        let Some(parsed) = self.parse_element() else {
            return Err(ParseError::new(
                ParseErrorKind::NoSvgRoot,
                Span::new(root_start, self.prev_end()),
            ));
        };

        if parsed.element.name != "svg" || !parsed.closed {
            return Err(ParseError::new(
                ParseErrorKind::NoSvgRoot,
                parsed.element.span,
            ));
        }

        tracing::trace!(
            recovered = self.recovered.len(),
            "parsed <svg> root with {} children",
            parsed.element.children.len()
        );

        Ok(SvgDocument {
            root: parsed.element,
            recovered: self.recovered,
        })
    }

    // === Token helpers ===

    /// Returns the current token.
    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.eof_token)
    }

    /// Returns the current token kind.
    fn current_kind(&self) -> TokenKind {
        self.current().kind
    }

    /// Returns the text of the current token.
    fn current_text(&self) -> &'src str {
        let span = self.current().span;
        &self.source[span.start_usize()..span.end_usize()]
    }

    /// Returns the current byte offset.
    fn offset(&self) -> usize {
        self.current().span.start_usize()
    }

    /// Returns the end of the previous token, or 0 at the start.
    fn prev_end(&self) -> TextSize {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|t| t.span.end)
            .unwrap_or_default()
    }

    /// Advances to the next token.
    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    /// Checks if the current token matches the given kind.
    fn check(&self, kind: TokenKind) -> bool {
        self.current_kind() == kind
    }

    /// Advances if the current token matches, returns true if matched.
    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Expects the current token to be the given kind, records an error if not.
    fn expect(&mut self, kind: TokenKind) -> bool {
        if self.eat(kind) {
            return true;
        }
        self.error(ParseErrorKind::UnexpectedToken {
            expected: kind.name().to_string(),
            found: self.current_kind().name().to_string(),
        });
        false
    }

    /// Records a recovered error at the current position.
    fn error(&mut self, kind: ParseErrorKind) {
        self.recovered.push(ParseError::new(kind, self.current().span));
    }

    /// Skips newline tokens (other whitespace never reaches the parser).
    fn skip_newlines(&mut self) {
        while self.check(TokenKind::Newline) {
            self.advance();
        }
    }

    /// Advances past every token that starts before `offset`.
    fn skip_to(&mut self, offset: usize) {
        while !self.check(TokenKind::Eof) && self.offset() < offset {
            self.advance();
        }
    }

    /// Slices the source from `start` up to `delimiter`, consuming the delimiter.
    ///
    /// Returns the content and the end offset. An unterminated construct runs
    /// to the end of input and is reported.
    fn read_raw_until(
        &mut self,
        start: usize,
        delimiter: &str,
        construct: &'static str,
    ) -> (String, usize) {
        let source = self.source;
        let remaining = &source[start..];
        match remaining.find(delimiter) {
            Some(index) => {
                let end = start + index + delimiter.len();
                self.skip_to(end);
                (remaining[..index].to_string(), end)
            }
            None => {
                self.error(ParseErrorKind::Unterminated { construct });
                self.skip_to(self.source.len());
                (remaining.to_string(), self.source.len())
            }
        }
    }

    // === Markup ===

    /// Parses `<!-- ... -->`.
    fn parse_comment(&mut self) -> Comment {
        let start = self.current().span.start;
        let content_start = self.current().span.end_usize();
        let (data, end) = self.read_raw_until(content_start, "-->", "comment");
        Comment {
            span: Span::new(start, TextSize::from(end as u32)),
            data,
        }
    }

    /// Parses `<![CDATA[ ... ]]>` into a text node.
    fn parse_cdata(&mut self) -> Text {
        let start = self.current().span.start;
        let content_start = self.current().span.end_usize();
        let (data, end) = self.read_raw_until(content_start, "]]>", "CDATA section");
        Text {
            span: Span::new(start, TextSize::from(end as u32)),
            data,
            cdata: true,
        }
    }

    /// Skips `<?...?>` and `<!DOCTYPE ...>`, including a bracketed internal subset.
    fn skip_declaration(&mut self) {
        let content_start = self.current().span.end_usize();
        if self.check(TokenKind::PiOpen) {
            self.read_raw_until(content_start, "?>", "processing instruction");
            return;
        }

        let source = self.source;
        let mut depth = 0usize;
        for (index, c) in source[content_start..].char_indices() {
            match c {
                '[' => depth += 1,
                ']' => depth = depth.saturating_sub(1),
                '>' if depth == 0 => {
                    self.skip_to(content_start + index + 1);
                    return;
                }
                _ => {}
            }
        }

        self.error(ParseErrorKind::Unterminated {
            construct: "declaration",
        });
        self.skip_to(self.source.len());
    }

    /// Parses an element starting at `<`.
    fn parse_element(&mut self) -> Option<ParsedElement> {
        let start = self.current().span.start;
        self.advance(); // '<'
        self.skip_newlines();

        if !self.check(TokenKind::Name) {
            self.error(ParseErrorKind::UnexpectedToken {
                expected: "tag name".to_string(),
                found: self.current_kind().name().to_string(),
            });
            return None;
        }
        let name = SmolStr::new(self.current_text());
        self.advance();

        let attributes = self.parse_attributes();
        let explicit_self_closing = self.eat(TokenKind::SlashRAngle);
        if !explicit_self_closing {
            self.expect(TokenKind::RAngle);
        }

        if explicit_self_closing || is_void_element(&name) {
            if !explicit_self_closing {
                self.eat_void_close(&name);
            }
            return Some(ParsedElement {
                element: Element {
                    span: Span::new(start, self.prev_end()),
                    name,
                    attributes,
                    children: Vec::new(),
                    self_closing: true,
                },
                closed: true,
            });
        }

        self.open.push(name.clone());
        let (children, closed) = self.parse_children(&name);
        self.open.pop();

        Some(ParsedElement {
            element: Element {
                span: Span::new(start, self.prev_end()),
                name,
                attributes,
                children,
                self_closing: false,
            },
            closed,
        })
    }

    /// Consumes `</name>` when it directly follows a void element.
    fn eat_void_close(&mut self, name: &str) {
        let saved = self.pos;
        self.skip_newlines();
        if self.eat(TokenKind::LAngleSlash) {
            self.skip_newlines();
            if self.check(TokenKind::Name) && self.current_text() == name {
                self.advance();
                self.skip_newlines();
                self.eat(TokenKind::RAngle);
                return;
            }
        }
        self.pos = saved;
    }

    /// Parses attributes up to `>` or `/>`.
    fn parse_attributes(&mut self) -> Attributes {
        let mut attributes = Attributes::new();

        loop {
            self.skip_newlines();
            match self.current_kind() {
                TokenKind::RAngle | TokenKind::SlashRAngle | TokenKind::Eof => break,
                kind if kind.opens_markup() => break,
                TokenKind::Name => {
                    let span = self.current().span;
                    let name = SmolStr::new(self.current_text());
                    self.advance();
                    let value = self.parse_attribute_value(&name);
                    if !attributes.insert(name.clone(), value) {
                        self.recovered.push(ParseError::new(
                            ParseErrorKind::DuplicateAttribute {
                                name: name.to_string(),
                            },
                            span,
                        ));
                    }
                }
                _ => {
                    self.error(ParseErrorKind::UnexpectedToken {
                        expected: "attribute name".to_string(),
                        found: self.current_kind().name().to_string(),
                    });
                    self.advance();
                }
            }
        }

        attributes
    }

    /// Parses `= value` after an attribute name, if present.
    fn parse_attribute_value(&mut self, name: &str) -> Option<String> {
        let saved = self.pos;
        self.skip_newlines();
        if !self.eat(TokenKind::Eq) {
            self.pos = saved;
            return None;
        }
        self.skip_newlines();

        match self.current_kind() {
            TokenKind::DoubleQuote => Some(self.parse_quoted_value(name, '"')),
            TokenKind::SingleQuote => Some(self.parse_quoted_value(name, '\'')),
            TokenKind::Name | TokenKind::Text | TokenKind::Slash | TokenKind::Eq => {
                Some(self.parse_unquoted_value())
            }
            _ => {
                self.error(ParseErrorKind::UnexpectedToken {
                    expected: "attribute value".to_string(),
                    found: self.current_kind().name().to_string(),
                });
                Some(String::new())
            }
        }
    }

    /// Parses a quoted value; the current token is the opening quote.
    fn parse_quoted_value(&mut self, name: &str, quote: char) -> String {
        let source = self.source;
        let value_start = self.current().span.end_usize();
        let remaining = &source[value_start..];

        match remaining.find(quote) {
            Some(index) => {
                // The closing quote is always its own token.
                self.skip_to(value_start + index + 1);
                remaining[..index].to_string()
            }
            None => {
                self.error(ParseErrorKind::UnterminatedAttributeValue {
                    name: name.to_string(),
                });
                self.skip_to(self.source.len());
                remaining.to_string()
            }
        }
    }

    /// Parses an unquoted value, which runs to whitespace, `>` or `/>`.
    fn parse_unquoted_value(&mut self) -> String {
        let source = self.source;
        let start = self.offset();
        let remaining = &source[start..];
        let bytes = remaining.as_bytes();

        let mut end = remaining.len();
        for (index, c) in remaining.char_indices() {
            let ends_value = c.is_whitespace()
                || c == '>'
                || (c == '/' && bytes.get(index + 1) == Some(&b'>'));
            if ends_value {
                end = index;
                break;
            }
        }

        self.skip_to(start + end);
        remaining[..end].to_string()
    }

    /// Parses children until the closing tag of `parent`.
    ///
    /// Returns the children and whether `</parent>` was found.
    fn parse_children(&mut self, parent: &str) -> (Vec<Node>, bool) {
        let mut children = Vec::new();

        loop {
            match self.current_kind() {
                TokenKind::Eof => {
                    self.error(ParseErrorKind::UnclosedTag {
                        tag_name: parent.to_string(),
                    });
                    return (children, false);
                }
                TokenKind::LAngleSlash => {
                    if let Some(closed) = self.parse_closing_tag(parent) {
                        return (children, closed);
                    }
                }
                TokenKind::LAngle => {
                    if let Some(parsed) = self.parse_element() {
                        children.push(Node::Element(parsed.element));
                    }
                }
                TokenKind::CommentOpen => children.push(Node::Comment(self.parse_comment())),
                TokenKind::CdataOpen => children.push(Node::Text(self.parse_cdata())),
                TokenKind::PiOpen | TokenKind::DeclarationOpen => self.skip_declaration(),
                _ => children.push(Node::Text(self.parse_text())),
            }
        }
    }

    /// Handles a `</name>` inside `parent`.
    ///
    /// Returns `Some(true)` when it closes `parent`, `Some(false)` when it
    /// closes an ancestor (left unconsumed for that ancestor), and `None` when
    /// it was skipped.
    fn parse_closing_tag(&mut self, parent: &str) -> Option<bool> {
        let saved = self.pos;
        let start = self.current().span.start;
        self.advance(); // '</'
        self.skip_newlines();

        let name = if self.check(TokenKind::Name) {
            let name = self.current_text();
            self.advance();
            name
        } else {
            ""
        };

        if name == parent {
            self.skip_newlines();
            self.expect(TokenKind::RAngle);
            return Some(true);
        }

        if self.open.iter().any(|open| open == name) {
            self.pos = saved;
            self.error(ParseErrorKind::UnclosedTag {
                tag_name: parent.to_string(),
            });
            return Some(false);
        }

        self.skip_newlines();
        self.eat(TokenKind::RAngle);
        if !is_void_element(name) {
            self.recovered.push(ParseError::new(
                ParseErrorKind::UnexpectedClosingTag {
                    tag_name: name.to_string(),
                },
                Span::new(start, self.prev_end()),
            ));
        }
        None
    }

    /// Parses character data up to the next markup construct.
    fn parse_text(&mut self) -> Text {
        let start = self.prev_end();
        let start_offset = u32::from(start) as usize;
        let end_offset = self.source[start_offset..]
            .find('<')
            .map(|index| start_offset + index)
            .unwrap_or(self.source.len());

        self.skip_to(end_offset);
        Text {
            span: Span::from_offsets(start_offset, end_offset),
            data: self.source[start_offset..end_offset].to_string(),
            cdata: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> SvgDocument {
        Parser::new(source).parse().expect("parse failed")
    }

    fn element(node: &Node) -> &Element {
        match node {
            Node::Element(el) => el,
            other => panic!("Expected Element, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_simple_svg() {
        let doc = parse(r#"<svg viewBox="0 0 10 10"><path d="M0 0"/></svg>"#);
        assert!(doc.recovered.is_empty());
        assert_eq!(doc.root.name, "svg");
        assert_eq!(doc.root.attr("viewBox"), Some("0 0 10 10"));
        assert_eq!(doc.root.children.len(), 1);
        let path = element(&doc.root.children[0]);
        assert_eq!(path.name, "path");
        assert!(path.self_closing);
    }

    #[test]
    fn test_single_quoted_value() {
        let doc = parse("<svg fill='none'></svg>");
        assert_eq!(doc.root.attr("fill"), Some("none"));
    }

    #[test]
    fn test_value_with_other_quote_inside() {
        let doc = parse(r#"<svg><text font-family="'Open Sans'">x</text></svg>"#);
        let text = element(&doc.root.children[0]);
        assert_eq!(text.attr("font-family"), Some("'Open Sans'"));
    }

    #[test]
    fn test_value_containing_markup_chars() {
        let doc = parse(r#"<svg data-x="a > b / c"></svg>"#);
        assert_eq!(doc.root.attr("data-x"), Some("a > b / c"));
    }

    #[test]
    fn test_value_ending_in_slash_is_not_self_closing() {
        let doc = parse(r#"<svg><a href="/icons/"><path d="M0 0"/></a></svg>"#);
        let link = element(&doc.root.children[0]);
        assert_eq!(link.attr("href"), Some("/icons/"));
        assert!(!link.self_closing);
        assert_eq!(link.children.len(), 1);
    }

    #[test]
    fn test_unquoted_value() {
        let doc = parse("<svg width=10 height=20/>");
        assert_eq!(doc.root.attr("width"), Some("10"));
        assert_eq!(doc.root.attr("height"), Some("20"));
        assert!(doc.root.self_closing);
    }

    #[test]
    fn test_bare_attribute() {
        let doc = parse("<svg focusable></svg>");
        assert_eq!(doc.root.attributes.get("focusable"), Some(None));
    }

    #[test]
    fn test_attributes_across_lines() {
        let doc = parse("<svg\n  width=\"1\"\n  height=\"2\"\n></svg>");
        assert_eq!(
            doc.root.attributes.names().collect::<Vec<_>>(),
            vec!["width", "height"]
        );
    }

    #[test]
    fn test_void_without_slash() {
        let doc = parse(r#"<svg><rect width="1"><circle r="2"></svg>"#);
        assert!(doc.recovered.is_empty());
        assert_eq!(doc.root.children.len(), 2);
        assert!(element(&doc.root.children[0]).self_closing);
        assert!(element(&doc.root.children[1]).self_closing);
    }

    #[test]
    fn test_void_immediate_close_tag_consumed() {
        let doc = parse("<svg><circle r=\"1\">\n</circle><g/></svg>");
        assert!(doc.recovered.is_empty());
        let names: Vec<_> = doc.root.child_elements().map(|el| el.name.as_str()).collect();
        assert_eq!(names, vec!["circle", "g"]);
    }

    #[test]
    fn test_void_children_become_siblings() {
        let doc = parse(r#"<svg><path d="M0"><title>t</title></path></svg>"#);
        assert!(doc.recovered.is_empty());
        let names: Vec<_> = doc.root.child_elements().map(|el| el.name.as_str()).collect();
        assert_eq!(names, vec!["path", "title"]);
    }

    #[test]
    fn test_comment_node() {
        let doc = parse("<svg><!-- layer 1 --></svg>");
        match &doc.root.children[0] {
            Node::Comment(comment) => assert_eq!(comment.data, " layer 1 "),
            other => panic!("Expected Comment, got {other:?}"),
        }
    }

    #[test]
    fn test_prolog_skipped() {
        let source = r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- Generator: Sketch -->
<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.1//EN" "http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd">
<svg xmlns="http://www.w3.org/2000/svg"></svg>
"#;
        let doc = parse(source);
        assert_eq!(doc.root.name, "svg");
        assert!(doc.recovered.is_empty());
    }

    #[test]
    fn test_doctype_internal_subset() {
        let source = r#"<!DOCTYPE svg [ <!ENTITY ns "http://x"> ]><svg></svg>"#;
        assert_eq!(parse(source).root.name, "svg");
    }

    #[test]
    fn test_cdata_becomes_text() {
        let doc = parse("<svg><style><![CDATA[.a{fill:red}]]></style></svg>");
        let style = element(&doc.root.children[0]);
        match &style.children[0] {
            Node::Text(text) => {
                assert!(text.cdata);
                assert_eq!(text.data, ".a{fill:red}");
            }
            other => panic!("Expected Text, got {other:?}"),
        }
    }

    #[test]
    fn test_text_preserves_whitespace() {
        let doc = parse("<svg><text>  Hello  world </text></svg>");
        let text = element(&doc.root.children[0]);
        match &text.children[0] {
            Node::Text(t) => assert_eq!(t.data, "  Hello  world "),
            other => panic!("Expected Text, got {other:?}"),
        }
    }

    #[test]
    fn test_unicode_text() {
        let doc = parse("<svg><text>—é</text></svg>");
        let text = element(&doc.root.children[0]);
        match &text.children[0] {
            Node::Text(t) => assert_eq!(t.data, "—é"),
            other => panic!("Expected Text, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_attribute_keeps_first() {
        let doc = parse(r#"<svg fill="a" fill="b"></svg>"#);
        assert_eq!(doc.root.attr("fill"), Some("a"));
        assert_eq!(doc.recovered.len(), 1);
        assert!(matches!(
            doc.recovered[0].kind,
            ParseErrorKind::DuplicateAttribute { .. }
        ));
    }

    #[test]
    fn test_ancestor_close_recovers() {
        let doc = parse("<svg><g><g></svg>");
        assert_eq!(doc.root.name, "svg");
        let unclosed: Vec<_> = doc
            .recovered
            .iter()
            .filter(|e| matches!(e.kind, ParseErrorKind::UnclosedTag { .. }))
            .collect();
        assert_eq!(unclosed.len(), 2);
        let outer = element(&doc.root.children[0]);
        assert_eq!(outer.child_elements().count(), 1);
    }

    #[test]
    fn test_stray_close_tag_skipped() {
        let doc = parse("<svg><g></div></g></svg>");
        assert_eq!(doc.recovered.len(), 1);
        assert_eq!(
            doc.recovered[0].to_string(),
            "unexpected closing tag: </div>"
        );
        assert_eq!(element(&doc.root.children[0]).name, "g");
    }

    #[test]
    fn test_stray_void_close_tag_silent() {
        let doc = parse("<svg><g></path></g></svg>");
        assert!(doc.recovered.is_empty());
    }

    #[test]
    fn test_no_svg_root_for_other_element() {
        let err = Parser::new("<div></div>").parse().unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::NoSvgRoot);
    }

    #[test]
    fn test_no_svg_root_when_unclosed() {
        let err = Parser::new("<svg><path d=\"M0 0\"/>").parse().unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_no_svg_root_for_plain_text() {
        let err = Parser::new("not an svg at all").parse().unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::NoSvgRoot);
    }

    #[test]
    fn test_self_closing_svg_accepted() {
        let doc = parse("<svg/>");
        assert!(doc.root.self_closing);
        assert!(doc.root.children.is_empty());
    }

    #[test]
    fn test_unterminated_value_recovered_then_root_fails() {
        let err = Parser::new("<svg fill=\"red></svg>").parse().unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::NoSvgRoot);
    }

    #[test]
    fn test_element_span() {
        let source = "<svg><g></g></svg>";
        let doc = parse(source);
        assert_eq!(doc.root.span, Span::from_offsets(0, source.len()));
        assert_eq!(element(&doc.root.children[0]).span, Span::from_offsets(5, 12));
    }

    #[test]
    fn test_trailing_content_ignored() {
        let doc = parse("<svg></svg>\n<!-- trailing -->\n");
        assert!(doc.recovered.is_empty());
    }
}
