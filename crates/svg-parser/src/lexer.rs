//! SVG markup lexer using logos.
//!
//! The lexer only recognizes markup punctuation and names. Raw runs such as
//! text content, attribute values and comment bodies are sliced from the
//! source by the parser, so the tokens inside them are skipped by offset.

use crate::span::Span;
use logos::Logos;
use text_size::TextSize;

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The span of the token in the source.
    pub span: Span,
}

/// Token kinds for SVG markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Logos, Default)]
#[logos(skip r"[ \t\r\f]+")]
pub enum TokenKind {
    /// `<!--`
    #[token("<!--", priority = 12)]
    CommentOpen,

    /// `<![CDATA[`
    #[token("<![CDATA[", priority = 12)]
    CdataOpen,

    /// `<!` (doctype and other declarations)
    #[token("<!", priority = 11)]
    DeclarationOpen,

    /// `<?` (xml declaration and processing instructions)
    #[token("<?", priority = 11)]
    PiOpen,

    /// `</`
    #[token("</", priority = 11)]
    LAngleSlash,

    /// `<`
    #[token("<", priority = 10)]
    LAngle,

    /// `/>`
    #[token("/>", priority = 11)]
    SlashRAngle,

    /// `>`
    #[token(">", priority = 10)]
    RAngle,

    /// `/`
    #[token("/", priority = 10)]
    Slash,

    /// `=`
    #[token("=", priority = 10)]
    Eq,

    /// `"`
    #[token("\"", priority = 10)]
    DoubleQuote,

    /// `'`
    #[token("'", priority = 10)]
    SingleQuote,

    /// Newline
    #[token("\n", priority = 10)]
    Newline,

    /// A tag or attribute name, including namespace prefixes (`xlink:href`).
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_:.\-]*", priority = 4)]
    Name,

    /// Any other run of characters (numbers, punctuation, non-ASCII text).
    #[regex(r#"[^<>=/"' \t\r\f\na-zA-Z_]+"#, priority = 1)]
    Text,

    /// End of file
    Eof,

    /// Invalid/unknown token
    #[default]
    Error,
}

impl TokenKind {
    /// Returns a human-readable name for this token kind.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::CommentOpen => "'<!--'",
            TokenKind::CdataOpen => "'<![CDATA['",
            TokenKind::DeclarationOpen => "'<!'",
            TokenKind::PiOpen => "'<?'",
            TokenKind::LAngleSlash => "'</'",
            TokenKind::LAngle => "'<'",
            TokenKind::SlashRAngle => "'/>'",
            TokenKind::RAngle => "'>'",
            TokenKind::Slash => "'/'",
            TokenKind::Eq => "'='",
            TokenKind::DoubleQuote => "'\"'",
            TokenKind::SingleQuote => "'''",
            TokenKind::Newline => "newline",
            TokenKind::Name => "name",
            TokenKind::Text => "text",
            TokenKind::Eof => "end of file",
            TokenKind::Error => "invalid token",
        }
    }

    /// Returns true for tokens that open a markup construct (`<`, `</`, `<!--`, ...).
    pub fn opens_markup(&self) -> bool {
        matches!(
            self,
            TokenKind::LAngle
                | TokenKind::LAngleSlash
                | TokenKind::CommentOpen
                | TokenKind::CdataOpen
                | TokenKind::DeclarationOpen
                | TokenKind::PiOpen
        )
    }
}

/// A lexer for SVG markup.
pub struct Lexer<'src> {
    inner: logos::Lexer<'src, TokenKind>,
    source: &'src str,
    finished: bool,
}

impl<'src> Lexer<'src> {
    /// Creates a new lexer for the given source.
    pub fn new(source: &'src str) -> Self {
        Self {
            inner: TokenKind::lexer(source),
            source,
            finished: false,
        }
    }

    /// Returns the source string being lexed.
    pub fn source(&self) -> &'src str {
        self.source
    }
}

fn to_span(range: std::ops::Range<usize>) -> Span {
    Span::new(
        TextSize::from(range.start as u32),
        TextSize::from(range.end as u32),
    )
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.inner.next() {
            Some(Ok(kind)) => Some(Token {
                kind,
                span: to_span(self.inner.span()),
            }),
            Some(Err(())) => Some(Token {
                kind: TokenKind::Error,
                span: to_span(self.inner.span()),
            }),
            None => {
                self.finished = true;
                let end = TextSize::from(self.source.len() as u32);
                Some(Token {
                    kind: TokenKind::Eof,
                    span: Span::empty(end),
                })
            }
        }
    }
}
