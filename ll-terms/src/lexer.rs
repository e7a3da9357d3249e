//! Term lexer.
//!
//! Converts raw input text into the token sequence consumed by
//! [`crate::parser`]. Recognition is delegated to a [`logos`]-derived DFA
//! ([`LogosToken`]); this module maps its output to [`Token`]s carrying
//! byte offsets and line/column spans, unescapes quoted atoms, and appends
//! the [`TokenKind::End`] marker.
//!
//! Lexing is eager and all-or-nothing: the first character that starts no
//! token fails the whole scan with a [`LexError`].

use crate::error::LexError;
use crate::span::{LineIndex, Span};
use crate::token::{Token, TokenKind};
use logos::Logos;
use smartstring::alias::String;

/// Raw tokens recognized by the `logos`-based lexer.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum LogosToken {
    /// A lowercase-initial identifier (e.g. `foo`, `point3d`).
    #[regex(r"[a-z][a-zA-Z0-9_]*")]
    Atom,

    /// A single-quoted atom (e.g. `'hello world'`, `'it\'s'`).
    #[regex(r"'([^'\\]|\\['\\])*'")]
    QuotedAtom,

    /// An uppercase- or underscore-initial identifier (e.g. `X`, `_Acc`).
    #[regex(r"[A-Z_][a-zA-Z0-9_]*")]
    Variable,

    /// An integer or decimal literal with an optional leading minus.
    #[regex(r"-?[0-9]+(\.[0-9]+)?")]
    Number,

    #[token("(")]
    LeftParen,

    #[token(")")]
    RightParen,

    #[token(",")]
    Comma,
}

impl From<LogosToken> for TokenKind {
    fn from(t: LogosToken) -> Self {
        match t {
            LogosToken::Atom | LogosToken::QuotedAtom => TokenKind::Atom,
            LogosToken::Variable => TokenKind::Variable,
            LogosToken::Number => TokenKind::Number,
            LogosToken::LeftParen => TokenKind::LeftParen,
            LogosToken::RightParen => TokenKind::RightParen,
            LogosToken::Comma => TokenKind::Comma,
        }
    }
}

/// Strips the quotes from a quoted atom and resolves `\'` and `\\`.
fn unquote(slice: &str) -> String {
    let inner = &slice[1..slice.len() - 1];
    let mut out = String::new();
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            }
            c => out.push(c),
        }
    }
    out
}

/// Tokenizes `input` into a sequence ending with [`TokenKind::End`].
///
/// # Errors
/// Returns [`LexError`] for the first character that cannot begin a token,
/// including the opening quote of an unterminated quoted atom.
///
/// # Example
/// ```rust
/// # use ll_terms::lexer::tokenize;
/// # use ll_terms::token::TokenKind;
/// let toks = tokenize("foo(X, 1)").unwrap();
/// let kinds: Vec<_> = toks.iter().map(|t| t.kind).collect();
/// assert_eq!(
///     kinds,
///     [
///         TokenKind::Atom,
///         TokenKind::LeftParen,
///         TokenKind::Variable,
///         TokenKind::Comma,
///         TokenKind::Number,
///         TokenKind::RightParen,
///         TokenKind::End,
///     ]
/// );
/// ```
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    let mut lines = LineIndex::new(input);
    let mut lexer = LogosToken::lexer(input);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let range = lexer.span();
        let slice = lexer.slice();
        match result {
            Ok(raw) => {
                let text = match raw {
                    LogosToken::QuotedAtom => unquote(slice),
                    _ => String::from(slice),
                };
                let token = Token::new(raw.into(), text, range.start, lines.span(range));
                log::trace!("LEXED: {:?} {:?}", token.kind, token.text.as_str());
                tokens.push(token);
            }
            Err(()) => {
                let character = slice.chars().next().unwrap_or('\0');
                let err = LexError {
                    character,
                    offset: range.start,
                    position: lines.position(range.start),
                };
                log::debug!("lexing failed: {}", err);
                return Err(err);
            }
        }
    }

    let end = input.len();
    tokens.push(Token::new(
        TokenKind::End,
        "",
        end,
        Span::at(lines.position(end)),
    ));
    Ok(tokens)
}
