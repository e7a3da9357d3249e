//! # Term Tokens
//!
//! This module defines the token kinds recognized by the term lexer and the
//! concrete [`Token`] value that pairs a kind with its text and location.
//!
//! [`TokenKind`] doubles as the terminal alphabet of the term grammar: the
//! parse table in [`crate::grammar`] is indexed by it, and
//! [`TokenKind::End`] is the end-of-input marker every token sequence
//! terminates with.

use crate::span::Span;
use smartstring::alias::String;
use std::fmt;

/// The kind of a lexical token, and a terminal of the term grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum TokenKind {
    /// Lowercase-initial identifier or quoted atom, e.g. `foo`, `'hello world'`.
    Atom = 0,

    /// Numeric literal, e.g. `42`, `-3.5`.
    Number = 1,

    /// Uppercase- or underscore-initial identifier, e.g. `X`, `_Tail`.
    Variable = 2,

    /// `(`
    LeftParen = 3,

    /// `)`
    RightParen = 4,

    /// `,`
    Comma = 5,

    /// End of input.
    End = 6,
}

impl TokenKind {
    /// The total number of token kinds.
    pub const COUNT: usize = 7;

    /// All token kinds, in declaration order.
    pub const ALL: [TokenKind; Self::COUNT] = [
        TokenKind::Atom,
        TokenKind::Number,
        TokenKind::Variable,
        TokenKind::LeftParen,
        TokenKind::RightParen,
        TokenKind::Comma,
        TokenKind::End,
    ];

    /// Human-readable names of each kind, in declaration order.
    pub const STRS: &[&str] = &["atom", "number", "variable", "'('", "')'", "','", "end of input"];
}

impl From<TokenKind> for usize {
    fn from(k: TokenKind) -> Self {
        k as usize
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(TokenKind::STRS[usize::from(*self)])
    }
}

/// A lexical token.
///
/// `text` holds the token's lexeme; for quoted atoms it is the unescaped
/// name without the surrounding quotes, and for [`TokenKind::End`] it is
/// empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Byte offset of the token's first character.
    pub offset: usize,
    pub span: Span,
}

impl Token {
    #[must_use]
    pub fn new(kind: TokenKind, text: impl Into<String>, offset: usize, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            offset,
            span,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::End => write!(f, "{}", self.kind),
            _ => write!(f, "{} {:?}", self.kind, self.text.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Position;

    #[test]
    fn kinds_index_in_declaration_order() {
        for (i, kind) in TokenKind::ALL.iter().enumerate() {
            assert_eq!(usize::from(*kind), i);
        }
    }

    #[test]
    fn kind_display_uses_names() {
        assert_eq!(TokenKind::Atom.to_string(), "atom");
        assert_eq!(TokenKind::RightParen.to_string(), "')'");
        assert_eq!(TokenKind::End.to_string(), "end of input");
    }

    #[test]
    fn token_display_quotes_text() {
        let t = Token::new(TokenKind::Variable, "X", 3, Span::at(Position::new(0, 3)));
        assert_eq!(t.to_string(), "variable \"X\"");
        let end = Token::new(TokenKind::End, "", 4, Span::at(Position::new(0, 4)));
        assert_eq!(end.to_string(), "end of input");
    }
}
