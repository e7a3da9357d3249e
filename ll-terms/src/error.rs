//! # Term Reader Errors
//!
//! A parse has exactly two ways to fail, and [`ParseError`] classifies them:
//!
//! - **Lexical** ([`LexError`]): a character that starts no token, or a
//!   quoted atom that is never closed.
//! - **Syntax** ([`SyntaxError`]): the automaton found no table entry for the
//!   nonterminal on top of its stack, or the top terminal does not match the
//!   lookahead token.
//!
//! Neither is recoverable; the reader never returns a partial term.
//!
//! [`StoreError`] covers the public term builders on
//! [`TermStore`](crate::term::TermStore), and [`GrammarError`] reports a
//! grammar that is not LL(1) when its table is built.

use crate::grammar::{NonTerminal, ProdID, Symbol};
use crate::span::{Position, Span};
use crate::token::{Token, TokenKind};
use smartstring::alias::String;
use thiserror::Error;

/// An input character that matches no token pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unexpected character {character:?} at {position}")]
pub struct LexError {
    /// The offending character.
    pub character: char,
    /// Byte offset of the offending character.
    pub offset: usize,
    pub position: Position,
}

/// A token the automaton could not accept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected {expected}, found {found} at {}", .found.span.start)]
pub struct SyntaxError {
    /// The grammar symbol on top of the stack when the parse failed.
    pub expected: Symbol,
    /// The lookahead token.
    pub found: Token,
}

impl SyntaxError {
    pub fn new(expected: Symbol, found: &Token) -> Self {
        Self {
            expected,
            found: found.clone(),
        }
    }
}

/// Represents all possible failures of a single parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("lexical error: {0}")]
    Lex(#[from] LexError),

    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),
}

impl ParseError {
    pub fn is_lexical(&self) -> bool {
        matches!(self, ParseError::Lex(_))
    }

    pub fn is_syntax(&self) -> bool {
        matches!(self, ParseError::Syntax(_))
    }

    /// Source location of the offending character or token.
    pub fn span(&self) -> Span {
        match self {
            ParseError::Lex(e) => Span::at(e.position),
            ParseError::Syntax(e) => e.found.span,
        }
    }

    /// Kind of the offending token, if the failure was syntactic.
    pub fn found(&self) -> Option<TokenKind> {
        match self {
            ParseError::Lex(_) => None,
            ParseError::Syntax(e) => Some(e.found.kind),
        }
    }
}

/// Invalid use of the public term builders.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A compound's functor must be an atom.
    #[error("functor of {name:?} must be an atom, found a {found}")]
    FunctorNotAtom { name: String, found: &'static str },

    /// A compound needs at least one argument.
    #[error("compound {functor:?} needs at least one argument")]
    EmptyArgs { functor: String },

    /// A handle that does not belong to this store.
    #[error("invalid term handle {index} (store length {len})")]
    InvalidHandle { index: usize, len: usize },

    /// A variable name must start with an uppercase letter or underscore.
    #[error("invalid variable name {0:?}")]
    InvalidVariable(String),

    /// A number literal must match the lexer's number pattern.
    #[error("invalid number literal {0:?}")]
    InvalidNumber(String),
}

/// A grammar whose parse table would need more than one production in a cell.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("grammar is not LL(1): {nonterminal} on {lookahead} selects both {first:?} and {second:?}")]
pub struct GrammarError {
    pub nonterminal: NonTerminal,
    pub lookahead: TokenKind,
    pub first: ProdID,
    pub second: ProdID,
}
