//! # parser
//!
//! The LL(1) stack automaton that turns a token sequence into a shared term.
//!
//! The automaton keeps a stack of grammar [`Symbol`]s, starting from
//! `[Start]`, and a cursor into the tokens. On every step it looks at the
//! top of the stack:
//!
//! - a nonterminal is expanded with the production found in [`TABLE`] for the
//!   lookahead token, its right-hand side pushed in reverse;
//! - a terminal must equal the lookahead kind; it is popped, the cursor
//!   advances and the terminal's semantic action runs.
//!
//! Semantic actions build terms bottom-up on a stack of [`Frame`]s, one per
//! open compound. An atom directly followed by `(` opens a frame. Leaves
//! are interned and appended to the innermost frame, or become the result
//! when no compound is open. `)` closes the innermost frame, interns the
//! compound and hands it to the enclosing frame the same way.
//!
//! A parse either yields exactly one term or fails; on failure every node it
//! added to the store is discarded.

use crate::error::{ParseError, SyntaxError};
use crate::grammar::{NonTerminal, Symbol, TABLE};
use crate::lexer::tokenize;
use crate::span::Span;
use crate::term::{Node, ParsedTerm, TermId, TermStore};
use crate::token::{Token, TokenKind};
use std::mem;

/// Counters accumulated over the lifetime of a [`TermParser`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParserStats {
    /// Tokens matched, including each input's end marker.
    pub tokens: usize,
    /// Nonterminal expansions.
    pub expansions: usize,
    /// Terms added to a store.
    pub nodes: usize,
    /// Terms found already present in a store.
    pub reused: usize,
}

/// Reads terms from text.
///
/// ```rust
/// # use ll_terms::parser::TermParser;
/// # use ll_terms::term::View;
/// let mut parser = TermParser::new();
/// let term = parser.parse("foo(X, bar(X))").unwrap();
/// assert_eq!(term.to_string(), "foo(X, bar(X))");
/// assert!(matches!(term.view(), View::Compound { args, .. } if args.len() == 2));
/// assert_eq!(parser.stats().reused, 1);
/// ```
#[derive(Debug, Default)]
pub struct TermParser {
    stats: ParserStats,
}

impl TermParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> ParserStats {
        self.stats.clone()
    }

    /// Parses `input` into a term owned by a fresh store.
    pub fn parse(&mut self, input: &str) -> Result<ParsedTerm, ParseError> {
        let mut store = TermStore::new();
        let root = self.parse_into(&mut store, input)?;
        Ok(ParsedTerm::new(store, root))
    }

    /// Parses `input` into `store`, sharing nodes with the terms already in it.
    ///
    /// On error, `store` is left exactly as it was before the call.
    pub fn parse_into(&mut self, store: &mut TermStore, input: &str) -> Result<TermId, ParseError> {
        let tokens = tokenize(input)?;
        self.parse_tokens(store, &tokens)
    }

    /// Runs the automaton over `tokens`.
    ///
    /// A sequence that does not end in [`TokenKind::End`] is read as if it did.
    /// On error, `store` is left exactly as it was before the call.
    pub fn parse_tokens(&mut self, store: &mut TermStore, tokens: &[Token]) -> Result<TermId, ParseError> {
        let checkpoint = store.checkpoint();
        let result = Automaton::new(store, tokens, &mut self.stats).run();
        match &result {
            Ok(id) => log::debug!(
                "parsed {} token(s) into #{} ({} new term(s))",
                tokens.len(),
                id.index(),
                store.len() - checkpoint
            ),
            Err(e) => {
                log::debug!("parse failed: {}", e);
                store.rollback(checkpoint);
            }
        }
        result
    }
}

/// Parses `input` with a throwaway [`TermParser`].
pub fn parse(input: &str) -> Result<ParsedTerm, ParseError> {
    TermParser::new().parse(input)
}

/// An open compound: its functor and the arguments read so far.
#[derive(Debug)]
struct Frame {
    functor: TermId,
    args: Vec<TermId>,
    /// Span of the functor token.
    start: Span,
}

struct Automaton<'a> {
    store: &'a mut TermStore,
    tokens: &'a [Token],
    /// Lookahead past the last token.
    eof: Token,
    cursor: usize,
    stack: Vec<Symbol>,
    frames: Vec<Frame>,
    result: Option<TermId>,
    stats: &'a mut ParserStats,
}

impl<'a> Automaton<'a> {
    fn new(store: &'a mut TermStore, tokens: &'a [Token], stats: &'a mut ParserStats) -> Self {
        let eof = match tokens.last() {
            Some(t) => Token::new(TokenKind::End, "", t.offset + t.text.len(), Span::at(t.span.end)),
            None => Token::new(TokenKind::End, "", 0, Span::default()),
        };
        Self {
            store,
            tokens,
            eof,
            cursor: 0,
            stack: vec![Symbol::Nonterminal(NonTerminal::Start)],
            frames: Vec::new(),
            result: None,
            stats,
        }
    }

    fn lookahead(&self) -> &Token {
        self.tokens.get(self.cursor).unwrap_or(&self.eof)
    }

    fn peek(&self) -> TokenKind {
        self.tokens
            .get(self.cursor + 1)
            .map_or(TokenKind::End, |t| t.kind)
    }

    fn run(mut self) -> Result<TermId, ParseError> {
        if log::log_enabled!(log::Level::Trace) {
            self.dump_state();
        }
        while let Some(top) = self.stack.pop() {
            let token = self.lookahead();
            match top {
                Symbol::Nonterminal(nt) => {
                    let Some(prod) = TABLE.lookup(nt, token.kind) else {
                        return Err(SyntaxError::new(top, token).into());
                    };
                    log::trace!("Expand {}", prod);
                    self.stack.extend(prod.rhs.iter().rev());
                    self.stats.expansions += 1;
                }
                Symbol::Terminal(kind) => {
                    if kind != token.kind {
                        return Err(SyntaxError::new(top, token).into());
                    }
                    log::trace!("Match {}", token);
                    self.stats.tokens += 1;
                    self.matched(kind)?;
                    self.cursor += 1;
                }
            }
            if log::log_enabled!(log::Level::Trace) {
                self.dump_state();
            }
        }
        // The stack only empties by matching the end marker, which checks
        // for a finished term.
        self.result
            .ok_or_else(|| SyntaxError::new(Symbol::Nonterminal(NonTerminal::Term), self.lookahead()).into())
    }

    /// Semantic action for the terminal just matched at the cursor.
    fn matched(&mut self, kind: TokenKind) -> Result<(), ParseError> {
        let text = self.lookahead().text.clone();
        let span = self.lookahead().span;
        match kind {
            TokenKind::Atom => {
                let node = Node::Atom(text);
                let id = self.intern(node);
                if self.peek() == TokenKind::LeftParen {
                    log::trace!("Open frame #{}", self.frames.len());
                    self.frames.push(Frame {
                        functor: id,
                        args: Vec::new(),
                        start: span,
                    });
                } else {
                    self.finish(id);
                }
            }
            TokenKind::Number => {
                let node = Node::Number(text);
                let id = self.intern(node);
                self.finish(id);
            }
            TokenKind::Variable => {
                let node = Node::Variable(text);
                let id = self.intern(node);
                self.finish(id);
            }
            TokenKind::RightParen => {
                let Some(Frame { functor, args, start }) = self.frames.pop() else {
                    return Err(self.unexpected(Symbol::Terminal(TokenKind::End)));
                };
                log::trace!(
                    "Close frame #{} with {} arg(s), {}",
                    self.frames.len(),
                    args.len(),
                    start.merge(&span)
                );
                let id = self.intern(Node::Compound {
                    functor,
                    args: args.into_boxed_slice(),
                });
                self.finish(id);
            }
            TokenKind::End => {
                if !self.frames.is_empty() {
                    return Err(self.unexpected(Symbol::Terminal(TokenKind::RightParen)));
                }
                if self.result.is_none() || !self.stack.is_empty() {
                    return Err(self.unexpected(Symbol::Nonterminal(NonTerminal::Term)));
                }
                if let Some(extra) = self.tokens.get(self.cursor + 1) {
                    return Err(SyntaxError::new(Symbol::Terminal(TokenKind::End), extra).into());
                }
                log::trace!("Accept");
            }
            TokenKind::LeftParen | TokenKind::Comma => {}
        }
        Ok(())
    }

    fn unexpected(&self, expected: Symbol) -> ParseError {
        SyntaxError::new(expected, self.lookahead()).into()
    }

    fn intern(&mut self, node: Node) -> TermId {
        let before = self.store.len();
        let id = self.store.intern(node);
        if self.store.len() > before {
            self.stats.nodes += 1;
        } else {
            self.stats.reused += 1;
        }
        id
    }

    /// Hands a completed term to the innermost open compound, or makes it
    /// the result.
    fn finish(&mut self, id: TermId) {
        match self.frames.last_mut() {
            Some(frame) => frame.args.push(id),
            None => {
                let previous = mem::replace(&mut self.result, Some(id));
                debug_assert!(previous.is_none());
            }
        }
    }

    fn dump_state(&self) {
        let stack: Vec<_> = self.stack.iter().rev().map(|s| s.to_string()).collect();
        log::trace!(
            "[{}]  <-  {}  (open {})",
            stack.join(" "),
            self.lookahead(),
            self.frames.len()
        );
    }
}
