//! Copyright (c) 2005–2025 IKH Software, Inc.
//!
//! Released under the terms of the GNU Lesser General Public License, version 3.0
//! or (at your option) any later version (LGPL-3.0-or-later).
//!
//! Table-driven LL(1) reader for Prolog-style first-order terms.
//!
//! This crate reads atoms, numbers, variables and functor-applied compounds
//! such as `foo(1, a, bar(X))` into a hash-consed [`TermStore`], where every
//! structurally equal subterm is a single shared node.
//!
//! Key components:
//! - `lexer`: `logos`-based tokenizer producing [`Token`]s with spans
//! - `grammar`: productions, FIRST/FOLLOW sets and the LL(1) parse table
//! - `parser`: stack automaton with semantic actions that build terms
//! - `term`: the hash-consing store, term views and canonical display
//! - `error`: lexical, syntax and store errors
//!
//! # Example
//! ```rust
//! let t1 = ll_terms::parse("f(g(X), g(X))").unwrap();
//! let t2 = ll_terms::parse("f( g(X),g(X) )").unwrap();
//! assert_eq!(t1, t2);
//! assert_eq!(t1.to_string(), "f(g(X), g(X))");
//! assert!(ll_terms::parse("f(").unwrap_err().is_syntax());
//! ```

pub mod error;
pub mod grammar;
pub mod lexer;
pub mod parser;
pub mod span;
pub mod term;
pub mod token;

pub use error::{LexError, ParseError, StoreError, SyntaxError};
pub use parser::{ParserStats, TermParser, parse};
pub use term::{ParsedTerm, TermId, TermStore, View};
pub use token::{Token, TokenKind};
