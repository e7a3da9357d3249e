//! The term grammar and its LL(1) parse table.
//!
//! The naive term grammar
//!
//! ```text
//! Term     -> atom | number | variable | atom ( Args )
//! ```
//!
//! needs two tokens of lookahead to tell an atom from a compound. Left-factoring
//! the common `atom` prefix gives the grammar used here:
//!
//! ```text
//! Start    -> Term end
//! Term     -> atom Params | number | variable
//! Params   -> ε | ( Args )
//! Args     -> Term ArgsTail
//! ArgsTail -> ε | , Args
//! ```
//!
//! [`ParseTable::build`] derives the (nonterminal × lookahead) table from the
//! productions via FIRST and FOLLOW sets and refuses any grammar that would
//! put two productions in one cell. The table for [`PRODUCTIONS`] is built
//! once per process and shared read-only through [`TABLE`].

use crate::error::GrammarError;
use crate::token::TokenKind;
use once_cell::sync::Lazy;
use std::collections::BTreeSet;
use std::fmt;
use std::io::{self, Write};

use NonTerminal as NT;
use Symbol::{Nonterminal as N, Terminal as T};
use TokenKind as K;

/// Nonterminals of the term grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum NonTerminal {
    Start = 0,
    Term = 1,
    /// Optional argument list after an atom.
    Params = 2,
    Args = 3,
    /// Optional `, Args` continuation.
    ArgsTail = 4,
}

impl NonTerminal {
    pub const COUNT: usize = 5;

    pub const ALL: [NonTerminal; Self::COUNT] = [
        NonTerminal::Start,
        NonTerminal::Term,
        NonTerminal::Params,
        NonTerminal::Args,
        NonTerminal::ArgsTail,
    ];

    pub const STRS: &[&str] = &["Start", "Term", "Params", "Args", "ArgsTail"];
}

impl From<NonTerminal> for usize {
    fn from(n: NonTerminal) -> Self {
        n as usize
    }
}

impl fmt::Display for NonTerminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(NonTerminal::STRS[usize::from(*self)])
    }
}

/// A grammar symbol: what the parser keeps on its stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    Terminal(TokenKind),
    Nonterminal(NonTerminal),
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Terminal(t) => fmt::Display::fmt(t, f),
            Symbol::Nonterminal(n) => fmt::Display::fmt(n, f),
        }
    }
}

/// Production identifiers, one per alternative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ProdID {
    /// Start -> Term end
    Start = 0,
    /// Term -> atom Params
    Term1 = 1,
    /// Term -> number
    Term2 = 2,
    /// Term -> variable
    Term3 = 3,
    /// Params ->
    Params1 = 4,
    /// Params -> ( Args )
    Params2 = 5,
    /// Args -> Term ArgsTail
    Args = 6,
    /// ArgsTail ->
    ArgsTail1 = 7,
    /// ArgsTail -> , Args
    ArgsTail2 = 8,
}

impl ProdID {
    pub const COUNT: usize = 9;
}

impl From<ProdID> for usize {
    fn from(p: ProdID) -> Self {
        p as usize
    }
}

/// A single production `lhs -> rhs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Production {
    pub id: ProdID,
    pub lhs: NonTerminal,
    pub rhs: &'static [Symbol],
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ->", self.lhs)?;
        if self.rhs.is_empty() {
            return write!(f, " ε");
        }
        for sym in self.rhs {
            write!(f, " {}", sym)?;
        }
        Ok(())
    }
}

/// The left-factored term grammar, indexed by [`ProdID`].
pub const PRODUCTIONS: &[Production] = &[
    Production {
        id: ProdID::Start,
        lhs: NT::Start,
        rhs: &[N(NT::Term), T(K::End)],
    },
    Production {
        id: ProdID::Term1,
        lhs: NT::Term,
        rhs: &[T(K::Atom), N(NT::Params)],
    },
    Production {
        id: ProdID::Term2,
        lhs: NT::Term,
        rhs: &[T(K::Number)],
    },
    Production {
        id: ProdID::Term3,
        lhs: NT::Term,
        rhs: &[T(K::Variable)],
    },
    Production {
        id: ProdID::Params1,
        lhs: NT::Params,
        rhs: &[],
    },
    Production {
        id: ProdID::Params2,
        lhs: NT::Params,
        rhs: &[T(K::LeftParen), N(NT::Args), T(K::RightParen)],
    },
    Production {
        id: ProdID::Args,
        lhs: NT::Args,
        rhs: &[N(NT::Term), N(NT::ArgsTail)],
    },
    Production {
        id: ProdID::ArgsTail1,
        lhs: NT::ArgsTail,
        rhs: &[],
    },
    Production {
        id: ProdID::ArgsTail2,
        lhs: NT::ArgsTail,
        rhs: &[T(K::Comma), N(NT::Args)],
    },
];

/// The process-wide parse table for [`PRODUCTIONS`].
pub static TABLE: Lazy<ParseTable> =
    Lazy::new(|| ParseTable::build(PRODUCTIONS).expect("term grammar is LL(1)"));

/// A set of lookahead kinds.
pub type TokenSet = BTreeSet<TokenKind>;

/// FIRST set and nullability of a symbol sequence.
fn first_of_seq(seq: &[Symbol], first: &[TokenSet], nullable: &[bool]) -> (TokenSet, bool) {
    let mut out = TokenSet::new();
    for sym in seq {
        match *sym {
            Symbol::Terminal(t) => {
                out.insert(t);
                return (out, false);
            }
            Symbol::Nonterminal(n) => {
                out.extend(first[usize::from(n)].iter().copied());
                if !nullable[usize::from(n)] {
                    return (out, false);
                }
            }
        }
    }
    (out, true)
}

/// Computes FIRST sets and nullability for all nonterminals.
///
/// Iterates to a fixed point: a production contributes the FIRST set of its
/// right-hand side to its left-hand side, and makes the left-hand side
/// nullable when every right-hand symbol is.
pub fn first_sets(prods: &[Production]) -> (Vec<TokenSet>, Vec<bool>) {
    let mut first = vec![TokenSet::new(); NonTerminal::COUNT];
    let mut nullable = vec![false; NonTerminal::COUNT];
    let mut changed = true;
    while changed {
        changed = false;
        for prod in prods {
            let lhs = usize::from(prod.lhs);
            let (f, n) = first_of_seq(prod.rhs, &first, &nullable);
            for t in f {
                if first[lhs].insert(t) {
                    changed = true;
                }
            }
            if n && !nullable[lhs] {
                nullable[lhs] = true;
                changed = true;
            }
        }
    }
    (first, nullable)
}

/// Computes FOLLOW sets for all nonterminals.
///
/// The end-of-input marker is an explicit terminal of the start production,
/// so no synthetic `$` is seeded.
pub fn follow_sets(prods: &[Production], first: &[TokenSet], nullable: &[bool]) -> Vec<TokenSet> {
    let mut follow = vec![TokenSet::new(); NonTerminal::COUNT];
    let mut changed = true;
    while changed {
        changed = false;
        for prod in prods {
            for (i, sym) in prod.rhs.iter().enumerate() {
                let Symbol::Nonterminal(b) = *sym else {
                    continue;
                };
                let (first_beta, beta_nullable) = first_of_seq(&prod.rhs[i + 1..], first, nullable);
                let mut add = first_beta;
                if beta_nullable {
                    add.extend(follow[usize::from(prod.lhs)].iter().copied());
                }
                for t in add {
                    if follow[usize::from(b)].insert(t) {
                        changed = true;
                    }
                }
            }
        }
    }
    follow
}

/// An LL(1) parse table: nonterminal × lookahead → production.
#[derive(Debug, Clone)]
pub struct ParseTable {
    prods: &'static [Production],
    cells: [[Option<usize>; TokenKind::COUNT]; NonTerminal::COUNT],
    first: Vec<TokenSet>,
    nullable: Vec<bool>,
    follow: Vec<TokenSet>,
}

impl ParseTable {
    /// Builds the table for `prods`.
    ///
    /// Production `A -> α` is entered at `(A, t)` for every `t` in FIRST(α),
    /// and, when α is nullable, for every `t` in FOLLOW(A).
    ///
    /// # Errors
    /// Returns [`GrammarError`] when two productions claim the same cell.
    pub fn build(prods: &'static [Production]) -> Result<Self, GrammarError> {
        let (first, nullable) = first_sets(prods);
        let follow = follow_sets(prods, &first, &nullable);
        let mut cells: [[Option<usize>; TokenKind::COUNT]; NonTerminal::COUNT] =
            [[None; TokenKind::COUNT]; NonTerminal::COUNT];

        for (index, prod) in prods.iter().enumerate() {
            let (mut lookaheads, rhs_nullable) = first_of_seq(prod.rhs, &first, &nullable);
            if rhs_nullable {
                lookaheads.extend(follow[usize::from(prod.lhs)].iter().copied());
            }
            for t in lookaheads {
                let cell = &mut cells[usize::from(prod.lhs)][usize::from(t)];
                match *cell {
                    Some(other) if other != index => {
                        return Err(GrammarError {
                            nonterminal: prod.lhs,
                            lookahead: t,
                            first: prods[other].id,
                            second: prod.id,
                        });
                    }
                    _ => *cell = Some(index),
                }
            }
        }

        log::debug!(
            "built LL(1) table for {} productions, {} cells filled",
            prods.len(),
            cells.iter().flatten().filter(|c| c.is_some()).count()
        );

        Ok(Self {
            prods,
            cells,
            first,
            nullable,
            follow,
        })
    }

    /// The production to expand `nonterminal` with on `lookahead`, if any.
    #[inline]
    pub fn lookup(&self, nonterminal: NonTerminal, lookahead: TokenKind) -> Option<&'static Production> {
        self.cells[usize::from(nonterminal)][usize::from(lookahead)].map(|i| &self.prods[i])
    }

    pub fn productions(&self) -> &'static [Production] {
        self.prods
    }

    pub fn first(&self, nonterminal: NonTerminal) -> &TokenSet {
        &self.first[usize::from(nonterminal)]
    }

    pub fn nullable(&self, nonterminal: NonTerminal) -> bool {
        self.nullable[usize::from(nonterminal)]
    }

    pub fn follow(&self, nonterminal: NonTerminal) -> &TokenSet {
        &self.follow[usize::from(nonterminal)]
    }

    /// Writes productions, FIRST/FOLLOW sets and the table itself.
    ///
    /// # Output Format
    /// ```text
    /// P,<index>,<lhs> -> <rhs>
    /// FIRST,<nonterminal>,{<kinds>}
    /// FOLLOW,<nonterminal>,{<kinds>}
    /// T,<nonterminal>,<kind>,<index>
    /// ```
    pub fn write<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "PS,{}", self.prods.len())?;
        for (i, prod) in self.prods.iter().enumerate() {
            writeln!(out, "P,{},{}", i, prod)?;
        }
        writeln!(out)?;

        for n in NonTerminal::ALL {
            write!(out, "FIRST,{},{{", n)?;
            if self.nullable(n) {
                write!(out, "ε, ")?;
            }
            for t in self.first(n) {
                write!(out, "{}, ", t)?;
            }
            writeln!(out, "}}")?;
        }
        for n in NonTerminal::ALL {
            write!(out, "FOLLOW,{},{{", n)?;
            for t in self.follow(n) {
                write!(out, "{}, ", t)?;
            }
            writeln!(out, "}}")?;
        }
        writeln!(out)?;

        for n in NonTerminal::ALL {
            for t in TokenKind::ALL {
                if let Some(i) = self.cells[usize::from(n)][usize::from(t)] {
                    writeln!(out, "T,{},{},{}", n, t, i)?;
                }
            }
        }
        Ok(())
    }
}
