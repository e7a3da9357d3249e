//! # term
//!
//! A hash-consing arena of first-order terms built on [`indexmap::IndexSet`].
//!
//! Every distinct term value is stored exactly once. A node's key is its
//! variant together with its name or literal and, for compounds, the handles
//! of its functor and arguments. Because arguments are always interned
//! before the compound that holds them, equal handles mean equal subterms,
//! so the structural key of a compound is canonical without ever hashing
//! whole subtrees. The node's position in the set is its [`TermId`].
//!
//! ## Example
//! ```rust
//! # use ll_terms::term::{TermStore, View};
//! let mut store = TermStore::new();
//! let f = store.atom("f");
//! let x = store.variable("X").unwrap();
//! let t1 = store.compound(f, &[x, x]).unwrap();
//! let t2 = store.compound(f, &[x, x]).unwrap();
//! assert_eq!(t1, t2); // same node, not just an equal one
//! assert_eq!(store.display(t1).to_string(), "f(X, X)");
//! assert!(matches!(store.view(t1).unwrap(), View::Compound { args, .. } if args == [x, x]));
//! ```

use crate::error::StoreError;
use crate::lexer::tokenize;
use crate::token::TokenKind;
use indexmap::IndexSet;
use smartstring::alias::String;
use std::collections::HashSet;
use std::fmt;

/// Handle of a term inside a [`TermStore`].
///
/// Handles are only meaningful for the store that issued them. Within one
/// store, handle equality is term identity, and therefore also structural
/// equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TermId(usize);

impl TermId {
    /// Position of the node in its store's arena.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A stored term node. Compound children are handles into the same store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Node {
    Atom(String),
    Number(String),
    Variable(String),
    Compound {
        functor: TermId,
        args: Box<[TermId]>,
    },
}

impl Node {
    /// Borrows this node as a [`View`].
    pub fn view(&self) -> View<'_> {
        match self {
            Node::Atom(name) => View::Atom(name.as_str()),
            Node::Number(literal) => View::Number(literal.as_str()),
            Node::Variable(name) => View::Variable(name.as_str()),
            Node::Compound { functor, args } => View::Compound {
                functor: *functor,
                args: &args[..],
            },
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            Node::Atom(_) => "atom",
            Node::Number(_) => "number",
            Node::Variable(_) => "variable",
            Node::Compound { .. } => "compound",
        }
    }
}

/// A borrowed, read-only view of one term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View<'a> {
    Atom(&'a str),
    Number(&'a str),
    Variable(&'a str),
    /// `functor` always views as [`View::Atom`]; `args` is never empty.
    Compound {
        functor: TermId,
        args: &'a [TermId],
    },
}

/// Owner of all term nodes produced by one or more parses.
#[derive(Debug, Clone, Default)]
pub struct TermStore {
    nodes: IndexSet<Node>,
}

impl TermStore {
    /// Creates a new, empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct terms in the store.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the handle of `node`, inserting it if no equal node exists.
    ///
    /// Callers guarantee that compound children belong to this store, that
    /// the functor is an atom and that `args` is non-empty.
    pub(crate) fn intern(&mut self, node: Node) -> TermId {
        let (index, inserted) = self.nodes.insert_full(node);
        if inserted {
            log::trace!("INTERN new #{}", index);
        } else {
            log::trace!("INTERN reuse #{}", index);
        }
        TermId(index)
    }

    /// Node behind a handle this store issued.
    pub(crate) fn node(&self, id: TermId) -> &Node {
        &self.nodes[id.0]
    }

    /// Node behind `id`, or `None` for a foreign handle.
    pub fn get(&self, id: TermId) -> Option<&Node> {
        self.nodes.get_index(id.0)
    }

    fn checked(&self, id: TermId) -> Result<&Node, StoreError> {
        self.get(id).ok_or(StoreError::InvalidHandle {
            index: id.0,
            len: self.nodes.len(),
        })
    }

    /// Interns the atom `name`. Any name is valid; names that are not plain
    /// lowercase identifiers display quoted.
    pub fn atom(&mut self, name: impl AsRef<str>) -> TermId {
        self.intern(Node::Atom(String::from(name.as_ref())))
    }

    /// Interns a number literal, kept in its lexical form.
    ///
    /// # Errors
    /// [`StoreError::InvalidNumber`] if `literal` is not a single number token.
    pub fn number(&mut self, literal: impl AsRef<str>) -> Result<TermId, StoreError> {
        let literal = literal.as_ref();
        if !is_single_token(literal, TokenKind::Number) {
            return Err(StoreError::InvalidNumber(literal.into()));
        }
        Ok(self.intern(Node::Number(literal.into())))
    }

    /// Interns a variable.
    ///
    /// # Errors
    /// [`StoreError::InvalidVariable`] if `name` is not a single variable token.
    pub fn variable(&mut self, name: impl AsRef<str>) -> Result<TermId, StoreError> {
        let name = name.as_ref();
        if !is_single_token(name, TokenKind::Variable) {
            return Err(StoreError::InvalidVariable(name.into()));
        }
        Ok(self.intern(Node::Variable(name.into())))
    }

    /// Interns the compound `functor(args...)`.
    ///
    /// # Errors
    /// - [`StoreError::InvalidHandle`] if any handle is foreign to this store,
    /// - [`StoreError::FunctorNotAtom`] if `functor` is not an atom,
    /// - [`StoreError::EmptyArgs`] if `args` is empty.
    pub fn compound(&mut self, functor: TermId, args: &[TermId]) -> Result<TermId, StoreError> {
        let name = match self.checked(functor)? {
            Node::Atom(name) => name.clone(),
            other => {
                return Err(StoreError::FunctorNotAtom {
                    name: self.display(functor).to_string().into(),
                    found: other.kind_name(),
                });
            }
        };
        if args.is_empty() {
            return Err(StoreError::EmptyArgs { functor: name });
        }
        for &arg in args {
            self.checked(arg)?;
        }
        Ok(self.intern(Node::Compound {
            functor,
            args: args.into(),
        }))
    }

    /// Returns a read-only view of `id`.
    pub fn view(&self, id: TermId) -> Result<View<'_>, StoreError> {
        self.checked(id).map(Node::view)
    }

    /// Name of an atom, or of a compound's functor.
    pub fn functor_name(&self, id: TermId) -> Result<&str, StoreError> {
        match self.checked(id)? {
            Node::Atom(name) => Ok(name.as_str()),
            Node::Compound { functor, .. } => self.functor_name(*functor),
            other => Err(StoreError::FunctorNotAtom {
                name: self.display(id).to_string().into(),
                found: other.kind_name(),
            }),
        }
    }

    /// Number of arguments; zero for everything but compounds.
    pub fn arity(&self, id: TermId) -> Result<usize, StoreError> {
        Ok(self.args(id)?.len())
    }

    /// Arguments of a compound; empty for everything else.
    pub fn args(&self, id: TermId) -> Result<&[TermId], StoreError> {
        match self.checked(id)? {
            Node::Compound { args, .. } => Ok(&args[..]),
            _ => Ok(&[]),
        }
    }

    /// Canonical text of `id`, suitable for reparsing.
    pub fn display(&self, id: TermId) -> TermDisplay<'_> {
        TermDisplay { store: self, id }
    }

    /// Compares `a` in this store with `b` in `other` by value.
    ///
    /// Within a single store this is handle equality. Across stores each
    /// pair of handles is compared once, however often it is shared.
    pub fn structural_eq(&self, a: TermId, other: &TermStore, b: TermId) -> bool {
        if std::ptr::eq(self, other) {
            return a == b;
        }
        let mut pending = vec![(a, b)];
        let mut seen = HashSet::new();
        while let Some((a, b)) = pending.pop() {
            if !seen.insert((a, b)) {
                continue;
            }
            match (self.get(a), other.get(b)) {
                (Some(Node::Atom(x)), Some(Node::Atom(y)))
                | (Some(Node::Number(x)), Some(Node::Number(y)))
                | (Some(Node::Variable(x)), Some(Node::Variable(y))) => {
                    if x != y {
                        return false;
                    }
                }
                (
                    Some(Node::Compound { functor: f1, args: a1 }),
                    Some(Node::Compound { functor: f2, args: a2 }),
                ) => {
                    if a1.len() != a2.len() {
                        return false;
                    }
                    pending.push((*f1, *f2));
                    pending.extend(a1.iter().copied().zip(a2.iter().copied()));
                }
                _ => return false,
            }
        }
        true
    }

    /// Current length, to [`rollback`](Self::rollback) to later.
    pub fn checkpoint(&self) -> usize {
        self.nodes.len()
    }

    /// Discards every node interned after `checkpoint`.
    ///
    /// Nodes only ever refer to older nodes, so the remaining store stays
    /// closed under its handles.
    pub fn rollback(&mut self, checkpoint: usize) {
        if checkpoint < self.nodes.len() {
            log::debug!(
                "rolling back {} term(s)",
                self.nodes.len() - checkpoint
            );
            self.nodes.truncate(checkpoint);
        }
    }
}

fn is_single_token(text: &str, kind: TokenKind) -> bool {
    match tokenize(text) {
        Ok(toks) => toks.len() == 2 && toks[0].kind == kind && toks[0].text.as_str() == text,
        Err(_) => false,
    }
}

/// True if `name` displays without quotes.
fn is_plain_atom(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

fn write_atom(f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
    if is_plain_atom(name) {
        return f.write_str(name);
    }
    f.write_str("'")?;
    for c in name.chars() {
        match c {
            '\'' | '\\' => write!(f, "\\{}", c)?,
            c => write!(f, "{}", c)?,
        }
    }
    f.write_str("'")
}

/// Displays a term in canonical form: `f(a, 'b c', X, 42)`.
pub struct TermDisplay<'a> {
    store: &'a TermStore,
    id: TermId,
}

/// Pending output while displaying a term.
enum Step {
    Term(TermId),
    Text(&'static str),
}

impl fmt::Display for TermDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut steps = vec![Step::Term(self.id)];
        while let Some(step) = steps.pop() {
            let id = match step {
                Step::Text(text) => {
                    f.write_str(text)?;
                    continue;
                }
                Step::Term(id) => id,
            };
            match self.store.get(id).ok_or(fmt::Error)? {
                Node::Atom(name) => write_atom(f, name)?,
                Node::Number(literal) => f.write_str(literal)?,
                Node::Variable(name) => f.write_str(name)?,
                Node::Compound { functor, args } => {
                    let name = match self.store.get(*functor).ok_or(fmt::Error)? {
                        Node::Atom(name) => name,
                        _ => return Err(fmt::Error),
                    };
                    write_atom(f, name)?;
                    f.write_str("(")?;
                    steps.push(Step::Text(")"));
                    for (i, arg) in args.iter().enumerate().rev() {
                        steps.push(Step::Term(*arg));
                        if i > 0 {
                            steps.push(Step::Text(", "));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

impl fmt::Debug for TermDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TermDisplay({:?}, {})", self.id, self)
    }
}

/// The result of a successful parse: a root handle and the store owning it.
#[derive(Debug, Clone)]
pub struct ParsedTerm {
    store: TermStore,
    root: TermId,
}

impl ParsedTerm {
    pub(crate) fn new(store: TermStore, root: TermId) -> Self {
        Self { store, root }
    }

    pub fn root(&self) -> TermId {
        self.root
    }

    pub fn store(&self) -> &TermStore {
        &self.store
    }

    /// View of the root term.
    pub fn view(&self) -> View<'_> {
        // The root was issued by this store.
        self.store.node(self.root).view()
    }

    pub fn into_parts(self) -> (TermStore, TermId) {
        (self.store, self.root)
    }
}

impl PartialEq for ParsedTerm {
    fn eq(&self, other: &Self) -> bool {
        self.store
            .structural_eq(self.root, &other.store, other.root)
    }
}

impl Eq for ParsedTerm {}

impl fmt::Display for ParsedTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.store.display(self.root), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_store_is_empty() {
        let store = TermStore::new();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn leaves_are_interned_once() {
        let mut store = TermStore::new();
        let a1 = store.atom("a");
        let a2 = store.atom("a");
        let x1 = store.variable("X").unwrap();
        let x2 = store.variable("X").unwrap();
        let n1 = store.number("42").unwrap();
        let n2 = store.number("42").unwrap();
        assert_eq!(a1, a2);
        assert_eq!(x1, x2);
        assert_eq!(n1, n2);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn same_text_different_variant_are_distinct() {
        let mut store = TermStore::new();
        let atom = store.atom("X");
        let var = store.variable("X").unwrap();
        assert_ne!(atom, var);
        assert_eq!(store.display(atom).to_string(), "'X'");
        assert_eq!(store.display(var).to_string(), "X");
    }

    #[test]
    fn numbers_keep_lexical_form() {
        let mut store = TermStore::new();
        let a = store.number("1.0").unwrap();
        let b = store.number("1.00").unwrap();
        assert_ne!(a, b);
        assert_eq!(store.view(a).unwrap(), View::Number("1.0"));
    }

    #[test]
    fn compounds_share_structure() {
        let mut store = TermStore::new();
        let f = store.atom("f");
        let g = store.atom("g");
        let x = store.variable("X").unwrap();
        let gx1 = store.compound(g, &[x]).unwrap();
        let gx2 = store.compound(g, &[x]).unwrap();
        assert_eq!(gx1, gx2);
        let t = store.compound(f, &[gx1, gx2]).unwrap();
        let View::Compound { functor, args } = store.view(t).unwrap() else {
            panic!("expected compound");
        };
        assert_eq!(functor, f);
        assert_eq!(args[0], args[1]);
        assert_eq!(store.arity(t).unwrap(), 2);
        assert_eq!(store.functor_name(t).unwrap(), "f");
    }

    #[test]
    fn argument_order_matters() {
        let mut store = TermStore::new();
        let f = store.atom("f");
        let a = store.atom("a");
        let b = store.atom("b");
        let ab = store.compound(f, &[a, b]).unwrap();
        let ba = store.compound(f, &[b, a]).unwrap();
        assert_ne!(ab, ba);
    }

    #[test]
    fn functor_must_be_atom() {
        let mut store = TermStore::new();
        let x = store.variable("X").unwrap();
        let err = store.compound(x, &[x]).unwrap_err();
        assert!(matches!(err, StoreError::FunctorNotAtom { found: "variable", .. }));
    }

    #[test]
    fn compound_needs_args() {
        let mut store = TermStore::new();
        let f = store.atom("f");
        let err = store.compound(f, &[]).unwrap_err();
        assert_eq!(
            err,
            StoreError::EmptyArgs {
                functor: "f".into()
            }
        );
    }

    #[test]
    fn foreign_handles_are_rejected() {
        let mut big = TermStore::new();
        for name in ["a", "b", "c", "d"] {
            big.atom(name);
        }
        let foreign = big.atom("e");
        let mut small = TermStore::new();
        let f = small.atom("f");
        assert!(matches!(
            small.compound(f, &[foreign]),
            Err(StoreError::InvalidHandle { index: 4, len: 1 })
        ));
        assert!(small.view(foreign).is_err());
        assert!(small.get(foreign).is_none());
    }

    #[test]
    fn invalid_leaf_text_is_rejected() {
        let mut store = TermStore::new();
        assert!(matches!(store.variable("x"), Err(StoreError::InvalidVariable(_))));
        assert!(matches!(store.variable("X Y"), Err(StoreError::InvalidVariable(_))));
        assert!(matches!(store.number("12a"), Err(StoreError::InvalidNumber(_))));
        assert!(matches!(store.number(""), Err(StoreError::InvalidNumber(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn leaves_have_no_args() {
        let mut store = TermStore::new();
        let a = store.atom("a");
        assert_eq!(store.arity(a).unwrap(), 0);
        assert!(store.args(a).unwrap().is_empty());
        assert_eq!(store.functor_name(a).unwrap(), "a");
        let n = store.number("7").unwrap();
        assert!(store.functor_name(n).is_err());
    }

    #[test]
    fn display_quotes_non_plain_atoms() {
        let mut store = TermStore::new();
        let cases = [
            ("foo", "foo"),
            ("fooBar_1", "fooBar_1"),
            ("hello world", "'hello world'"),
            ("", "''"),
            ("it's", r"'it\'s'"),
            (r"a\b", r"'a\\b'"),
            ("Upper", "'Upper'"),
            ("9lives", "'9lives'"),
        ];
        for (name, expected) in cases {
            let id = store.atom(name);
            assert_eq!(store.display(id).to_string(), expected);
        }
    }

    #[test]
    fn display_nested_compound() {
        let mut store = TermStore::new();
        let foo = store.atom("foo");
        let bar = store.atom("bar");
        let one = store.number("1").unwrap();
        let a = store.atom("a");
        let x = store.variable("X").unwrap();
        let bar_x = store.compound(bar, &[x]).unwrap();
        let t = store.compound(foo, &[one, a, bar_x]).unwrap();
        assert_eq!(store.display(t).to_string(), "foo(1, a, bar(X))");
    }

    #[test]
    fn structural_eq_across_stores() {
        let mut s1 = TermStore::new();
        let mut s2 = TermStore::new();
        // Different insertion order gives different handles.
        s2.atom("padding");
        let f1 = s1.atom("f");
        let y1 = s1.variable("Y").unwrap();
        let t1 = s1.compound(f1, &[y1]).unwrap();
        let y2 = s2.variable("Y").unwrap();
        let f2 = s2.atom("f");
        let t2 = s2.compound(f2, &[y2]).unwrap();
        assert_ne!(t1, t2);
        assert!(s1.structural_eq(t1, &s2, t2));
        let z2 = s2.variable("Z").unwrap();
        let u2 = s2.compound(f2, &[z2]).unwrap();
        assert!(!s1.structural_eq(t1, &s2, u2));
        assert!(!s1.structural_eq(f1, &s2, y2));
    }

    #[test]
    fn structural_eq_visits_shared_pairs_once() {
        fn doubling(store: &mut TermStore, depth: usize) -> TermId {
            let f = store.atom("f");
            let mut t = store.atom("x");
            for _ in 0..depth {
                t = store.compound(f, &[t, t]).unwrap();
            }
            t
        }
        let mut s1 = TermStore::new();
        let mut s2 = TermStore::new();
        s2.atom("padding");
        let t1 = doubling(&mut s1, 64);
        let t2 = doubling(&mut s2, 64);
        assert!(s1.structural_eq(t1, &s2, t2));
        let t3 = doubling(&mut s2, 63);
        assert!(!s1.structural_eq(t1, &s2, t3));
    }

    #[test]
    fn display_deep_term_without_recursion() {
        let mut store = TermStore::new();
        let g = store.atom("g");
        let mut t = store.number("0").unwrap();
        for _ in 0..100_000 {
            t = store.compound(g, &[t]).unwrap();
        }
        let text = store.display(t).to_string();
        assert!(text.starts_with("g(g(g("));
        assert!(text.ends_with("(0))))"));
        assert_eq!(text.len(), 100_000 * 3 + 1);
    }

    #[test]
    fn rollback_discards_newer_nodes() {
        let mut store = TermStore::new();
        let a = store.atom("a");
        let mark = store.checkpoint();
        let f = store.atom("f");
        store.compound(f, &[a]).unwrap();
        assert_eq!(store.len(), 3);
        store.rollback(mark);
        assert_eq!(store.len(), 1);
        assert_eq!(store.atom("a"), a);
        // Rolling back to a later mark is a no-op.
        store.rollback(10);
        assert_eq!(store.len(), 1);
    }
}
