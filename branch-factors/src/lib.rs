//! Copyright (c) 2005–2025 IKH Software, Inc.
//!
//! Released under the terms of the GNU Lesser General Public License, version 3.0
//! or (at your option) any later version (LGPL-3.0-or-later).
//!
//! Counts branching constructs per function in Rust source.
//!
//! The source is parsed with [`syn`] and every function body is walked with a
//! flat depth-first [`Visit`]or. Each of the following adds one unit,
//! regardless of how deeply it is nested:
//!
//! - `if` and `if let` (every `else if` is its own `if`),
//! - `while`, `loop` and `for`,
//! - `match`,
//! - `let ... else`,
//! - `break` and `continue`.
//!
//! Closures are part of the function that contains them. Items nested in a
//! body, such as inner `fn`s, are not counted.
//!
//! Keys are the function name for free functions, `Type::method` for
//! inherent methods, `<Type as Trait>::method` for trait impl methods and
//! `Trait::method` for default methods in trait definitions.
//! Functions inside inline `mod` blocks are prefixed with their module path,
//! as in `tests::setup`.
//!
//! ```rust
//! let src = "fn f(x: u8) { if x > 1 { for _ in 0..x {} } }";
//! let factors = branch_factors::compute_branch_factors(src).unwrap();
//! assert_eq!(factors["f"], 2);
//! ```

use std::collections::BTreeMap;
use syn::visit::{self, Visit};
use syn::{Block, ImplItem, Item, Path, TraitItem, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum BranchError {
    #[error("source does not parse: {0}")]
    Parse(#[from] syn::Error),
}

/// Maps every function in `source` to the number of branching constructs in
/// its body.
///
/// # Errors
/// [`BranchError::Parse`] if `source` is not a valid Rust file.
pub fn compute_branch_factors(source: &str) -> Result<BTreeMap<String, usize>, BranchError> {
    let file = syn::parse_file(source)?;
    let mut factors = BTreeMap::new();
    collect(&file.items, "", &mut factors);
    Ok(factors)
}

/// Records the functions among `items`, keyed under the module path `scope`.
fn collect(items: &[Item], scope: &str, factors: &mut BTreeMap<String, usize>) {
    for item in items {
        match item {
            Item::Fn(f) => record(factors, format!("{}{}", scope, f.sig.ident), &f.block),
            Item::Impl(imp) => {
                let ty = type_name(&imp.self_ty);
                let prefix = match &imp.trait_ {
                    Some((_, path, _)) => format!("{}<{} as {}>", scope, ty, path_name(path)),
                    None => format!("{}{}", scope, ty),
                };
                for impl_item in &imp.items {
                    if let ImplItem::Fn(m) = impl_item {
                        record(factors, format!("{}::{}", prefix, m.sig.ident), &m.block);
                    }
                }
            }
            Item::Trait(t) => {
                for trait_item in &t.items {
                    if let TraitItem::Fn(m) = trait_item {
                        if let Some(block) = &m.default {
                            record(factors, format!("{}{}::{}", scope, t.ident, m.sig.ident), block);
                        }
                    }
                }
            }
            Item::Mod(m) => {
                if let Some((_, items)) = &m.content {
                    collect(items, &format!("{}{}::", scope, m.ident), factors);
                }
            }
            _ => {}
        }
    }
}

fn record(factors: &mut BTreeMap<String, usize>, name: String, block: &Block) {
    let mut counter = BranchCounter::default();
    counter.visit_block(block);
    log::debug!("{}: {} branch(es)", name, counter.count);
    if factors.insert(name, counter.count).is_some() {
        log::debug!("duplicate function, keeping the later definition");
    }
}

fn path_name(path: &Path) -> String {
    path.segments
        .last()
        .map_or_else(|| "_".to_string(), |seg| seg.ident.to_string())
}

fn type_name(ty: &Type) -> String {
    match ty {
        Type::Path(tp) => path_name(&tp.path),
        Type::Reference(r) => type_name(&r.elem),
        Type::Paren(p) => type_name(&p.elem),
        Type::Group(g) => type_name(&g.elem),
        _ => "_".to_string(),
    }
}

#[derive(Debug, Default)]
struct BranchCounter {
    count: usize,
}

impl<'ast> Visit<'ast> for BranchCounter {
    // Nested items are separate functions, not part of this body.
    fn visit_item(&mut self, _: &'ast Item) {}

    fn visit_expr_if(&mut self, node: &'ast syn::ExprIf) {
        self.count += 1;
        visit::visit_expr_if(self, node);
    }

    fn visit_expr_while(&mut self, node: &'ast syn::ExprWhile) {
        self.count += 1;
        visit::visit_expr_while(self, node);
    }

    fn visit_expr_loop(&mut self, node: &'ast syn::ExprLoop) {
        self.count += 1;
        visit::visit_expr_loop(self, node);
    }

    fn visit_expr_for_loop(&mut self, node: &'ast syn::ExprForLoop) {
        self.count += 1;
        visit::visit_expr_for_loop(self, node);
    }

    fn visit_expr_match(&mut self, node: &'ast syn::ExprMatch) {
        self.count += 1;
        visit::visit_expr_match(self, node);
    }

    fn visit_expr_break(&mut self, node: &'ast syn::ExprBreak) {
        self.count += 1;
        visit::visit_expr_break(self, node);
    }

    fn visit_expr_continue(&mut self, node: &'ast syn::ExprContinue) {
        self.count += 1;
        visit::visit_expr_continue(self, node);
    }

    fn visit_local(&mut self, node: &'ast syn::Local) {
        if node.init.as_ref().is_some_and(|init| init.diverge.is_some()) {
            self.count += 1;
        }
        visit::visit_local(self, node);
    }
}
