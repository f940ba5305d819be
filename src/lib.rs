#![no_std]
#![forbid(unsafe_code)]

//! Rewrite-rule engine for the lambda-Pi calculus modulo rewriting.
//!
//! This library implements the two rule-processing passes
//! at the heart of a proof checker for
//! the lambda-Pi calculus modulo user-defined rewrite rules:
//!
//! * *Subject-reduction checking*
//!   ([`sr::check_rule`]):
//!   verify that every well-typed instance of a rule's left-hand side
//!   has the same type as the corresponding instance of its right-hand side.
//!   Type inference and unification are consumed as oracles
//!   through the [`Solver`] trait.
//! * *Decision-tree compilation*
//!   ([`Matrix::compile`]):
//!   translate the set of rules of a symbol into
//!   a deterministic matching automaton
//!   in the style of Maranget's
//!   "Compiling Pattern Matching to Good Decision Trees" (ML 2008),
//!   so that rewriting dispatches on a compact tree of column tests
//!   instead of scanning patterns sequentially.
//!
//! Rules are checked *before* they are added to the signature [`Sig`],
//! which recompiles the decision tree of a symbol
//! whenever its set of rules changes.
//!
//! The following example introduces a symbol `neg` with
//! the rules `neg true ⟶ false` and `neg false ⟶ true`,
//! checks the rules, and compiles them to a decision tree.
//! (This example, like all code examples in this library,
//! can be executed by running `cargo test`.)
//!
//! ~~~
//! use colosseum::unsync::Arena;
//! use reskribo::solve::{Constraint, Ctx};
//! use reskribo::term::Arg;
//! use reskribo::{sr, symbol, Symbols};
//! use reskribo::{Metas, RTerm, Rhs, Rule, Sig, Solver, Tag, Term};
//! use std::rc::Rc;
//!
//! // The inference and unification oracles live outside of this crate;
//! // a solver that cannot type anything accepts every rule as vacuous.
//! struct Untyped;
//!
//! impl<'s> Solver<'s> for Untyped {
//!     fn infer(
//!         &mut self,
//!         _: &Sig<'s>,
//!         _: &mut Ctx<'s>,
//!         _: &Term<'s>,
//!     ) -> Option<(Term<'s>, Vec<Constraint<'s>>)> {
//!         None
//!     }
//!
//!     fn check(
//!         &mut self,
//!         _: &Sig<'s>,
//!         _: &mut Ctx<'s>,
//!         _: &Term<'s>,
//!         _: &Term<'s>,
//!     ) -> Vec<Constraint<'s>> {
//!         Vec::new()
//!     }
//!
//!     fn solve(
//!         &mut self,
//!         _: &Sig<'s>,
//!         problems: Vec<Constraint<'s>>,
//!     ) -> Option<Vec<Constraint<'s>>> {
//!         Some(problems)
//!     }
//!
//!     fn eq_modulo(&self, _: &Sig<'s>, tm1: &Term<'s>, tm2: &Term<'s>) -> bool {
//!         tm1 == tm2
//!     }
//! }
//!
//! let arena = Arena::new();
//! let mut syms = Symbols::new();
//! let owned = |name: &str| symbol::Owned::new(name.into());
//!
//! let bool_ = syms.insert("bool".into(), arena.alloc(owned("bool")))?;
//! let true_ = syms.insert("true".into(), arena.alloc(owned("true")))?;
//! let false_ = syms.insert("false".into(), arena.alloc(owned("false")))?;
//! let neg = syms.insert("neg".into(), arena.alloc(owned("neg")))?;
//!
//! let ty = |sym| RTerm::new(Term::Symb(sym));
//! let neg_ty = Term::Prod(Arg::new(Rc::new("x".into()), ty(bool_)), ty(bool_));
//!
//! let mut sig = Sig::new();
//! sig.insert(bool_, RTerm::new(Term::Type), Tag::Const)?;
//! sig.insert(true_, ty(bool_), Tag::Const)?;
//! sig.insert(false_, ty(bool_), Tag::Const)?;
//! sig.insert(neg, RTerm::new(neg_ty), Tag::Defn)?;
//!
//! // neg true ⟶ false, neg false ⟶ true
//! let rule = |lhs, rhs| Rule {
//!     lhs: vec![lhs],
//!     rhs: Rhs { arity: 0, body: rhs },
//!     pos: None,
//! };
//! let rules = [
//!     rule(Term::Symb(true_), Term::Symb(false_)),
//!     rule(Term::Symb(false_), Term::Symb(true_)),
//! ];
//!
//! let mut metas = Metas::new();
//! for r in rules {
//!     // check the rule before adding it to the signature
//!     sr::check_rule(&mut Untyped, &sig, &mut metas, neg, &r)?;
//!     sig.add_rule(neg, r)?;
//! }
//!
//! // the compiled tree dispatches on the first argument of `neg`
//! let tree = sig.get_tree(&neg).unwrap();
//! assert_eq!(tree.leaves(), 2);
//! # Ok::<_, reskribo::Error>(())
//! ~~~

extern crate alloc;
#[macro_use]
extern crate log;

mod app;
pub mod error;
mod matrix;
pub mod meta;
pub mod rule;
mod sig;
pub mod solve;
pub mod sr;
mod stack;
mod subst;
pub mod symbol;
mod symbols;
pub mod term;
mod tree;

pub use error::Error;
pub use matrix::Matrix;
pub use meta::{Meta, Metas, RMeta};
pub use rule::{Pos, Rhs, Rule};
pub use sig::{Sig, Tag};
pub use solve::Solver;
pub use stack::Stack;
pub use subst::Binder;
pub use symbol::Symbol;
pub use symbols::Symbols;
pub use term::{RTerm, Term};
pub use tree::Tree;
