//! Maps from symbols to their types, tags, rewrite rules, and decision trees.

use crate::error::{Error, SigError};
use crate::term::RTerm;
use crate::tree::Tree;
use crate::{Matrix, Rule, Symbol};
use alloc::vec::Vec;

/// Immutable HashMap for fast cloning of signatures.
type FnvHashMap<K, V> = im::hashmap::HashMap<K, V, fnv::FnvBuildHasher>;

/// How a symbol may participate in rewriting.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Tag {
    /// no rewrite rules may be attached
    Const,
    /// rewrite rules may be attached
    Defn,
    /// like `Defn`, and declared to satisfy
    /// `s a1 ... an ≡ s b1 ... bn` only if `ai ≡ bi` for all `i`
    Injt,
}

impl Tag {
    pub fn rewritable(self) -> bool {
        !matches!(self, Self::Const)
    }
}

/// Map from symbols to their types, tags, rewrite rules, and decision trees.
///
/// The decision tree of a symbol is recompiled
/// whenever its set of rules changes.
#[derive(Clone, Default)]
pub struct Sig<'s> {
    types: FnvHashMap<Symbol<'s>, RTerm<'s>>,
    tags: FnvHashMap<Symbol<'s>, Tag>,
    rules: FnvHashMap<Symbol<'s>, Vec<Rule<'s>>>,
    trees: FnvHashMap<Symbol<'s>, Tree<'s>>,
}

impl<'s> Sig<'s> {
    /// Construct an empty signature.
    pub fn new() -> Self {
        Default::default()
    }

    /// Return the type of a symbol.
    pub fn get_type(&self, sym: &Symbol<'s>) -> Option<&RTerm<'s>> {
        self.types.get(sym)
    }

    pub fn get_tag(&self, sym: &Symbol<'s>) -> Option<Tag> {
        self.tags.get(sym).copied()
    }

    /// Has the symbol been declared injective?
    pub fn injective(&self, sym: &Symbol<'s>) -> bool {
        self.get_tag(sym) == Some(Tag::Injt)
    }

    /// Return the rewrite rules whose left-hand side head is the given symbol.
    pub fn get_rules(&self, sym: &Symbol<'s>) -> Option<&Vec<Rule<'s>>> {
        self.rules.get(sym)
    }

    /// Return the decision tree compiled from the rules of the symbol.
    pub fn get_tree(&self, sym: &Symbol<'s>) -> Option<&Tree<'s>> {
        self.trees.get(sym)
    }

    /// Introduce a new symbol with the given type and tag.
    pub fn insert(&mut self, sym: Symbol<'s>, ty: RTerm<'s>, tag: Tag) -> Result<(), SigError> {
        if self.types.insert(sym, ty).is_some() {
            return Err(SigError::Reintroduction);
        }
        self.tags.insert(sym, tag);
        if tag.rewritable() {
            self.rules.insert(sym, Vec::new());
        }
        Ok(())
    }

    /// Add a rewrite rule to an existing symbol and recompile its decision tree.
    ///
    /// The rule is assumed to have been checked
    /// (see [`check_rule`](crate::sr::check_rule)) *before* this call.
    pub fn add_rule(&mut self, sym: Symbol<'s>, rule: Rule<'s>) -> Result<(), Error> {
        let rules = self
            .rules
            .get_mut(&sym)
            .ok_or(Error::Sig(SigError::NonRewritable))?;
        rules.push(rule);
        let tree = Matrix::of_rules(rules).compile()?;
        self.trees.insert(sym, tree);
        Ok(())
    }
}
