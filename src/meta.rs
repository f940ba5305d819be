//! Metavariables.

use crate::subst::Binder;
use crate::term::{Arg, RTerm, Term};
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt::{self, Display};

/// Pointer to a shared metavariable.
///
/// Metavariables are stored by stable identity;
/// their types may refer to earlier metavariables through this pointer,
/// forming a DAG that is never deep-cloned.
pub type RMeta<'s> = Rc<Meta<'s>>;

/// Metavariable.
pub struct Meta<'s> {
    key: usize,
    name: Option<String>,
    arity: usize,
    ty: RefCell<Term<'s>>,
    /// instantiation slot, written at most once (by the unifier)
    value: RefCell<Option<Binder<'s>>>,
}

impl<'s> Meta<'s> {
    pub fn key(&self) -> usize {
        self.key
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn ty(&self) -> Term<'s> {
        self.ty.borrow().clone()
    }

    pub fn value(&self) -> Option<Binder<'s>> {
        self.value.borrow().clone()
    }

    /// Fill the instantiation slot of the metavariable.
    ///
    /// Instantiation is monotonic; a second write to the same slot is ignored.
    pub fn instantiate(&self, b: Binder<'s>) {
        let mut value = self.value.borrow_mut();
        if value.is_none() {
            *value = Some(b)
        }
    }
}

/// Metavariables are identified by key.
impl<'s> PartialEq for Meta<'s> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<'s> Eq for Meta<'s> {}

impl<'s> Display for Meta<'s> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "?{}", name),
            None => write!(f, "?{}", self.key),
        }
    }
}

impl<'s> core::fmt::Debug for Meta<'s> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "?{}/{}", self.key, self.arity)
    }
}

/// Supply of fresh metavariables.
///
/// This replaces a process-wide counter;
/// it is passed explicitly to everything that introduces metavariables.
#[derive(Default)]
pub struct Metas {
    next: usize,
}

impl Metas {
    pub fn new() -> Self {
        Default::default()
    }

    /// Create a fresh metavariable of the given type and arity.
    pub fn fresh<'s>(&mut self, ty: Term<'s>, arity: usize) -> RMeta<'s> {
        self.fresh_named(None, ty, arity)
    }

    pub fn fresh_named<'s>(
        &mut self,
        name: Option<String>,
        ty: Term<'s>,
        arity: usize,
    ) -> RMeta<'s> {
        let key = self.next;
        self.next += 1;
        Rc::new(Meta {
            key,
            name,
            arity,
            ty: RefCell::new(ty),
            value: RefCell::new(None),
        })
    }
}

/// Construct the type `∀ (x1 : A1) ... (xk : Ak), A{k+1}` of
/// a fresh metavariable of arity `k`,
/// in which every domain `Ai` is a fresh metavariable
/// applied to the variables `x1, ..., x{i-1}`.
///
/// The metavariable behind `Ai` has arity `i - 1` and type
/// `∀ (x1 : A1) ... (x{i-1} : A{i-1}), Type`, so that
/// the type of every introduced metavariable refers only to earlier ones.
pub fn build_meta_type<'s>(metas: &mut Metas, k: usize) -> Term<'s> {
    let var_env = |i: usize| (0..i).rev().map(|j| RTerm::new(Term::BVar(j))).collect();
    // doms[i] is the domain A{i+1}, valid under i binders
    let mut doms: Vec<Term<'s>> = Vec::with_capacity(k);
    for i in 0..k {
        let ty = prods(&doms, Term::Type);
        let m = metas.fresh(ty, i);
        doms.push(Term::Meta(m, var_env(i)));
    }
    let ty = prods(&doms, Term::Type);
    let m = metas.fresh(ty, k);
    prods(&doms, Term::Meta(m, var_env(k)))
}

/// Wrap a term in products over the given domains.
fn prods<'s>(doms: &[Term<'s>], tm: Term<'s>) -> Term<'s> {
    doms.iter().enumerate().rev().fold(tm, |acc, (i, dom)| {
        let id = Rc::new(alloc::format!("x{}", i + 1));
        let arg = Arg::new(id, RTerm::new(dom.clone()));
        Term::Prod(arg, RTerm::new(acc))
    })
}
