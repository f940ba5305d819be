//! Shared terms for the lambda-Pi calculus with metavariables and rewrite patterns.

use crate::app::format as fmt_appl;
use crate::meta::RMeta;
use crate::Symbol;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt::{self, Display};

/// Pointer to a shared term.
#[derive(Clone, Debug)]
pub struct RTerm<'s>(Rc<Term<'s>>);

/// De Bruijn variable.
pub type DeBruijn = usize;

/// Argument of a binder.
///
/// The identifier is a display hint and
/// does not influence the equality of terms.
#[derive(Clone, Debug)]
pub struct Arg<Ty> {
    pub id: Rc<String>,
    pub ty: Ty,
}

/// Shared term for the lambda-Pi calculus.
///
/// Terms are immutable once constructed;
/// the only mutation ever observed through a term is
/// the (one-shot) instantiation of a metavariable and
/// the assignment of a transient reference,
/// both of which are resolved by [`unfold`](Self::unfold).
#[derive(Clone, Debug)]
pub enum Term<'s> {
    Kind,
    Type,
    Symb(Symbol<'s>),
    BVar(DeBruijn),
    Appl(RTerm<'s>, Vec<RTerm<'s>>),
    Abst(Arg<Option<RTerm<'s>>>, RTerm<'s>),
    Prod(Arg<RTerm<'s>>, RTerm<'s>),
    /// metavariable instance; the environment length equals the arity of the metavariable
    Meta(RMeta<'s>, Vec<RTerm<'s>>),
    /// pattern placeholder, legal only in rule left-hand sides
    Patt(Option<usize>, Rc<String>, Vec<RTerm<'s>>),
    /// pattern-variable environment reference, legal only in rule right-hand sides
    TEnv(usize, Vec<RTerm<'s>>),
    /// transient placeholder owned by the inference oracle
    Wild,
    /// transient reference owned by the inference oracle
    TRef(Rc<RefCell<Option<Term<'s>>>>),
}

impl<Ty> Arg<Ty> {
    pub fn new(id: Rc<String>, ty: Ty) -> Self {
        Self { id, ty }
    }

    pub fn map_type<U>(self, f: impl FnOnce(Ty) -> U) -> Arg<U> {
        Arg::new(self.id, f(self.ty))
    }
}

impl<'s> Term<'s> {
    /// Resolve instantiated metavariables and assigned transient references at the head.
    ///
    /// Every head inspection performed in this crate goes through this function.
    pub fn unfold(self) -> Self {
        match self {
            Self::Meta(m, env) => match m.value() {
                Some(b) => b.msubst(&env).unfold(),
                None => Self::Meta(m, env),
            },
            Self::TRef(r) => {
                let tm = r.borrow().clone();
                match tm {
                    Some(tm) => tm.unfold(),
                    None => Self::TRef(r),
                }
            }
            _ => self,
        }
    }

    /// Apply some terms to the term, flattening application spines.
    pub fn apply(self, mut args: Vec<RTerm<'s>>) -> Self {
        if args.is_empty() {
            return self;
        }
        match self {
            Self::Appl(head, mut args1) => {
                args1.append(&mut args);
                Self::Appl(head, args1)
            }
            _ => Self::Appl(RTerm::new(self), args),
        }
    }

    /// Split a term into its head and the arguments it is applied to.
    ///
    /// This unfolds the term at every application head, so that
    /// the returned head is neither an application nor an instantiated metavariable.
    pub fn get_args(self) -> (Self, Vec<RTerm<'s>>) {
        let mut args = Vec::new();
        let mut head = self;
        loop {
            head = head.unfold();
            match head {
                Self::Appl(h, mut args1) => {
                    args1.append(&mut args);
                    args = args1;
                    head = (*h).clone();
                }
                _ => return (head, args),
            }
        }
    }

    /// Return true if an uninstantiated metavariable is reachable in the term.
    pub fn has_metas(&self) -> bool {
        let any = |tms: &[RTerm<'s>]| tms.iter().any(|tm| tm.has_metas());
        match self.clone().unfold() {
            Self::Kind | Self::Type | Self::Symb(_) | Self::BVar(_) | Self::Wild => false,
            // an unassigned reference survives `unfold`, but it is no metavariable
            Self::TRef(_) => false,
            Self::Meta(..) => true,
            Self::Appl(head, args) => head.has_metas() || any(&args),
            Self::Abst(arg, tm) => arg.ty.map_or(false, |ty| ty.has_metas()) || tm.has_metas(),
            Self::Prod(arg, tm) => arg.ty.has_metas() || tm.has_metas(),
            Self::Patt(_, _, env) | Self::TEnv(_, env) => any(&env),
        }
    }

    pub(crate) fn ctor(&self) -> &'static str {
        match self {
            Self::Kind => "Kind",
            Self::Type => "Type",
            Self::Symb(_) => "symbol",
            Self::BVar(_) => "variable",
            Self::Appl(..) => "application",
            Self::Abst(..) => "abstraction",
            Self::Prod(..) => "product",
            Self::Meta(..) => "metavariable",
            Self::Patt(..) => "pattern variable",
            Self::TEnv(..) => "environment reference",
            Self::Wild => "wildcard",
            Self::TRef(_) => "reference",
        }
    }
}

fn eq_args<'s>(args1: &[RTerm<'s>], args2: &[RTerm<'s>]) -> bool {
    args1.len() == args2.len() && args1.iter().zip(args2).all(|(a1, a2)| a1 == a2)
}

/// Structural equality, disregarding binder identifiers.
///
/// Under de Bruijn indices, this is equality up to alpha.
/// Metavariables are compared by key,
/// transient references by address, and
/// no unfolding is performed.
impl<'s> PartialEq for Term<'s> {
    fn eq(&self, other: &Self) -> bool {
        use Term::*;
        match (self, other) {
            (Kind, Kind) | (Type, Type) | (Wild, Wild) => true,
            (Symb(s1), Symb(s2)) => s1 == s2,
            (BVar(v1), BVar(v2)) => v1 == v2,
            (Appl(h1, args1), Appl(h2, args2)) => h1 == h2 && eq_args(args1, args2),
            (Abst(arg1, t1), Abst(arg2, t2)) => arg1.ty == arg2.ty && t1 == t2,
            (Prod(arg1, t1), Prod(arg2, t2)) => arg1.ty == arg2.ty && t1 == t2,
            (Meta(m1, env1), Meta(m2, env2)) => m1 == m2 && eq_args(env1, env2),
            (Patt(i1, _, env1), Patt(i2, _, env2)) => i1 == i2 && eq_args(env1, env2),
            (TEnv(i1, env1), TEnv(i2, env2)) => i1 == i2 && eq_args(env1, env2),
            (TRef(r1), TRef(r2)) => Rc::ptr_eq(r1, r2),
            _ => false,
        }
    }
}

impl<'s> Eq for Term<'s> {}

impl<'s> RTerm<'s> {
    /// Create a term pointer from a term.
    pub fn new(tm: Term<'s>) -> Self {
        Self(Rc::new(tm))
    }

    /// Compare the memory addresses of two term pointers.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn has_metas(&self) -> bool {
        (**self).has_metas()
    }
}

impl<'s> core::ops::Deref for RTerm<'s> {
    type Target = Term<'s>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'s> From<Term<'s>> for RTerm<'s> {
    fn from(tm: Term<'s>) -> Self {
        Self::new(tm)
    }
}

impl<'s> PartialEq for RTerm<'s> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || **self == **other
    }
}

impl<'s> Eq for RTerm<'s> {}

impl<Ty: Display> Display for Arg<Ty> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} : {}", self.id, self.ty)
    }
}

impl<'s> Display for Term<'s> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Kind => write!(f, "Kind"),
            Self::Type => write!(f, "Type"),
            Self::Symb(s) => s.fmt(f),
            Self::BVar(v) => write!(f, "β{}", v),
            Self::Appl(head, args) => fmt_appl(head, args, f),
            Self::Abst(arg, tm) => match arg.ty.as_ref() {
                None => write!(f, "(λ {}. {})", arg.id, tm),
                Some(ty) => write!(f, "(λ {} : {}. {})", arg.id, ty, tm),
            },
            Self::Prod(arg, tm) => write!(f, "(Π {}. {})", arg, tm),
            Self::Meta(m, env) => fmt_appl(m, env, f),
            Self::Patt(_, name, env) => {
                let name = Prefixed("$", name);
                fmt_appl(&name, env, f)
            }
            Self::TEnv(i, env) => {
                let slot = Prefixed("$", i);
                fmt_appl(&slot, env, f)
            }
            Self::Wild => write!(f, "_"),
            Self::TRef(r) => match &*r.borrow() {
                Some(tm) => tm.fmt(f),
                None => write!(f, "‹ref›"),
            },
        }
    }
}

struct Prefixed<'a, T>(&'a str, T);

impl<'a, T: Display> Display for Prefixed<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.0, self.1)
    }
}

impl<'s> Display for RTerm<'s> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        (**self).fmt(f)
    }
}
