//! Substitution and shifting for terms, and multi-variable binders.

use crate::error::Bug;
use crate::term::{DeBruijn, RTerm, Term};
use alloc::vec::Vec;

impl<'s> RTerm<'s> {
    pub fn apply_subst<S>(self, subst: &S, k: usize) -> Self
    where
        S: Fn(usize, usize) -> Term<'s>,
    {
        let tm2 = (*self).clone().apply_subst(subst, k);
        // preserve sharing if the substitution did not change anything
        if tm2 == *self {
            self
        } else {
            Self::new(tm2)
        }
    }
}

fn subst_args<'s, S>(args: &[RTerm<'s>], subst: &S, k: usize) -> Vec<RTerm<'s>>
where
    S: Fn(usize, usize) -> Term<'s>,
{
    args.iter().map(|a| a.clone().apply_subst(subst, k)).collect()
}

impl<'s> Term<'s> {
    /// Apply a substitution to all variables that are
    /// bound outside the `k` innermost binders.
    ///
    /// The substitution receives the index of the variable and
    /// the number of binders between the variable and the root of the term.
    pub fn apply_subst<S>(self, subst: &S, k: usize) -> Self
    where
        S: Fn(usize, usize) -> Term<'s>,
    {
        match self {
            Self::BVar(n) if n >= k => subst(n, k),
            Self::Appl(head, args) => {
                let head = head.apply_subst(subst, k);
                Self::Appl(head, subst_args(&args, subst, k))
            }
            Self::Abst(arg, tm) => {
                let arg = arg.map_type(|ty| ty.map(|ty| ty.apply_subst(subst, k)));
                Self::Abst(arg, tm.apply_subst(subst, k + 1))
            }
            Self::Prod(arg, tm) => {
                let arg = arg.map_type(|ty| ty.apply_subst(subst, k));
                Self::Prod(arg, tm.apply_subst(subst, k + 1))
            }
            // environments live in the scope of the surrounding term
            Self::Meta(m, env) => Self::Meta(m, subst_args(&env, subst, k)),
            Self::Patt(i, name, env) => Self::Patt(i, name, subst_args(&env, subst, k)),
            Self::TEnv(i, env) => Self::TEnv(i, subst_args(&env, subst, k)),
            _ => self,
        }
    }

    /// Substitute the innermost bound variable in the term.
    pub fn subst(self, u: &Term<'s>) -> Self {
        self.apply_subst(&u.psubst_single(), 0)
    }

    fn psubst_single<'t>(&'t self) -> impl Fn(usize, usize) -> Term<'s> + 't {
        move |n: usize, k: usize| {
            if n == k {
                self.clone() << k
            } else {
                Term::BVar(n - 1)
            }
        }
    }

    /// Apply the parallel substitution `xs[i] ↦ ts[i]` to the term.
    ///
    /// All variables are replaced simultaneously;
    /// in particular, occurrences of any `xs[i]` inside some `ts[j]`
    /// are left untouched.
    pub fn subst_vars(self, xs: &[DeBruijn], ts: &[Term<'s>]) -> Self {
        if xs.is_empty() {
            return self;
        }
        self.apply_subst(
            &|n, k| match xs.iter().position(|x| x + k == n) {
                Some(i) => ts[i].clone() << k,
                None => Term::BVar(n),
            },
            0,
        )
    }
}

/// Definition of `<<` for terms.
#[allow(clippy::suspicious_arithmetic_impl)]
impl<'s> core::ops::Shl<usize> for Term<'s> {
    type Output = Self;

    fn shl(self, rhs: usize) -> Self::Output {
        if rhs == 0 {
            self
        } else {
            self.apply_subst(&|n, _k| Term::BVar(n + rhs), 0)
        }
    }
}

/// Multi-variable binder.
///
/// The body is a term under `arity` nested abstractions, without the lambdas:
/// at binder depth `k` inside the body, the de Bruijn index `k + i`
/// refers to the `arity - 1 - i`-th binder argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Binder<'s> {
    pub arity: usize,
    pub body: Term<'s>,
}

impl<'s> Binder<'s> {
    /// Bind a term that does not contain any of the binder's variables.
    pub fn constant(body: Term<'s>) -> Self {
        let arity = 0;
        Self { arity, body }
    }

    /// Substitute all binder arguments simultaneously.
    ///
    /// The argument slice must be as long as the arity of the binder.
    pub fn msubst(&self, args: &[RTerm<'s>]) -> Term<'s> {
        let arity = self.arity;
        if arity == 0 {
            return self.body.clone();
        }
        debug_assert_eq!(args.len(), arity);
        self.body.clone().apply_subst(
            &|n, k| match args.get(arity.wrapping_sub(1 + n - k)) {
                Some(arg) => (**arg).clone() << k,
                // free in the body: strip the binder levels
                None => Term::BVar(n - arity),
            },
            0,
        )
    }

    /// Abstract a term over an environment of distinct bound variables.
    ///
    /// The `j`-th environment entry must unfold to a variable;
    /// its occurrences in the term become the `j`-th binder argument.
    pub fn bind(tm: Term<'s>, env: &[RTerm<'s>]) -> Result<Self, Bug> {
        let var = |e: &RTerm<'s>| match (**e).clone().unfold() {
            Term::BVar(v) => Ok(v),
            tm => Err(Bug::NoVarEnv(tm.ctor())),
        };
        let vars: Vec<DeBruijn> = env.iter().map(var).collect::<Result<_, _>>()?;
        let arity = vars.len();
        let body = tm.apply_subst(
            &|n, k| match vars.iter().position(|v| v + k == n) {
                Some(j) => Term::BVar(k + arity - 1 - j),
                None => Term::BVar(n + arity),
            },
            0,
        );
        Ok(Self { arity, body })
    }
}

impl<'s> core::fmt::Display for Binder<'s> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        self.body.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn var(n: usize) -> Term<'static> {
        Term::BVar(n)
    }

    fn appl(head: Term<'static>, args: Vec<Term<'static>>) -> Term<'static> {
        head.apply(args.into_iter().map(RTerm::new).collect())
    }

    #[test]
    fn shift() {
        let tm = appl(var(0), vec![var(1)]);
        assert_eq!(tm.clone() << 2, appl(var(2), vec![var(3)]));
        assert_eq!(tm.clone() << 0, tm);
    }

    #[test]
    fn subst_parallel() {
        // {β0 ↦ β1, β1 ↦ β0} swaps the variables simultaneously
        let tm = appl(var(0), vec![var(1)]);
        let swapped = tm.subst_vars(&[0, 1], &[var(1), var(0)]);
        assert_eq!(swapped, appl(var(1), vec![var(0)]));
    }

    #[test]
    fn subst_no_retraversal() {
        // the image of β0 contains β1, which must not be substituted again
        let tm = appl(var(0), vec![var(1)]);
        let out = tm.subst_vars(&[0, 1], &[var(1), var(2)]);
        assert_eq!(out, appl(var(1), vec![var(2)]));
    }

    #[test]
    fn msubst_roundtrip() {
        // binding a term over [β5, β3] and substituting the same environment
        // restores the term
        let env = [RTerm::new(var(5)), RTerm::new(var(3))];
        let tm = appl(var(3), vec![var(5), var(0)]);
        let b = Binder::bind(tm.clone(), &env).unwrap();
        assert_eq!(b.arity, 2);
        assert_eq!(b.msubst(&env), tm);
    }

    #[test]
    fn bind_rejects_nonvars() {
        let env = [RTerm::new(Term::Type)];
        assert!(Binder::bind(var(0), &env).is_err());
    }
}
