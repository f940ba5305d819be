//! Contracts of the type-inference and unification oracles.

use crate::term::Term;
use crate::{Sig, Stack};
use alloc::vec::Vec;

/// Convertibility constraint between two terms.
pub type Constraint<'s> = (Term<'s>, Term<'s>);

/// Local typing context: the types of the bound variables in scope,
/// innermost first.
pub type Ctx<'s> = Stack<Term<'s>>;

/// Typing and unification services consumed by the rule checker.
///
/// Implementations own the evaluator:
/// `eq_modulo` decides convertibility modulo the rewrite rules of
/// the signature, and may fail to terminate on ill-behaved rule sets.
/// Metavariable instantiation is performed exclusively behind this trait;
/// the rule checker observes it only through
/// [`unfold`](crate::Term::unfold).
pub trait Solver<'s> {
    /// Infer a type for the term along with
    /// the convertibility constraints the type hinges upon;
    /// `None` if the term is untypable.
    fn infer(
        &mut self,
        sig: &Sig<'s>,
        ctx: &mut Ctx<'s>,
        tm: &Term<'s>,
    ) -> Option<(Term<'s>, Vec<Constraint<'s>>)>;

    /// Return the constraints that must hold for the term to have the given type.
    fn check(
        &mut self,
        sig: &Sig<'s>,
        ctx: &mut Ctx<'s>,
        tm: &Term<'s>,
        ty: &Term<'s>,
    ) -> Vec<Constraint<'s>>;

    /// Solve the given unification problems.
    ///
    /// `None` signals a contradiction;
    /// otherwise, the residual constraints that could not be solved are returned.
    fn solve(&mut self, sig: &Sig<'s>, problems: Vec<Constraint<'s>>) -> Option<Vec<Constraint<'s>>>;

    /// Convertibility modulo the rewrite rules of the signature.
    fn eq_modulo(&self, sig: &Sig<'s>, tm1: &Term<'s>, tm2: &Term<'s>) -> bool;
}

/// Structural stand-in for the external oracles, used by tests.
///
/// Inference is purely syntactic (no reduction), deferring
/// the convertibility of applied arguments as constraints;
/// solving decomposes constraints along the shape of both sides,
/// in the spirit of a convertibility stepper.
#[cfg(test)]
pub(crate) mod structural {
    use super::*;
    use crate::subst::Binder;
    use crate::term::RTerm;

    pub struct Structural;

    impl Structural {
        fn infer_tm<'s>(
            &self,
            sig: &Sig<'s>,
            ctx: &mut Ctx<'s>,
            tm: &Term<'s>,
            cs: &mut Vec<Constraint<'s>>,
        ) -> Option<Term<'s>> {
            match tm.clone().unfold() {
                Term::Kind | Term::Wild | Term::TRef(_) => None,
                Term::Patt(..) | Term::TEnv(..) => None,
                Term::Type => Some(Term::Kind),
                Term::Symb(s) => Some((**sig.get_type(&s)?).clone()),
                Term::BVar(x) => Some(ctx.get(x)?.clone() << (x + 1)),
                Term::Meta(m, env) => {
                    // instantiate the type of the metavariable with its environment
                    let mut ty = m.ty();
                    for e in env.iter() {
                        ty = match ty.unfold() {
                            Term::Prod(_, cod) => (*cod).clone().subst(&**e),
                            _ => return None,
                        };
                    }
                    Some(ty)
                }
                Term::Appl(head, args) => {
                    let mut ty = self.infer_tm(sig, ctx, &*head, cs)?;
                    for a in args {
                        ty = match ty.unfold() {
                            Term::Prod(arg, cod) => {
                                let aty = self.infer_tm(sig, ctx, &*a, cs)?;
                                let dom = (*arg.ty).clone();
                                if aty != dom {
                                    cs.push((dom, aty));
                                }
                                (*cod).clone().subst(&*a)
                            }
                            _ => return None,
                        };
                    }
                    Some(ty)
                }
                Term::Abst(arg, body) => {
                    let dom = (*arg.ty.clone()?).clone();
                    let cod = ctx.with_pushed::<_, _, ()>(dom.clone(), |ctx| {
                        self.infer_tm(sig, ctx, &*body, cs).ok_or(())
                    });
                    let arg = arg.map_type(|ty| ty.expect("domain"));
                    Some(Term::Prod(arg, RTerm::new(cod.ok()?)))
                }
                Term::Prod(arg, body) => {
                    let dom = (*arg.ty).clone();
                    let cod = ctx.with_pushed::<_, _, ()>(dom, |ctx| {
                        self.infer_tm(sig, ctx, &*body, cs).ok_or(())
                    });
                    cod.ok()
                }
            }
        }
    }

    /// Can the term shape not change by metavariable instantiation?
    fn rigid(tm: &Term) -> bool {
        !matches!(tm, Term::Meta(..))
    }

    impl<'s> Solver<'s> for Structural {
        fn infer(
            &mut self,
            sig: &Sig<'s>,
            ctx: &mut Ctx<'s>,
            tm: &Term<'s>,
        ) -> Option<(Term<'s>, Vec<Constraint<'s>>)> {
            let mut cs = Vec::new();
            let ty = self.infer_tm(sig, ctx, tm, &mut cs)?;
            Some((ty, cs))
        }

        fn check(
            &mut self,
            sig: &Sig<'s>,
            ctx: &mut Ctx<'s>,
            tm: &Term<'s>,
            ty: &Term<'s>,
        ) -> Vec<Constraint<'s>> {
            let mut cs = Vec::new();
            if let Some(ity) = self.infer_tm(sig, ctx, tm, &mut cs) {
                if ity != *ty {
                    cs.push((ty.clone(), ity));
                }
            }
            cs
        }

        fn solve(
            &mut self,
            _sig: &Sig<'s>,
            problems: Vec<Constraint<'s>>,
        ) -> Option<Vec<Constraint<'s>>> {
            let mut todo = problems;
            todo.reverse();
            let mut residual = Vec::new();
            while let Some((a, b)) = todo.pop() {
                let a = a.unfold();
                let b = b.unfold();
                if a == b {
                    continue;
                }
                match (a, b) {
                    (Term::Meta(m, env), t) | (t, Term::Meta(m, env)) => {
                        match Binder::bind(t.clone(), &env) {
                            Ok(bnd) => m.instantiate(bnd),
                            Err(_) => residual.push((Term::Meta(m, env), t)),
                        }
                    }
                    (Term::Appl(f, xs), Term::Appl(g, ys)) if xs.len() == ys.len() => {
                        todo.push(((*f).clone(), (*g).clone()));
                        let zip = xs.iter().zip(ys.iter());
                        todo.extend(zip.map(|(x, y)| ((**x).clone(), (**y).clone())));
                    }
                    (Term::Prod(arg1, b1), Term::Prod(arg2, b2)) => {
                        todo.push(((*arg1.ty).clone(), (*arg2.ty).clone()));
                        todo.push(((*b1).clone(), (*b2).clone()));
                    }
                    (Term::Abst(_, b1), Term::Abst(_, b2)) => {
                        todo.push(((*b1).clone(), (*b2).clone()));
                    }
                    (a, b) if rigid(&a) && rigid(&b) => return None,
                    (a, b) => residual.push((a, b)),
                }
            }
            Some(residual)
        }

        fn eq_modulo(&self, _sig: &Sig<'s>, tm1: &Term<'s>, tm2: &Term<'s>) -> bool {
            tm1.clone().unfold() == tm2.clone().unfold()
        }
    }
}
