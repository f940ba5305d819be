//! Subject-reduction checking for rewrite rules.
//!
//! A rewrite rule preserves typing if every well-typed instance of
//! its left-hand side has the same type as
//! the corresponding instance of its right-hand side.
//! To check this, the pattern variables of the left-hand side are
//! replaced by fresh metavariables,
//! the type of the resulting term is inferred,
//! the convertibility constraints collected during inference are
//! absorbed into a typing substitution, and
//! the right-hand side is checked against the substituted type.

use crate::error::{Bug, Error, RuleError, RuleKind};
use crate::meta::{build_meta_type, Metas, RMeta};
use crate::solve::{Constraint, Ctx, Solver};
use crate::subst::Binder;
use crate::term::{DeBruijn, RTerm, Term};
use crate::{Rule, Sig, Symbol};
use alloc::vec::Vec;

/// Derive a typing substitution from a list of convertibility constraints.
///
/// Constraints are processed in input order.
/// A constraint between two applications of the same injective symbol
/// is decomposed pointwise;
/// a constraint with a bare variable on one side is
/// recorded as a mapping for that variable;
/// any other constraint is left for the unifier.
///
/// The result is a pair of parallel arrays, to be applied as
/// one simultaneous substitution
/// (see [`subst_vars`](crate::Term::subst_vars)).
pub fn typing_subst<'s>(
    sig: &Sig<'s>,
    cs: &[Constraint<'s>],
) -> (Vec<DeBruijn>, Vec<Term<'s>>) {
    let mut todo: Vec<Constraint<'s>> = cs.iter().rev().cloned().collect();
    let mut xs = Vec::new();
    let mut ts = Vec::new();
    while let Some((a, b)) = todo.pop() {
        let (ha, argsa) = a.clone().get_args();
        let (hb, argsb) = b.clone().get_args();
        match (&ha, &hb) {
            (Term::Symb(sa), Term::Symb(sb))
                if sa == sb && sig.injective(sa) && argsa.len() == argsb.len() =>
            {
                // pointwise decomposition, processed before the remaining constraints
                let zip = argsa.iter().zip(argsb.iter()).rev();
                todo.extend(zip.map(|(x, y)| ((**x).clone(), (**y).clone())));
            }
            (Term::BVar(x), _) if argsa.is_empty() => {
                xs.push(*x);
                ts.push(b);
            }
            (_, Term::BVar(x)) if argsb.is_empty() => {
                xs.push(*x);
                ts.push(a);
            }
            _ => (),
        }
    }
    (xs, ts)
}

/// Replace the pattern variables of a left-hand side argument by
/// fresh metavariables.
///
/// `k` is the number of arguments the term is applied to.
/// Occurrences of the same pattern-variable slot share one metavariable,
/// recorded in `slots`; every wildcard receives a fresh one.
fn to_meta<'s>(
    metas: &mut Metas,
    slots: &mut [Option<RMeta<'s>>],
    k: usize,
    tm: &Term<'s>,
) -> Result<Term<'s>, Error> {
    match tm {
        Term::Patt(i, _, env) => {
            let env2 = env
                .iter()
                .map(|e| to_meta(metas, slots, 0, &**e).map(RTerm::new))
                .collect::<Result<_, _>>()?;
            let fresh = |metas: &mut Metas| {
                let ty = build_meta_type(metas, env.len() + k);
                metas.fresh(ty, env.len())
            };
            let m = match i {
                None => fresh(metas),
                Some(i) => match slots.get(*i) {
                    None => return Err(Error::Bug(Bug::LhsTerm("pattern slot"))),
                    Some(Some(m)) => m.clone(),
                    Some(None) => {
                        let m = fresh(metas);
                        slots[*i] = Some(m.clone());
                        m
                    }
                },
            };
            Ok(Term::Meta(m, env2))
        }
        Term::Appl(head, args) => {
            let head = to_meta(metas, slots, k + args.len(), &**head)?;
            let args = args
                .iter()
                .map(|a| to_meta(metas, slots, 0, &**a).map(RTerm::new))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(head.apply(args))
        }
        Term::Abst(arg, body) => {
            let ty = arg.ty.clone().map(|ty| to_meta(metas, slots, 0, &*ty).map(RTerm::new));
            let arg = crate::term::Arg::new(arg.id.clone(), ty.transpose()?);
            Ok(Term::Abst(arg, RTerm::new(to_meta(metas, slots, 0, &**body)?)))
        }
        Term::Symb(_) | Term::BVar(_) => Ok(tm.clone()),
        _ => Err(Error::Bug(Bug::LhsTerm(tm.ctor()))),
    }
}

/// The binder substituted for pattern slot `i`:
/// the metavariable of the slot applied to all binder arguments.
fn slot_binder<'s>(m: &RMeta<'s>) -> Binder<'s> {
    let arity = m.arity();
    let env = (0..arity).rev().map(|j| RTerm::new(Term::BVar(j))).collect();
    Binder {
        arity,
        body: Term::Meta(m.clone(), env),
    }
}

/// Check that a rewrite rule for the given symbol preserves typing.
///
/// An accepted rule is only logged;
/// a rejected rule yields an error located at the rule's position.
/// Rules whose left-hand side is untypable are accepted as vacuous,
/// with a warning: no well-typed term matches them.
pub fn check_rule<'s, S: Solver<'s>>(
    solver: &mut S,
    sig: &Sig<'s>,
    metas: &mut Metas,
    sym: Symbol<'s>,
    rule: &Rule<'s>,
) -> Result<(), Error> {
    let reject = |kind| Error::Rule(RuleError { pos: rule.pos, kind });

    // replace every pattern variable of the left-hand side by a metavariable
    let mut slots: Vec<Option<RMeta<'s>>> = alloc::vec![None; rule.arity()];
    let args = rule
        .lhs
        .iter()
        .map(|a| to_meta(metas, &mut slots, 0, a).map(RTerm::new))
        .collect::<Result<Vec<_>, _>>()?;
    let lhs = Term::Symb(sym).apply(args);

    // substitute the slot metavariables into the right-hand side
    let values: Vec<Option<Binder<'s>>> = slots
        .iter()
        .map(|m| m.as_ref().map(slot_binder))
        .collect();
    let rhs = rule.rhs.subst(&values);

    // infer the type of the left-hand side
    let mut ctx = Ctx::new();
    let (ty, cs) = match solver.infer(sig, &mut ctx, &lhs) {
        Some(inferred) => inferred,
        None => {
            warn!("rule with untypable left-hand side: {}", rule);
            return Ok(());
        }
    };

    // absorb the inference constraints into a typing substitution
    let (xs, ts) = typing_subst(sig, &cs);
    let rhs = rhs.subst_vars(&xs, &ts);
    let ty = ty.subst_vars(&xs, &ts);

    // check the right-hand side against the type of the left-hand side
    let problems = solver.check(sig, &mut ctx, &rhs, &ty);
    let residual = match solver.solve(sig, problems) {
        Some(residual) => residual,
        None => return Err(reject(RuleKind::NotPreserving)),
    };

    // discharge residual constraints that restate an inference constraint
    let eq = |a: &Term<'s>, b: &Term<'s>| solver.eq_modulo(sig, a, b);
    let unsolved: Vec<_> = residual
        .iter()
        .filter(|(a2, b2)| {
            !cs.iter().any(|(a1, b1)| {
                (eq(a1, a2) && eq(b1, b2)) || (eq(a1, b2) && eq(b1, a2))
            })
        })
        .collect();
    if !unsolved.is_empty() {
        let pairs = unsolved
            .iter()
            .map(|(a, b)| alloc::format!("{} ≡ {}", a, b))
            .collect();
        return Err(reject(RuleKind::Unsolved(pairs)));
    }

    // every metavariable of the right-hand side must have been instantiated
    let rhs0 = rule.rhs.subst(&alloc::vec![None; rule.arity()]);
    if rhs0.has_metas() {
        return Err(reject(RuleKind::MetasRemain));
    }

    debug!("accepted rule {}", rule);
    Ok(())
}
