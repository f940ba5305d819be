//! Rewrite rules.

use crate::app::format as fmt_appl;
use crate::subst::Binder;
use crate::term::{RTerm, Term};
use alloc::vec::Vec;
use core::fmt::{self, Display};

/// Source position of a rule.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Pos {
    pub line: usize,
    pub col: usize,
}

/// Right-hand side of a rewrite rule:
/// a term under an array of pattern-variable slots.
///
/// Slot `i` occurs in the body as `TEnv(i, env)`, where
/// the environment supplies the variables bound around the occurrence.
#[derive(Clone, Debug)]
pub struct Rhs<'s> {
    pub arity: usize,
    pub body: Term<'s>,
}

impl<'s> Rhs<'s> {
    /// Substitute the pattern slots simultaneously.
    ///
    /// Slot `i` with an environment `env` is replaced by
    /// `values[i]` applied to `env`; slots mapped to `None` stay in place.
    pub fn subst(&self, values: &[Option<Binder<'s>>]) -> Term<'s> {
        subst_at(values, &self.body)
    }
}

fn subst_at<'s>(values: &[Option<Binder<'s>>], tm: &Term<'s>) -> Term<'s> {
    let sub = |tm: &RTerm<'s>| RTerm::new(subst_at(values, &**tm));
    let sub_args = |args: &[RTerm<'s>]| args.iter().map(sub).collect::<Vec<_>>();
    match tm {
        Term::TEnv(i, env) => {
            let env = sub_args(env);
            match values.get(*i).and_then(|v| v.as_ref()) {
                Some(b) => b.msubst(&env),
                None => Term::TEnv(*i, env),
            }
        }
        Term::Appl(head, args) => Term::Appl(sub(head), sub_args(args)),
        Term::Abst(arg, tm) => {
            let arg = arg.clone().map_type(|ty| ty.map(|ty| sub(&ty)));
            Term::Abst(arg, sub(tm))
        }
        Term::Prod(arg, tm) => {
            let arg = arg.clone().map_type(|ty| sub(&ty));
            Term::Prod(arg, sub(tm))
        }
        Term::Meta(m, env) => Term::Meta(m.clone(), sub_args(env)),
        _ => tm.clone(),
    }
}

/// Rewrite rule for a symbol.
///
/// The left-hand side lists the argument patterns under the defining symbol;
/// the right-hand side binds the pattern variables of the left-hand side
/// that occur in it.
#[derive(Clone, Debug)]
pub struct Rule<'s> {
    pub lhs: Vec<Term<'s>>,
    pub rhs: Rhs<'s>,
    /// source position, used to locate diagnostics
    pub pos: Option<Pos>,
}

impl<'s> Rule<'s> {
    /// Number of pattern-variable slots of the rule.
    pub fn arity(&self) -> usize {
        self.rhs.arity
    }
}

impl<'s> Display for Rule<'s> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt_appl(&"·", &self.lhs, f)?;
        write!(f, " ⟶ {}", self.rhs.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn rhs_subst() {
        // (λ. $0[β0]) with slot 0 ↦ a binder returning its argument
        let env = vec![RTerm::new(Term::BVar(0))];
        let body = Term::Abst(
            crate::term::Arg::new(alloc::rc::Rc::new("x".into()), None),
            RTerm::new(Term::TEnv(0, env)),
        );
        let rhs = Rhs { arity: 1, body };

        let id = Binder {
            arity: 1,
            body: Term::BVar(0),
        };
        let out = rhs.subst(&[Some(id)]);
        match out {
            Term::Abst(_, tm) => assert_eq!(*tm, Term::BVar(0)),
            _ => panic!("abstraction expected"),
        }

        // unassigned slots stay in place
        let out = rhs.subst(&[None]);
        match out {
            Term::Abst(_, tm) => assert!(matches!(&*tm, Term::TEnv(0, _))),
            _ => panic!("abstraction expected"),
        }
    }
}
