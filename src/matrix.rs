//! Pattern-matching matrices.
//!
//! A matrix represents the rules of one symbol as
//! a rectangular (up to arity differences) matching problem:
//! column `k` of every row refers to the `k`-th argument of the symbol.
//! Specialization and default transforms consume columns from the front,
//! driving the compilation of the matrix into a decision tree.

use crate::error::{Bug, Error};
use crate::rule::Rhs;
use crate::subst::Binder;
use crate::term::{RTerm, Term};
use crate::tree::Tree;
use crate::Rule;
use alloc::rc::Rc;
use alloc::string::ToString;
use alloc::vec::Vec;

/// Row of a pattern matrix.
#[derive(Clone, Debug)]
struct Row<'s> {
    lhs: Vec<Term<'s>>,
    rhs: Rhs<'s>,
    /// for every pattern-variable slot, the pattern it was bound to
    /// by a previous specialization, if any
    env: Vec<Option<Binder<'s>>>,
}

/// Matrix of rewrite patterns.
pub struct Matrix<'s> {
    rows: Vec<Row<'s>>,
}

/// Is the term a hole, i.e. does it match any term?
///
/// Holes are wildcards and pattern variables whose slot is still unbound.
fn is_hole<'s>(env: &[Option<Binder<'s>>], tm: &Term<'s>) -> bool {
    match tm.clone().unfold() {
        Term::Patt(None, ..) => true,
        Term::Patt(Some(i), ..) => env.get(i).map_or(true, Option::is_none),
        // the head of a well-formed application is never an application itself,
        // so this recursion should be useless; it is kept for safety
        Term::Appl(head, _) => is_hole(env, &*head),
        _ => false,
    }
}

/// A fresh wildcard.
fn joker<'s>() -> Term<'s> {
    Term::Patt(None, Rc::new("_".to_string()), Vec::new())
}

/// Resolve a row head to the pattern it has to match:
/// a pattern variable whose slot was bound by a previous specialization
/// stands for the bound pattern, instantiated with its environment.
fn resolve<'s>(env: &[Option<Binder<'s>>], tm: Term<'s>) -> Term<'s> {
    match tm.unfold() {
        Term::Patt(Some(i), name, e) => match env.get(i).and_then(|b| b.as_ref()) {
            Some(b) => resolve(env, b.msubst(&e)),
            None => Term::Patt(Some(i), name, e),
        },
        tm => tm,
    }
}

/// Do two constructor terms present the same head to match on?
///
/// Constructors are discriminated by their spine head and argument count;
/// their arguments are matched by the child matrix.
fn same_cons<'s>(p: &Term<'s>, h: &Term<'s>) -> bool {
    let (ph, pargs) = p.clone().get_args();
    let (hh, hargs) = h.clone().get_args();
    if pargs.len() != hargs.len() {
        return false;
    }
    match (&ph, &hh) {
        (Term::Symb(s1), Term::Symb(s2)) => s1 == s2,
        (Term::BVar(v1), Term::BVar(v2)) => v1 == v2,
        (Term::Abst(..), Term::Abst(..)) => true,
        _ => false,
    }
}

/// The columns that matching against the constructor `p` exposes:
/// the spine arguments of an application, and
/// the body of an abstraction.
fn sub_columns<'s>(p: &Term<'s>) -> Vec<Term<'s>> {
    let (head, args) = p.clone().get_args();
    match head {
        Term::Abst(_, body) => {
            debug_assert!(args.is_empty());
            Vec::from([(*body).clone()])
        }
        _ => args.iter().map(|a| (**a).clone()).collect(),
    }
}

impl<'s> Row<'s> {
    /// Does every column of the row match any term?
    ///
    /// Such a row matches regardless of the remaining arguments, so
    /// it immediately yields its right-hand side.
    fn exhausted(&self) -> bool {
        self.lhs.iter().all(|tm| is_hole(&self.env, tm))
    }

    /// Restrict the row to the rows matching the constructor `p`,
    /// consuming the first column.
    ///
    /// Rows that cannot match `p` are dropped.
    /// An empty row constrains nothing and is kept unchanged.
    fn specialize(mut self, p: &Term<'s>) -> Result<Option<Self>, Error> {
        if self.lhs.is_empty() {
            return Ok(Some(self));
        }
        let head = self.lhs.remove(0);
        match resolve(&self.env, head) {
            Term::Patt(i, _, e) => {
                // a hole: bind its slot to the matched constructor and
                // open one fresh wildcard per exposed column
                if let Some(slot) = i.and_then(|i| self.env.get_mut(i)) {
                    *slot = Some(Binder::bind(anonymize(p), &e)?);
                }
                let cols = sub_columns(p).iter().map(|_| joker()).collect();
                Ok(Some(self.prepend(cols)))
            }
            head if same_cons(p, &head) => Ok(Some(self.prepend(sub_columns(&head)))),
            _ => Ok(None),
        }
    }

    /// Keep the row only if its first column matches any term,
    /// consuming that column.
    fn default(mut self) -> Result<Option<Self>, Error> {
        if self.lhs.is_empty() {
            return Ok(Some(self));
        }
        let head = self.lhs.remove(0);
        match resolve(&self.env, head) {
            Term::Patt(..) => Ok(Some(self)),
            Term::Symb(_) | Term::Appl(..) | Term::Abst(..) | Term::BVar(_) => Ok(None),
            head => Err(Error::Bug(Bug::DefaultHead(head.ctor()))),
        }
    }

    fn prepend(mut self, cols: Vec<Term<'s>>) -> Self {
        let mut lhs = cols;
        lhs.append(&mut self.lhs);
        self.lhs = lhs;
        self
    }
}

/// Replace the pattern variables of a term by wildcards.
///
/// When a hole is bound to a matched constructor,
/// the pattern variables inside the constructor belong to
/// the rows that contributed it, so
/// they are holes from the point of view of the bound slot.
fn anonymize<'s>(tm: &Term<'s>) -> Term<'s> {
    let sub = |tms: &[RTerm<'s>]| tms.iter().map(|tm| RTerm::new(anonymize(tm))).collect();
    match tm {
        Term::Patt(..) => joker(),
        Term::Appl(head, args) => Term::Appl(RTerm::new(anonymize(head)), sub(args)),
        Term::Abst(arg, body) => Term::Abst(arg.clone(), RTerm::new(anonymize(body))),
        _ => tm.clone(),
    }
}

impl<'s> Matrix<'s> {
    /// Assemble the rules of a symbol into a matrix, one row per rule.
    pub fn of_rules(rules: &[Rule<'s>]) -> Self {
        let rows = rules
            .iter()
            .map(|r| Row {
                lhs: r.lhs.clone(),
                rhs: r.rhs.clone(),
                env: alloc::vec![None; r.arity()],
            })
            .collect();
        Self { rows }
    }

    /// May column `k` be switched on?
    ///
    /// This is the case if some row presents a constructor in the column;
    /// rows too short to reach the column are skipped.
    fn can_switch_on(&self, k: usize) -> bool {
        self.rows
            .iter()
            .any(|r| r.lhs.get(k).map_or(false, |tm| !is_hole(&r.env, tm)))
    }

    /// The indices of the columns that offer discrimination.
    ///
    /// At least one column is retained whenever a non-exhausted row exists.
    fn switchable(&self) -> Vec<usize> {
        let width = self.rows.iter().map(|r| r.lhs.len()).max().unwrap_or(0);
        (0..width).filter(|k| self.can_switch_on(*k)).collect()
    }

    /// Gather the column `k` values across rows, skipping rows without them.
    ///
    /// Together with [`len`](Self::len), this allows
    /// column selection policies to inspect the matrix.
    pub fn get_col(&self, k: usize) -> Vec<&Term<'s>> {
        self.rows.iter().filter_map(|r| r.lhs.get(k)).collect()
    }

    /// Return the number of rows of the matrix.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Return true if the matrix contains no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Project the matrix to the chosen columns.
    fn select(&self, cols: &[usize]) -> Self {
        let rows = self
            .rows
            .iter()
            .map(|r| Row {
                lhs: cols.iter().filter_map(|k| r.lhs.get(*k).cloned()).collect(),
                rhs: r.rhs.clone(),
                env: r.env.clone(),
            })
            .collect();
        Self { rows }
    }

    /// Exchange column 0 and column `i` in every row.
    fn swap(&mut self, i: usize) {
        for r in &mut self.rows {
            if i < r.lhs.len() {
                r.lhs.swap(0, i)
            }
        }
    }

    /// Restrict the matrix to the rows matching the constructor `p` and
    /// rewrite each retained row to reflect the match just performed.
    fn specialize(&self, p: &Term<'s>) -> Result<Self, Error> {
        let rows = self.rows.iter().cloned().map(|r| r.specialize(p));
        let rows: Result<Vec<_>, _> = rows.collect();
        let rows = rows?.into_iter().flatten().collect();
        Ok(Self { rows })
    }

    /// Retain the rows whose first column is a hole, dropping that column.
    fn default(&self) -> Result<Self, Error> {
        let rows = self.rows.iter().cloned().map(|r| r.default());
        let rows: Result<Vec<_>, _> = rows.collect();
        let rows = rows?.into_iter().flatten().collect();
        Ok(Self { rows })
    }

    /// The candidate constructor heads of column 0, in row order,
    /// deduplicated by spine head and argument count.
    fn heads(&self) -> Vec<Term<'s>> {
        let mut heads: Vec<Term<'s>> = Vec::new();
        for r in &self.rows {
            if let Some(tm) = r.lhs.first() {
                let tm = resolve(&r.env, tm.clone());
                if !is_hole(&r.env, &tm) && !heads.iter().any(|h| same_cons(h, &tm)) {
                    heads.push(tm)
                }
            }
        }
        heads
    }

    /// Compile the matrix to a decision tree,
    /// testing the leftmost switchable column first.
    pub fn compile(self) -> Result<Tree<'s>, Error> {
        self.compile_with(&|_| 0)
    }

    /// Compile the matrix to a decision tree.
    ///
    /// The policy picks the next column to match on,
    /// given the matrix projected to the switchable columns;
    /// out-of-range picks are clamped.
    /// The choice affects the size of the tree, never its semantics.
    pub fn compile_with<F>(mut self, pick: &F) -> Result<Tree<'s>, Error>
    where
        F: Fn(&Matrix<'s>) -> usize,
    {
        trace!("compile matrix with {} rows", self.rows.len());
        if self.rows.is_empty() {
            return Ok(Tree::Fail);
        }
        if self.rows[0].exhausted() {
            // the textually earliest rule wins
            return Ok(Tree::Leaf(self.rows.swap_remove(0).rhs));
        }

        let cols = self.switchable();
        let sel = pick(&self.select(&cols)).min(cols.len() - 1);
        let col = cols[sel];
        let swap = if col == 0 { None } else { Some(col) };
        if let Some(i) = swap {
            self.swap(i)
        }

        let heads = self.heads();
        let mut children = Vec::with_capacity(heads.len() + 1);
        for p in heads {
            let child = self.specialize(&p)?.compile_with(pick)?;
            children.push((Some(RTerm::new(p)), child));
        }
        let dflt = self.default()?;
        if !dflt.rows.is_empty() {
            children.push((None, dflt.compile_with(pick)?));
        }
        Ok(Tree::Node { swap, children })
    }
}
