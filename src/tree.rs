//! Decision trees for rewrite-rule matching.

use crate::rule::Rhs;
use crate::term::RTerm;
use alloc::vec::Vec;
use core::fmt;

/// Decision tree: a deterministic program driving pattern dispatch.
///
/// Matching a vector of arguments against a tree proceeds as follows.
/// On a [`Node`](Self::Node), the head of column 0 is examined,
/// after moving column `i` to the front if `swap` is `Some(i)`;
/// the first child whose tag presents the same constructor
/// (spine head and argument count) is taken,
/// with the constructor's arguments prepended to the vector, and
/// the child tagged `None` is taken if no constructor child applies.
/// A [`Leaf`](Self::Leaf) fires its right-hand side, and
/// [`Fail`](Self::Fail) signals that no rule applies.
#[derive(Clone, Debug)]
pub enum Tree<'s> {
    Leaf(Rhs<'s>),
    Fail,
    Node {
        swap: Option<usize>,
        /// constructor children in source order, default child (if any) last
        children: Vec<(Option<RTerm<'s>>, Tree<'s>)>,
    },
}

impl<'s> Tree<'s> {
    /// Fold over the tree.
    pub fn fold<A: Clone>(
        &self,
        leaf: &impl Fn(&Rhs<'s>) -> A,
        node: &impl Fn(Option<usize>, Vec<(Option<&RTerm<'s>>, A)>) -> A,
        fail: &A,
    ) -> A {
        match self {
            Self::Leaf(rhs) => leaf(rhs),
            Self::Fail => fail.clone(),
            Self::Node { swap, children } => {
                let children = children
                    .iter()
                    .map(|(tag, child)| (tag.as_ref(), child.fold(leaf, node, fail)))
                    .collect();
                node(*swap, children)
            }
        }
    }

    /// Number of leaves of the tree.
    pub fn leaves(&self) -> usize {
        self.fold(
            &|_| 1,
            &|_, children| children.into_iter().map(|(_, n)| n).sum(),
            &0,
        )
    }

    /// Write the tree in Graphviz DOT format.
    ///
    /// Nodes are labelled with the index of the tested column
    /// (0 in the absence of a swap), leaves with their action;
    /// edges carry the matched head constructor,
    /// `d` for the default branch, and `f` for failure.
    pub fn to_dot<W: fmt::Write>(&self, w: &mut W) -> fmt::Result {
        writeln!(w, "digraph tree {{")?;
        let mut next = 0;
        self.dot_node(w, &mut next)?;
        writeln!(w, "}}")
    }

    fn dot_node<W: fmt::Write>(&self, w: &mut W, next: &mut usize) -> Result<usize, fmt::Error> {
        let id = *next;
        *next += 1;
        match self {
            Self::Leaf(rhs) => writeln!(w, "  n{} [shape=box, label=\"{}\"];", id, rhs.body)?,
            Self::Fail => writeln!(w, "  n{} [shape=box, label=\"⊥\"];", id)?,
            Self::Node { swap, children } => {
                writeln!(w, "  n{} [label=\"{}\"];", id, swap.unwrap_or(0))?;
                for (tag, child) in children {
                    let cid = child.dot_node(w, next)?;
                    write!(w, "  n{} -> n{} [label=\"", id, cid)?;
                    match (tag, child) {
                        (_, Self::Fail) => write!(w, "f")?,
                        (None, _) => write!(w, "d")?,
                        (Some(tag), _) => {
                            let (head, _) = (**tag).clone().get_args();
                            write!(w, "{}", head)?
                        }
                    }
                    writeln!(w, "\"];")?;
                }
            }
        }
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::Term;
    use alloc::string::String;
    use alloc::vec;

    #[test]
    fn fold_and_dot() {
        let leaf = |body| {
            Tree::Leaf(Rhs {
                arity: 0,
                body,
            })
        };
        let tree = Tree::Node {
            swap: Some(1),
            children: vec![
                (Some(RTerm::new(Term::Type)), leaf(Term::Type)),
                (None, Tree::Fail),
            ],
        };

        assert_eq!(tree.leaves(), 1);
        let depth = tree.fold(
            &|_| 1,
            &|_, children| 1 + children.into_iter().map(|(_, d)| d).max().unwrap_or(0),
            &1,
        );
        assert_eq!(depth, 2);

        let mut dot = String::new();
        tree.to_dot(&mut dot).unwrap();
        assert!(dot.starts_with("digraph tree {"));
        assert!(dot.contains("label=\"1\""));
        assert!(dot.contains("label=\"f\""));
        assert!(dot.ends_with("}\n"));
    }
}
