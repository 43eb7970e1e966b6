//! Human readable renderings of trees and audit paths.
//!
//! Checksums are turned into text by a caller supplied function (hex, a
//! prefix of hex, raw utf-8 for tests...); nothing here encodes bytes itself
//! or touches tree state.

use crate::hash::Algorithm;
use crate::merkle::MerkleTree;
use crate::node::{NodeId, NodeKind};
use crate::proof::Proof;

impl<A: Algorithm> MerkleTree<A> {
    /// Renders the tree as an indented S-expression:
    ///
    /// ```text
    /// (B root: <checksum>
    ///   (L root: <checksum>)
    ///   (L root: <checksum>))
    /// ```
    ///
    /// Every nested node starts on its own line, indented by two more spaces
    /// than its parent; `indent` is the indentation of the root.
    pub fn render<F>(&self, f: F, indent: usize) -> String
    where
        F: Fn(&[u8]) -> String,
    {
        let mut out = String::new();
        self.render_node(&f, self.root_id(), indent, &mut out);
        out
    }

    fn render_node<F>(&self, f: &F, id: NodeId, indent: usize, out: &mut String)
    where
        F: Fn(&[u8]) -> String,
    {
        let node = match self.node(id) {
            Some(node) => node,
            None => return,
        };
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&" ".repeat(indent));
        match node.kind() {
            NodeKind::Leaf { .. } => {
                out.push_str(&format!("(L root: {})", f(node.checksum())));
            }
            NodeKind::Branch { left, right } => {
                out.push_str(&format!("(B root: {} ", f(node.checksum())));
                self.render_node(f, *left, indent + 2, out);
                out.push(' ');
                self.render_node(f, *right, indent + 2, out);
                out.push(')');
            }
        }
    }
}

impl Proof {
    /// Renders the audit path as the chain of concatenations it folds:
    ///
    /// ```text
    /// route from <target> (leaf) to root:
    ///
    /// <left> + <right> = <parent>
    /// ...
    /// ```
    ///
    /// Parent checksums are recomputed with `alg`. An empty path renders as
    /// the empty string.
    pub fn render<A, F>(&self, alg: &mut A, f: F) -> String
    where
        A: Algorithm,
        F: Fn(&[u8]) -> String,
    {
        if self.is_empty() {
            return String::new();
        }

        let mut lines = Vec::with_capacity(self.len() + 2);
        lines.push(format!("route from {} (leaf) to root:", f(self.target())));
        lines.push(String::new());

        let mut prev = self.target().to_vec();
        for part in self.parts() {
            let (l, r) = if part.is_right() {
                (prev.as_slice(), part.checksum())
            } else {
                (part.checksum(), prev.as_slice())
            };
            let curr = alg.node(l, r);
            lines.push(format!("{} + {} = {}", f(l), f(r), f(&curr)));
            prev = curr;
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use crate::proof::{Proof, ProofPart};
    use crate::test_common::{bytes_to_str, greek_tree, identity};

    #[test]
    fn test_render_proof() {
        let tree = greek_tree(8);
        let proof = tree.create_proof(b"omega").unwrap();

        let expected = concat!(
            "route from omega (leaf) to root:\n",
            "\n",
            "epsilon + omega = epsilonomega\n",
            "epsilonomega + muzeta = epsilonomegamuzeta\n",
            "alphabetakappagamma + epsilonomegamuzeta = alphabetakappagammaepsilonomegamuzeta",
        );
        assert_eq!(proof.render(&mut identity(), bytes_to_str), expected);
    }

    #[test]
    fn test_render_empty_proof() {
        let proof = Proof::new(Vec::new(), b"alpha".to_vec(), b"alpha".to_vec());
        assert_eq!(proof.render(&mut identity(), bytes_to_str), "");
    }

    #[test]
    fn test_render_does_not_need_tree() {
        let proof = Proof::new(
            vec![ProofPart::new(true, b"beta".to_vec())],
            b"alpha".to_vec(),
            b"alphabeta".to_vec(),
        );
        assert_eq!(
            proof.render(&mut identity(), bytes_to_str),
            "route from alpha (leaf) to root:\n\nalpha + beta = alphabeta"
        );
    }

    #[test]
    fn test_render_indent() {
        let tree = greek_tree(2);
        assert_eq!(
            tree.render(bytes_to_str, 4),
            "    (B root: alphabeta \n      (L root: alpha) \n      (L root: beta))"
        );
    }
}
