use std::ops::Range;

use log::{debug, trace};
use rayon::prelude::*;

use crate::error::{MerkleError, Result};
use crate::hash::{Algorithm, Checksum};
use crate::node::{Node, NodeId, NodeKind};
use crate::proof::{Proof, ProofPart};

/// Row width used as threshold to decide how a level is hashed. Narrower rows
/// are hashed sequentially on the calling thread, wider rows are split across
/// the rayon pool, one independent hash per node.
pub const PARALLEL_BUILD_THRESHOLD: usize = 1024;

/// Tree construction settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildConfig {
    /// Minimum row width hashed in parallel.
    pub parallel_threshold: usize,
}

impl BuildConfig {
    /// Never hash in parallel.
    pub fn sequential() -> BuildConfig {
        BuildConfig {
            parallel_threshold: usize::MAX,
        }
    }

    /// Hash every row in parallel, however narrow.
    pub fn parallel() -> BuildConfig {
        BuildConfig {
            parallel_threshold: 0,
        }
    }

    fn is_parallel(&self, width: usize) -> bool {
        width >= self.parallel_threshold
    }
}

impl Default for BuildConfig {
    fn default() -> BuildConfig {
        BuildConfig {
            parallel_threshold: PARALLEL_BUILD_THRESHOLD,
        }
    }
}

/// Merkle Tree.
///
/// All leafs and branches live in one arena (vec), row after row, and refer
/// to each other by [`NodeId`]. A diagram of a tree over three blocks:
///
/// ```text
///              root = h(h12 + h33)
///             /                   \
///     h12 = h(h1 + h2)      h33 = h(h3 + h3)
///      /          \          /          \
///  h1 = h(b1)  h2 = h(b2)  h3 = h(b3)   (h3)
/// ```
///
/// In memory layout:
///
/// ```text
///     [h1 h2 h3 h12 h33 root]
/// ```
///
/// Merkle root is always the last element in the arena.
///
/// The number of blocks is not always a power of two. Whenever a row holds
/// an odd number of nodes its last node is paired with itself, so every
/// branch has exactly two children and every row but the last has an even
/// width once padded. The duplicate is not stored; the branch simply names
/// the same child twice.
///
/// A built tree is never mutated again and can be shared between threads.
#[derive(Debug, Clone)]
pub struct MerkleTree<A: Algorithm> {
    nodes: Vec<Node>,
    rows: Vec<Range<usize>>,
    alg: A,
}

impl<A: Algorithm> MerkleTree<A> {
    /// Creates new merkle tree from an ordered list of blocks.
    pub fn new<B, I>(alg: A, blocks: I) -> Result<MerkleTree<A>>
    where
        B: AsRef<[u8]>,
        I: IntoIterator<Item = B>,
    {
        Self::new_with_config(alg, blocks, BuildConfig::default())
    }

    /// Creates new merkle tree from an ordered list of blocks.
    ///
    /// Fails with [`MerkleError::InvalidInput`] if `blocks` is empty.
    pub fn new_with_config<B, I>(alg: A, blocks: I, config: BuildConfig) -> Result<MerkleTree<A>>
    where
        B: AsRef<[u8]>,
        I: IntoIterator<Item = B>,
    {
        let blocks: Vec<Vec<u8>> = blocks.into_iter().map(|b| b.as_ref().to_vec()).collect();
        if blocks.is_empty() {
            return Err(MerkleError::InvalidInput(
                "cannot build a merkle tree from an empty block list".to_string(),
            ));
        }

        let leafs = blocks.len();
        let levels = get_merkle_tree_levels(leafs);
        debug!(
            "building merkle tree: {} leafs, {} levels, parallel threshold {}",
            leafs, levels, config.parallel_threshold
        );

        let checksums: Vec<Checksum> = if config.is_parallel(leafs) {
            blocks
                .par_iter()
                .map_init(|| alg.clone(), |a, block| a.leaf(block))
                .collect()
        } else {
            let mut a = alg.clone();
            blocks.iter().map(|block| a.leaf(block)).collect()
        };

        let mut nodes = Vec::with_capacity(get_merkle_tree_len(leafs));
        nodes.extend(
            checksums
                .into_iter()
                .zip(blocks)
                .map(|(checksum, block)| Node::leaf(checksum, block)),
        );

        let mut rows = Vec::with_capacity(levels);
        rows.push(0..leafs);

        let mut tree = MerkleTree { nodes, rows, alg };
        while tree.rows.len() < levels {
            tree.push_row(&config);
        }

        debug_assert_eq!(tree.rows.last().map(|r| r.len()), Some(1));
        debug!(
            "built merkle tree: {} nodes, root at {}",
            tree.nodes.len(),
            tree.root_id().index()
        );

        Ok(tree)
    }

    /// Hashes the last row pairwise into a new row on top of it.
    fn push_row(&mut self, config: &BuildConfig) {
        let prev = self.rows[self.rows.len() - 1].clone();
        let width = prev.len();

        // if there is odd num of nodes, the last one is paired with itself
        let pairs: Vec<(NodeId, NodeId)> = prev
            .clone()
            .step_by(2)
            .map(|l| {
                let r = if l + 1 < prev.end { l + 1 } else { l };
                (NodeId(l), NodeId(r))
            })
            .collect();

        let checksums: Vec<Checksum> = {
            let nodes = &self.nodes;
            if config.is_parallel(width) {
                pairs
                    .par_iter()
                    .map_init(
                        || self.alg.clone(),
                        |a, &(l, r)| a.node(&nodes[l.0].checksum, &nodes[r.0].checksum),
                    )
                    .collect()
            } else {
                let mut a = self.alg.clone();
                pairs
                    .iter()
                    .map(|&(l, r)| a.node(&nodes[l.0].checksum, &nodes[r.0].checksum))
                    .collect()
            }
        };

        trace!(
            "level {}: {} nodes into {} branches{}",
            self.rows.len(),
            width,
            pairs.len(),
            if width & 1 == 1 { ", last duplicated" } else { "" }
        );

        let start = self.nodes.len();
        for ((left, right), checksum) in pairs.into_iter().zip(checksums) {
            self.push_branch(checksum, left, right);
        }
        self.rows.push(start..self.nodes.len());
    }

    /// Appends a branch over `left` and `right` and links both children to it.
    fn push_branch(&mut self, checksum: Checksum, left: NodeId, right: NodeId) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes[left.0].parent = Some(id);
        self.nodes[right.0].parent = Some(id);
        self.nodes.push(Node::branch(checksum, left, right));
        id
    }

    /// Generate merkle tree inclusion proof for the leaf with checksum
    /// `leaf_checksum`, following parent links from the leaf to the root.
    ///
    /// Fails with [`MerkleError::NotFound`] if no leaf has that checksum. When
    /// several leafs share it, the proof is for the leftmost one.
    pub fn create_proof(&self, leaf_checksum: &[u8]) -> Result<Proof> {
        let index = self.leaf_index(leaf_checksum).ok_or(MerkleError::NotFound)?;

        let mut parts = Vec::with_capacity(self.levels() - 1);
        let mut current = NodeId(index);
        while let Some(parent) = self.nodes[current.0].parent {
            // parent links only ever point at branches
            let (left, right) = match self.nodes[parent.0].kind {
                NodeKind::Branch { left, right } => (left, right),
                NodeKind::Leaf { .. } => break,
            };
            let part = if left == current {
                // current is left (or both, for a duplicated node)
                ProofPart::new(true, self.nodes[right.0].checksum.clone())
            } else {
                ProofPart::new(false, self.nodes[left.0].checksum.clone())
            };
            parts.push(part);
            current = parent;
        }

        debug!("generated proof for leaf {} with {} parts", index, parts.len());
        debug_assert_eq!(parts.len(), self.levels() - 1);

        Ok(Proof::new(parts, leaf_checksum.to_vec(), self.root().to_vec()))
    }

    /// Generate merkle tree inclusion proof for the leaf with checksum
    /// `leaf_checksum` from row positions alone.
    ///
    /// Produces the same proof as [`MerkleTree::create_proof`].
    pub fn create_proof_by_index(&self, leaf_checksum: &[u8]) -> Result<Proof> {
        let mut j = self.leaf_index(leaf_checksum).ok_or(MerkleError::NotFound)?;

        let mut parts = Vec::with_capacity(self.levels() - 1);
        for row in &self.rows[..self.rows.len() - 1] {
            let part = if j & 1 == 1 {
                // j is right
                ProofPart::new(false, self.nodes[row.start + j - 1].checksum.clone())
            } else if row.start + j + 1 < row.end {
                // j is left
                ProofPart::new(true, self.nodes[row.start + j + 1].checksum.clone())
            } else {
                // j is last of an odd row, paired with itself
                ProofPart::new(true, self.nodes[row.start + j].checksum.clone())
            };
            parts.push(part);
            j >>= 1;
        }

        Ok(Proof::new(parts, leaf_checksum.to_vec(), self.root().to_vec()))
    }

    /// Generate merkle tree inclusion proof bound to an expected root.
    ///
    /// Fails with [`MerkleError::RootMismatch`] before looking for the leaf
    /// if `root_checksum` is not the root of this tree.
    pub fn get_proof(&self, root_checksum: &[u8], leaf_checksum: &[u8]) -> Result<Proof> {
        if root_checksum != self.root() {
            return Err(MerkleError::RootMismatch);
        }
        self.create_proof(leaf_checksum)
    }

    /// Verifies a proof against this tree.
    ///
    /// The proof target must be one of the leafs, the path must have one part
    /// per level below the root, and folding it must reproduce the root.
    pub fn verify_proof(&self, proof: &Proof) -> bool {
        if !self.contains_leaf(proof.target()) {
            return false;
        }
        if proof.len() != self.levels() - 1 {
            return false;
        }
        proof.validate(&mut self.alg.clone(), self.root())
    }

    /// Returns merkle root
    #[inline]
    pub fn root(&self) -> &[u8] {
        &self.nodes[self.nodes.len() - 1].checksum
    }

    /// Returns the arena id of the root node.
    #[inline]
    pub fn root_id(&self) -> NodeId {
        NodeId(self.nodes.len() - 1)
    }

    /// Returns number of rows, leafs and root included.
    #[inline]
    pub fn levels(&self) -> usize {
        self.rows.len()
    }

    /// Returns original number of blocks the tree was built upon.
    #[inline]
    pub fn leafs(&self) -> usize {
        self.rows[0].len()
    }

    /// Returns number of nodes in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the tree holds no nodes, which a built tree never does.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes of row `level`, `0` being the leafs.
    pub fn row(&self, level: usize) -> Option<&[Node]> {
        self.rows.get(level).map(|r| &self.nodes[r.clone()])
    }

    /// Arena ids of row `level`, left to right.
    pub fn row_ids(&self, level: usize) -> Option<impl Iterator<Item = NodeId>> {
        self.rows.get(level).map(|r| r.clone().map(NodeId))
    }

    /// Node by arena id.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Position of the first leaf with checksum `checksum`.
    pub fn leaf_index(&self, checksum: &[u8]) -> Option<usize> {
        self.nodes[self.rows[0].clone()]
            .iter()
            .position(|n| n.checksum == checksum)
    }

    /// Returns `true` if some leaf has checksum `checksum`.
    pub fn contains_leaf(&self, checksum: &[u8]) -> bool {
        self.leaf_index(checksum).is_some()
    }

    /// Block of leaf `i`.
    pub fn block(&self, i: usize) -> Option<&[u8]> {
        self.row(0)
            .and_then(|leafs| leafs.get(i))
            .and_then(Node::block)
    }

    /// Algorithm the tree was built with.
    pub fn algorithm(&self) -> &A {
        &self.alg
    }
}

/// Number of rows in a tree over `leafs` blocks:
/// `ceil(log2(leafs rounded up to even)) + 1`.
///
/// A single block still gets a branch on top (paired with itself), so every
/// tree has at least two levels.
pub fn get_merkle_tree_levels(leafs: usize) -> usize {
    let even = leafs + (leafs & 1);
    if even <= 1 {
        return 1;
    }
    (usize::BITS - (even - 1).leading_zeros()) as usize + 1
}

/// Number of nodes stored for a tree over `leafs` blocks.
pub fn get_merkle_tree_len(leafs: usize) -> usize {
    if leafs == 0 {
        return 0;
    }
    let mut len = leafs;
    let mut width = leafs;
    loop {
        width = (width + 1) / 2;
        len += width;
        if width == 1 {
            break;
        }
    }
    len
}
