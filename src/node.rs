use crate::hash::Checksum;

/// Position of a node in the arena owned by a [`MerkleTree`](crate::merkle::MerkleTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Arena index of the node.
    pub fn index(self) -> usize {
        self.0
    }
}

/// What a node wraps: one block, or two children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Leaf holding a copy of the caller's block.
    Leaf {
        /// Block data the leaf checksum was computed from.
        block: Vec<u8>,
    },
    /// Branch over two nodes of the row below. When the row had an odd
    /// number of nodes, the last branch has `left == right`.
    Branch {
        /// Left child.
        left: NodeId,
        /// Right child.
        right: NodeId,
    },
}

/// A node of the tree.
///
/// The checksum is computed once when the node is created. `parent` is a
/// non-owning link used to walk from a leaf up to the root and is `None`
/// only for the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub(crate) checksum: Checksum,
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
}

impl Node {
    pub(crate) fn leaf(checksum: Checksum, block: Vec<u8>) -> Node {
        Node {
            checksum,
            kind: NodeKind::Leaf { block },
            parent: None,
        }
    }

    pub(crate) fn branch(checksum: Checksum, left: NodeId, right: NodeId) -> Node {
        Node {
            checksum,
            kind: NodeKind::Branch { left, right },
            parent: None,
        }
    }

    /// Node checksum.
    #[inline]
    pub fn checksum(&self) -> &[u8] {
        &self.checksum
    }

    /// Node contents.
    #[inline]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Parent branch, `None` for the root.
    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Returns `true` if this node wraps a block.
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    /// Block of a leaf, `None` for a branch.
    pub fn block(&self) -> Option<&[u8]> {
        match &self.kind {
            NodeKind::Leaf { block } => Some(block),
            NodeKind::Branch { .. } => None,
        }
    }

    /// `(left, right)` children of a branch, `None` for a leaf.
    pub fn children(&self) -> Option<(NodeId, NodeId)> {
        match self.kind {
            NodeKind::Leaf { .. } => None,
            NodeKind::Branch { left, right } => Some((left, right)),
        }
    }
}
