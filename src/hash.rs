//! Hash infrastructure for nodes of the merkle tree.
//!
//! The tree never looks inside a hash function. Everything it needs goes
//! through [`Algorithm`]: a streaming [`Hasher`] that can produce a full
//! length checksum and be reset, plus the two operations the tree actually
//! performs, hashing a leaf block and hashing a pair of child checksums.

use std::fmt;
use std::hash::Hasher;

/// Digest produced by an [`Algorithm`]. It is the identity of a node.
pub type Checksum = Vec<u8>;

/// MT leaf hash prefix
pub const LEAF: u8 = 0x00;

/// MT interior node hash prefix
pub const INTERIOR: u8 = 0x01;

/// Input domain of a hash invocation.
///
/// Prefixing the input with the domain tag keeps a leaf checksum from being
/// replayed as the checksum of a branch and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    /// Raw block data of a leaf.
    Leaf,
    /// Concatenated checksums of the two children of a branch.
    Branch,
}

impl Domain {
    /// Tag byte written in front of the hash input.
    pub const fn tag(self) -> u8 {
        match self {
            Domain::Leaf => LEAF,
            Domain::Branch => INTERIOR,
        }
    }
}

/// Hashing algorithm type.
///
/// Algorithm conforms to the standard [`Hasher`] trait and provides methods to
/// return the full length checksum and to reset its state. `leaf` and `node`
/// are domain separated by default (`0x00` and `0x01` prefixes); an algorithm
/// that wants a different scheme, or none at all, overrides them.
///
/// Algorithms are cloned freely: once per tree, and once per worker when a
/// level is hashed in parallel.
pub trait Algorithm: Hasher + Clone + Send + Sync {
    /// Returns the checksum of the data written since the last reset.
    fn hash(&mut self) -> Checksum;

    /// Resets the hasher state.
    fn reset(&mut self);

    /// Length of every checksum this algorithm produces, if it is fixed.
    fn checksum_len(&self) -> Option<usize> {
        None
    }

    /// Returns the checksum of a leaf block (prefix `0x00`).
    fn leaf(&mut self, block: &[u8]) -> Checksum {
        self.reset();
        self.write_u8(Domain::Leaf.tag());
        self.write(block);
        self.hash()
    }

    /// Returns the checksum of a branch over two children (prefix `0x01`).
    fn node(&mut self, left: &[u8], right: &[u8]) -> Checksum {
        self.reset();
        self.write_u8(Domain::Branch.tag());
        self.write(left);
        self.write(right);
        self.hash()
    }
}

/// Adapter turning a plain one-argument hash function into an [`Algorithm`].
///
/// Written bytes are buffered and handed to the function on [`Algorithm::hash`].
/// [`FnAlgorithm::tagged`] keeps the default domain separation,
/// [`FnAlgorithm::plain`] hashes leaves and branches without any prefix.
#[derive(Clone)]
pub struct FnAlgorithm<F> {
    f: F,
    buf: Vec<u8>,
    separated: bool,
}

impl<F> FnAlgorithm<F>
where
    F: Fn(&[u8]) -> Checksum + Clone + Send + Sync,
{
    /// Wraps `f`, prefixing leaf and branch input with their domain tag.
    pub fn tagged(f: F) -> FnAlgorithm<F> {
        FnAlgorithm {
            f,
            buf: Vec::new(),
            separated: true,
        }
    }

    /// Wraps `f` without domain separation: `leaf(b) = f(b)` and
    /// `node(l, r) = f(l ++ r)`.
    pub fn plain(f: F) -> FnAlgorithm<F> {
        FnAlgorithm {
            f,
            buf: Vec::new(),
            separated: false,
        }
    }

    /// Whether leaf and branch input carry a domain tag.
    pub fn is_domain_separated(&self) -> bool {
        self.separated
    }
}

impl<F> fmt::Debug for FnAlgorithm<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnAlgorithm")
            .field("buffered", &self.buf.len())
            .field("separated", &self.separated)
            .finish()
    }
}

impl<F> Hasher for FnAlgorithm<F>
where
    F: Fn(&[u8]) -> Checksum,
{
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    fn finish(&self) -> u64 {
        let digest = (self.f)(&self.buf);
        let mut word = [0u8; 8];
        let n = digest.len().min(8);
        word[..n].copy_from_slice(&digest[..n]);
        u64::from_le_bytes(word)
    }
}

impl<F> Algorithm for FnAlgorithm<F>
where
    F: Fn(&[u8]) -> Checksum + Clone + Send + Sync,
{
    #[inline]
    fn hash(&mut self) -> Checksum {
        (self.f)(&self.buf)
    }

    #[inline]
    fn reset(&mut self) {
        self.buf.clear();
    }

    fn leaf(&mut self, block: &[u8]) -> Checksum {
        self.reset();
        if self.separated {
            self.write_u8(Domain::Leaf.tag());
        }
        self.write(block);
        self.hash()
    }

    fn node(&mut self, left: &[u8], right: &[u8]) -> Checksum {
        self.reset();
        if self.separated {
            self.write_u8(Domain::Branch.tag());
        }
        self.write(left);
        self.write(right);
        self.hash()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(data: &[u8]) -> Checksum {
        data.to_vec()
    }

    #[test]
    fn test_domain_tags_differ() {
        assert_eq!(Domain::Leaf.tag(), 0x00);
        assert_eq!(Domain::Branch.tag(), 0x01);
    }

    #[test]
    fn test_fn_algorithm_tagged() {
        let mut a = FnAlgorithm::tagged(identity);
        assert!(a.is_domain_separated());
        assert_eq!(a.leaf(b"ab"), vec![0x00, b'a', b'b']);
        assert_eq!(a.node(b"a", b"b"), vec![0x01, b'a', b'b']);
    }

    #[test]
    fn test_fn_algorithm_plain() {
        let mut a = FnAlgorithm::plain(identity);
        assert!(!a.is_domain_separated());
        assert_eq!(a.leaf(b"alpha"), b"alpha".to_vec());
        assert_eq!(a.node(b"alpha", b"beta"), b"alphabeta".to_vec());
    }

    #[test]
    fn test_fn_algorithm_resets_between_calls() {
        let mut a = FnAlgorithm::plain(identity);
        a.write(b"garbage");
        assert_eq!(a.leaf(b"x"), b"x".to_vec());
        assert_eq!(a.leaf(b"y"), b"y".to_vec());
    }

    #[test]
    fn test_finish_takes_low_word() {
        let mut a = FnAlgorithm::plain(identity);
        a.write(&[1, 0, 0, 0, 0, 0, 0, 0, 9]);
        assert_eq!(a.finish(), 1);
        a.reset();
        a.write(&[2]);
        assert_eq!(a.finish(), 2);
    }
}
