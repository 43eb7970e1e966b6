//! Balanced _Merkle Tree_ with audit proofs.
//!
//! Merkle tree (MT) built once over an ordered list of data blocks and
//! read-only afterwards. Every level is fully paired: when a level has an
//! odd number of nodes, its last node is paired with itself. Nodes live in a
//! flat arena; each child keeps the index of its parent so an audit path is
//! collected in `O(log n)` steps from the leaf up.
//!
//! Hashing is pluggable through [`Algorithm`]. By default leaf and branch
//! input is domain separated:
//!
//! ```text
//! leaf(b)      = ALG(0x00 || b)
//! node(l, r)   = ALG(0x01 || l || r)
//! ```
//!
//! An algorithm may override either operation, e.g. [`FnAlgorithm::plain`]
//! or the Bitcoin style `Sha256d`, which hash without tags.
//!
//! Link: [](https://en.wikipedia.org/wiki/Merkle_tree)
//!
//! # Interface
//!
//! ```text
//! - MerkleTree::new (alg, blocks) -> tree
//! - root -> checksum
//! - create_proof (leaf checksum) -> proof
//! - get_proof (root checksum, leaf checksum) -> proof
//! - verify_proof (tree, proof) -> bool
//! - Proof::validate (proof, alg, root) -> bool
//! ```
//!
//! # Quick start
//!
//! ```
//! # #[cfg(feature = "sha256")]
//! # fn main() {
//! use merkle_audit::{Algorithm, MerkleTree, Sha256};
//!
//! let blocks = ["alpha", "beta", "kappa"];
//! let tree = MerkleTree::new(Sha256::new(), blocks).unwrap();
//!
//! let leaf = Sha256::new().leaf(b"kappa");
//! let proof = tree.get_proof(tree.root(), &leaf).unwrap();
//!
//! assert_eq!(proof.len(), 2);
//! assert!(tree.verify_proof(&proof));
//! assert!(proof.validate(&mut Sha256::new(), tree.root()));
//! # }
//! # #[cfg(not(feature = "sha256"))]
//! # fn main() {}
//! ```

#![deny(
    missing_docs,
    unused_qualifications,
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unstable_features,
    unused_import_braces
)]

/// Errors reported by tree and proof operations.
mod error;

/// Hash infrastructure for nodes in Merkle tree.
pub mod hash;

/// Concrete hash algorithms.
#[cfg(any(feature = "sha256", feature = "blake3"))]
mod hash_impl;

/// Arena nodes.
pub mod node;

/// Merkle tree construction and proof generation.
pub mod merkle;

/// Merkle tree inclusion proof
pub mod proof;

/// Text renderings.
mod display;

#[cfg(test)]
mod test_common;


pub use error::{MerkleError, Result};
pub use hash::{Algorithm, Checksum, Domain, FnAlgorithm};
#[cfg(feature = "blake3")]
pub use hash_impl::Blake3;
#[cfg(feature = "sha256")]
pub use hash_impl::{Sha256, Sha256d};
pub use merkle::{BuildConfig, MerkleTree};
pub use node::{Node, NodeId, NodeKind};
pub use proof::{Proof, ProofPart};
