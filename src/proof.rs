use bincode::{Decode, Encode};

use crate::error::{MerkleError, Result};
use crate::hash::{Algorithm, Checksum};

/// Upper bound on proof parts: one per level of a tree whose leaf count fits
/// in a `usize`.
pub const MAX_PROOF_PARTS: usize = usize::BITS as usize;

/// Upper bound on the encoded size of a proof accepted by [`Proof::from_bytes`].
pub const MAX_PROOF_BYTES: usize = 1 << 20;

/// One step of an audit path.
///
/// `is_right` tells on which side of the running checksum the sibling sits:
/// `true` folds as `node(running, sibling)`, `false` as
/// `node(sibling, running)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Encode, Decode)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProofPart {
    is_right: bool,
    checksum: Checksum,
}

impl ProofPart {
    /// Creates a proof step.
    pub fn new(is_right: bool, checksum: Checksum) -> ProofPart {
        ProofPart { is_right, checksum }
    }

    /// Whether the sibling is concatenated to the right of the running checksum.
    #[inline]
    pub fn is_right(&self) -> bool {
        self.is_right
    }

    /// Sibling checksum.
    #[inline]
    pub fn checksum(&self) -> &[u8] {
        &self.checksum
    }
}

/// Merkle tree inclusion proof (audit path) for one leaf.
///
/// Layout:
///
/// ```text
/// target, [ part(level 0) part(level 1) ... part(levels - 2) ], root
/// ```
///
/// Parts are ordered from the leaf towards the root. Folding them over the
/// target with the tree's [`Algorithm`] recomputes the root, so a proof can
/// be checked without the tree it came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Encode, Decode)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Proof {
    parts: Vec<ProofPart>,
    target: Checksum,
    root: Checksum,
}

impl Proof {
    /// Creates new MT inclusion proof
    pub fn new(parts: Vec<ProofPart>, target: Checksum, root: Checksum) -> Proof {
        Proof {
            parts,
            target,
            root,
        }
    }

    /// Return proof target leaf checksum
    #[inline]
    pub fn target(&self) -> &[u8] {
        &self.target
    }

    /// Return root checksum of the tree the proof was generated from
    #[inline]
    pub fn root(&self) -> &[u8] {
        &self.root
    }

    /// Return audit path, leaf side first
    #[inline]
    pub fn parts(&self) -> &[ProofPart] {
        &self.parts
    }

    /// Number of parts in the path.
    #[inline]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Returns `true` if the path has no parts.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Recomputes the root implied by the path.
    pub fn fold<A: Algorithm>(&self, alg: &mut A) -> Checksum {
        self.parts.iter().fold(self.target.clone(), |running, part| {
            if part.is_right {
                alg.node(&running, &part.checksum)
            } else {
                alg.node(&part.checksum, &running)
            }
        })
    }

    /// Verifies MT inclusion proof against `root`.
    ///
    /// Returns `false` for an empty path or when the folded checksum differs
    /// from `root`. Never panics, whatever the proof contains.
    pub fn validate<A: Algorithm>(&self, alg: &mut A, root: &[u8]) -> bool {
        if self.parts.is_empty() {
            return false;
        }
        self.fold(alg) == root
    }

    /// Verifies MT inclusion proof and that `block` is the data the target
    /// leaf was built from.
    pub fn validate_with_data<A: Algorithm>(&self, alg: &mut A, block: &[u8], root: &[u8]) -> bool {
        alg.leaf(block) == self.target && self.validate(alg, root)
    }

    /// Checks the structural shape of the proof for algorithm `alg`.
    ///
    /// Fails with [`MerkleError::MalformedProof`] for an empty or impossibly
    /// long path, an empty target, or checksums whose length differs from the
    /// fixed output length of `alg`.
    pub fn check<A: Algorithm>(&self, alg: &A) -> Result<()> {
        if self.parts.is_empty() {
            return Err(MerkleError::MalformedProof("empty audit path".to_string()));
        }
        if self.parts.len() > MAX_PROOF_PARTS {
            return Err(MerkleError::MalformedProof(format!(
                "{} parts exceed the maximum of {}",
                self.parts.len(),
                MAX_PROOF_PARTS
            )));
        }
        if self.target.is_empty() {
            return Err(MerkleError::MalformedProof("empty target checksum".to_string()));
        }

        if let Some(len) = alg.checksum_len() {
            if self.target.len() != len {
                return Err(MerkleError::MalformedProof(format!(
                    "target checksum is {} bytes, expected {}",
                    self.target.len(),
                    len
                )));
            }
            if let Some(i) = self.parts.iter().position(|p| p.checksum.len() != len) {
                return Err(MerkleError::MalformedProof(format!(
                    "part {} checksum is {} bytes, expected {}",
                    i,
                    self.parts[i].checksum.len(),
                    len
                )));
            }
        }

        Ok(())
    }

    /// [`Proof::check`] followed by [`Proof::validate`].
    ///
    /// A well formed proof that does not lead to `root` is `Ok(false)`.
    pub fn try_validate<A: Algorithm>(&self, alg: &mut A, root: &[u8]) -> Result<bool> {
        self.check(alg)?;
        Ok(self.validate(alg, root))
    }

    /// Encodes the proof for transmission.
    ///
    /// Only proofs that [`Proof::from_bytes`] would accept are encoded: more
    /// than [`MAX_PROOF_PARTS`] parts, or an encoding longer than
    /// [`MAX_PROOF_BYTES`], is a [`MerkleError::MalformedProof`].
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        if self.parts.len() > MAX_PROOF_PARTS {
            return Err(MerkleError::MalformedProof(format!(
                "{} parts exceed the maximum of {}",
                self.parts.len(),
                MAX_PROOF_PARTS
            )));
        }
        let bytes = bincode::encode_to_vec(self, codec_config())
            .map_err(|e| MerkleError::MalformedProof(format!("encode: {}", e)))?;
        if bytes.len() > MAX_PROOF_BYTES {
            return Err(MerkleError::MalformedProof(format!(
                "encoded proof is {} bytes, limit is {}",
                bytes.len(),
                MAX_PROOF_BYTES
            )));
        }
        Ok(bytes)
    }

    /// Decodes a proof produced by [`Proof::to_bytes`].
    ///
    /// Truncated, oversized or trailing input is a [`MerkleError::MalformedProof`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Proof> {
        let (proof, read): (Proof, usize) = bincode::decode_from_slice(bytes, codec_config())
            .map_err(|e| MerkleError::MalformedProof(format!("decode: {}", e)))?;
        if read != bytes.len() {
            return Err(MerkleError::MalformedProof(format!(
                "{} trailing bytes",
                bytes.len() - read
            )));
        }
        if proof.parts.len() > MAX_PROOF_PARTS {
            return Err(MerkleError::MalformedProof(format!(
                "{} parts exceed the maximum of {}",
                proof.parts.len(),
                MAX_PROOF_PARTS
            )));
        }
        Ok(proof)
    }
}

fn codec_config() -> impl bincode::config::Config {
    bincode::config::standard().with_limit::<MAX_PROOF_BYTES>()
}

#[cfg(test)]
use crate::test_common::{identity, sip_tree, Sip64};

#[cfg(test)]
// Break one element inside the proof.
fn modify_proof(proof: &mut Proof) {
    use rand::prelude::*;

    let mut rng = thread_rng();
    let i = rng.gen_range(0..proof.parts.len());
    let part = &mut proof.parts[i];
    let j = rng.gen_range(0..part.checksum.len());
    part.checksum[j] ^= rng.gen_range(1..=u8::MAX);
}

#[test]
fn test_proofs() {
    for leafs in 1..40 {
        let tree = sip_tree(leafs);
        let mut a = Sip64::default();

        for i in 0..tree.leafs() {
            let target = tree.row(0).unwrap()[i].checksum().to_vec();
            let mut p = tree.create_proof(&target).unwrap();
            assert_eq!(p.len(), tree.levels() - 1);
            assert!(p.validate(&mut a, tree.root()));
            assert!(tree.verify_proof(&p));

            // Break the proof here and assert negative validation.
            modify_proof(&mut p);
            assert!(!p.validate(&mut a, tree.root()));
            assert!(!tree.verify_proof(&p));
        }
    }
}

#[test]
fn test_flipped_orientation_fails() {
    let tree = sip_tree(11);
    let mut a = Sip64::default();

    for i in 0..tree.leafs() {
        let target = tree.row(0).unwrap()[i].checksum().to_vec();
        let p = tree.create_proof(&target).unwrap();
        for k in 0..p.len() {
            let mut parts = p.parts().to_vec();
            parts[k] = ProofPart::new(!parts[k].is_right(), parts[k].checksum().to_vec());
            let flipped = Proof::new(parts, p.target().to_vec(), p.root().to_vec());

            // A duplicated node is its own sibling, orientation cannot matter there.
            if p.parts()[k].checksum() == running_at(&p, k, &mut a) {
                continue;
            }
            assert!(!flipped.validate(&mut a, tree.root()), "leaf {} part {}", i, k);
        }
    }
}

#[cfg(test)]
fn running_at(p: &Proof, k: usize, a: &mut Sip64) -> Checksum {
    Proof::new(p.parts()[..k].to_vec(), p.target().to_vec(), Vec::new()).fold(a)
}

#[test]
fn test_strategies_agree() {
    for leafs in 1..70 {
        let tree = sip_tree(leafs);
        for leaf in tree.row(0).unwrap() {
            let by_parent = tree.create_proof(leaf.checksum()).unwrap();
            let by_index = tree.create_proof_by_index(leaf.checksum()).unwrap();
            assert_eq!(by_parent, by_index);
        }
    }
}

#[test]
fn test_validate_with_data() {
    let blocks: Vec<Vec<u8>> = (0u32..9).map(|x| x.to_le_bytes().to_vec()).collect();
    let tree = crate::merkle::MerkleTree::new(Sip64::default(), &blocks).unwrap();
    let mut a = Sip64::default();

    let target = a.leaf(&blocks[4]);
    let p = tree.create_proof(&target).unwrap();
    assert!(p.validate_with_data(&mut a, &blocks[4], tree.root()));
    assert!(!p.validate_with_data(&mut a, &blocks[5], tree.root()));
}

#[test]
fn test_empty_path_never_validates() {
    let mut a = identity();
    let p = Proof::new(Vec::new(), b"alpha".to_vec(), b"alpha".to_vec());
    assert!(p.is_empty());
    assert!(!p.validate(&mut a, b"alpha"));
    assert_eq!(
        p.try_validate(&mut a, b"alpha"),
        Err(MerkleError::MalformedProof("empty audit path".to_string()))
    );
}

#[test]
fn test_check_rejects_wrong_lengths() {
    let tree = sip_tree(5);
    let mut a = Sip64::default();
    let target = tree.row(0).unwrap()[2].checksum().to_vec();
    let p = tree.create_proof(&target).unwrap();
    assert_eq!(p.try_validate(&mut a, tree.root()), Ok(true));
    assert_eq!(p.try_validate(&mut a, b"not the root"), Ok(false));

    let mut parts = p.parts().to_vec();
    parts[1] = ProofPart::new(parts[1].is_right(), vec![0u8; 3]);
    let short = Proof::new(parts, p.target().to_vec(), p.root().to_vec());
    assert!(matches!(
        short.try_validate(&mut a, tree.root()),
        Err(MerkleError::MalformedProof(_))
    ));
    assert!(!short.validate(&mut a, tree.root()));

    let odd_target = Proof::new(p.parts().to_vec(), vec![1u8; 9], p.root().to_vec());
    assert!(matches!(odd_target.check(&a), Err(MerkleError::MalformedProof(_))));

    let long = Proof::new(
        vec![ProofPart::new(true, vec![0u8; 8]); MAX_PROOF_PARTS + 1],
        p.target().to_vec(),
        p.root().to_vec(),
    );
    assert!(matches!(long.check(&a), Err(MerkleError::MalformedProof(_))));
    assert!(!tree.verify_proof(&long));
}

#[test]
fn test_codec() {
    let tree = sip_tree(13);
    let target = tree.row(0).unwrap()[12].checksum().to_vec();
    let p = tree.create_proof(&target).unwrap();

    let bytes = p.to_bytes().unwrap();
    let decoded = Proof::from_bytes(&bytes).unwrap();
    assert_eq!(decoded, p);
    assert!(tree.verify_proof(&decoded));

    assert!(matches!(
        Proof::from_bytes(&bytes[..bytes.len() - 1]),
        Err(MerkleError::MalformedProof(_))
    ));

    let mut trailing = bytes.clone();
    trailing.push(0);
    assert!(matches!(
        Proof::from_bytes(&trailing),
        Err(MerkleError::MalformedProof(_))
    ));

    assert!(matches!(Proof::from_bytes(&[]), Err(MerkleError::MalformedProof(_))));
}

#[test]
fn test_codec_refuses_undecodable_proofs() {
    let too_long = Proof::new(
        vec![ProofPart::new(true, vec![0u8; 8]); MAX_PROOF_PARTS + 1],
        vec![1u8; 8],
        vec![2u8; 8],
    );
    assert!(matches!(too_long.to_bytes(), Err(MerkleError::MalformedProof(_))));

    let too_big = Proof::new(
        vec![ProofPart::new(true, vec![0u8; MAX_PROOF_BYTES])],
        vec![1u8; 8],
        vec![2u8; 8],
    );
    assert!(matches!(too_big.to_bytes(), Err(MerkleError::MalformedProof(_))));

    // the largest accepted shape still round trips
    let full = Proof::new(
        vec![ProofPart::new(false, vec![3u8; 32]); MAX_PROOF_PARTS],
        vec![1u8; 32],
        vec![2u8; 32],
    );
    let bytes = full.to_bytes().unwrap();
    assert_eq!(Proof::from_bytes(&bytes).unwrap(), full);
}

#[test]
fn test_codec_garbage_does_not_panic() {
    use rand::prelude::*;

    let mut rng = StdRng::seed_from_u64(7);
    for len in 0..256 {
        let mut garbage = vec![0u8; len];
        rng.fill_bytes(&mut garbage);
        if let Ok(p) = Proof::from_bytes(&garbage) {
            let _ = p.validate(&mut Sip64::default(), &[0u8; 8]);
        }
    }
}
