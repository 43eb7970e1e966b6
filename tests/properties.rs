#![cfg(test)]
#![cfg(feature = "sha256")]

use merkle_audit::{Algorithm, BuildConfig, MerkleTree, Proof, ProofPart, Sha256};
use proptest::prelude::*;

mod common;

fn distinct_blocks() -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::btree_set(prop::collection::vec(any::<u8>(), 0..24), 1..70)
        .prop_map(|set| set.into_iter().collect())
}

proptest! {
    #[test]
    fn test_every_leaf_proves(blocks in distinct_blocks()) {
        common::init_logger();

        let t = MerkleTree::new(Sha256::new(), &blocks).unwrap();
        let mut a = Sha256::new();
        for block in &blocks {
            let leaf = a.leaf(block);
            let p = t.create_proof(&leaf).unwrap();
            prop_assert_eq!(p.len(), t.levels() - 1);
            prop_assert!(p.validate(&mut a, t.root()));
            prop_assert!(t.verify_proof(&p));
            prop_assert_eq!(&p, &t.create_proof_by_index(&leaf).unwrap());
        }
    }

    #[test]
    fn test_tampered_proof_fails(
        blocks in distinct_blocks(),
        pick in any::<prop::sample::Index>(),
        part in any::<prop::sample::Index>(),
        byte in 0usize..32,
        mask in 1u8..,
    ) {
        let t = MerkleTree::new(Sha256::new(), &blocks).unwrap();
        let mut a = Sha256::new();
        let block: &Vec<u8> = pick.get(&blocks);
        let leaf = a.leaf(block);
        let p = t.create_proof(&leaf).unwrap();

        let k = part.index(p.len());
        let mut parts = p.parts().to_vec();
        let mut sibling = parts[k].checksum().to_vec();
        sibling[byte] ^= mask;
        parts[k] = ProofPart::new(parts[k].is_right(), sibling);
        let tampered = Proof::new(parts, p.target().to_vec(), p.root().to_vec());

        prop_assert!(!tampered.validate(&mut a, t.root()));
        prop_assert!(!t.verify_proof(&tampered));
    }

    #[test]
    fn test_build_is_deterministic(blocks in distinct_blocks()) {
        let seq = MerkleTree::new_with_config(Sha256::new(), &blocks, BuildConfig::sequential()).unwrap();
        let par = MerkleTree::new_with_config(Sha256::new(), &blocks, BuildConfig::parallel()).unwrap();
        prop_assert_eq!(seq.root(), par.root());
        prop_assert_eq!(seq.len(), par.len());
    }

    #[test]
    fn test_proof_codec(blocks in distinct_blocks(), pick in any::<prop::sample::Index>()) {
        let t = MerkleTree::new(Sha256::new(), &blocks).unwrap();
        let block: &Vec<u8> = pick.get(&blocks);
        let leaf = Sha256::new().leaf(block);
        let p = t.create_proof(&leaf).unwrap();

        let decoded = Proof::from_bytes(&p.to_bytes().unwrap()).unwrap();
        prop_assert_eq!(&decoded, &p);
        prop_assert!(t.verify_proof(&decoded));
    }

    #[test]
    fn test_from_bytes_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        if let Ok(p) = Proof::from_bytes(&bytes) {
            let _ = p.try_validate(&mut Sha256::new(), &[0u8; 32]);
        }
    }
}
