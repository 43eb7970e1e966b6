#![cfg(test)]
#![cfg(feature = "blake3")]

use merkle_audit::{Algorithm, Blake3, BuildConfig, Checksum, FnAlgorithm, MerkleTree};

mod common;

fn blake3_digest(data: &[u8]) -> Checksum {
    blake3::hash(data).as_bytes().to_vec()
}

#[test]
fn test_blake3_matches_reference() {
    let mut a = Blake3::new();
    let mut leaf_input = vec![0x00];
    leaf_input.extend_from_slice(b"alpha");
    assert_eq!(a.leaf(b"alpha"), blake3_digest(&leaf_input));

    let l = a.leaf(b"alpha");
    let r = a.leaf(b"beta");
    let mut node_input = vec![0x01];
    node_input.extend_from_slice(&l);
    node_input.extend_from_slice(&r);
    assert_eq!(a.node(&l, &r), blake3_digest(&node_input));
    assert_eq!(a.checksum_len(), Some(32));
}

#[test]
fn test_blake3_same_tree_as_fn_adapter() {
    common::init_logger();

    let blocks = common::blocks(37);
    let native = MerkleTree::new(Blake3::new(), &blocks).unwrap();
    let adapted = MerkleTree::new(FnAlgorithm::tagged(blake3_digest), &blocks).unwrap();
    assert_eq!(native.root(), adapted.root());

    // untagged hashing gives another tree
    let plain = MerkleTree::new(FnAlgorithm::plain(blake3_digest), &blocks).unwrap();
    assert_ne!(native.root(), plain.root());
}

#[test]
fn test_blake3_proofs() {
    common::init_logger();

    let blocks = common::blocks(100);
    let t = MerkleTree::new_with_config(Blake3::new(), &blocks, BuildConfig::parallel()).unwrap();
    assert_eq!(t.levels(), 8);

    let mut a = Blake3::new();
    for block in &blocks {
        let p = t.create_proof(&a.leaf(block)).unwrap();
        assert_eq!(p.len(), 7);
        assert_eq!(p.try_validate(&mut a, t.root()), Ok(true));
        assert!(p.validate_with_data(&mut a, block, t.root()));
        assert!(t.verify_proof(&p));
    }
}
