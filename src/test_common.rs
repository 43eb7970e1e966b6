use crate::hash::*;
use crate::merkle::MerkleTree;
use std::collections::hash_map::DefaultHasher;
use std::hash::Hasher;

pub const GREEK: [&str; 8] = [
    "alpha", "beta", "kappa", "gamma", "epsilon", "omega", "mu", "zeta",
];

pub type Identity = FnAlgorithm<fn(&[u8]) -> Checksum>;

fn concat(data: &[u8]) -> Checksum {
    data.to_vec()
}

/// "Hash" returning its input: checksums read as the concatenation of the
/// blocks below them.
pub fn identity() -> Identity {
    let f: fn(&[u8]) -> Checksum = concat;
    FnAlgorithm::plain(f)
}

pub fn bytes_to_str(xs: &[u8]) -> String {
    String::from_utf8_lossy(xs).into_owned()
}

pub fn greek_tree(n: usize) -> MerkleTree<Identity> {
    MerkleTree::new(identity(), &GREEK[..n]).expect("failed to create tree")
}

/// Small fixed size tagged hash over std's SipHash, order sensitive.
#[derive(Debug, Clone, Default)]
pub struct Sip64(DefaultHasher);

impl Hasher for Sip64 {
    fn write(&mut self, msg: &[u8]) {
        self.0.write(msg)
    }

    fn finish(&self) -> u64 {
        self.0.finish()
    }
}

impl Algorithm for Sip64 {
    #[inline]
    fn hash(&mut self) -> Checksum {
        self.0.finish().to_le_bytes().to_vec()
    }

    #[inline]
    fn reset(&mut self) {
        *self = Sip64::default();
    }

    fn checksum_len(&self) -> Option<usize> {
        Some(8)
    }
}

pub fn sip_tree(leafs: usize) -> MerkleTree<Sip64> {
    let blocks = (0..leafs).map(|i| ((i * 93) as u64).to_le_bytes());
    MerkleTree::new(Sip64::default(), blocks).expect("failed to create tree")
}
