use std::fmt;
use std::hash::Hasher;

#[cfg(feature = "sha256")]
use sha2::Digest;

use crate::hash::{Algorithm, Checksum};

fn low_word(digest: &[u8]) -> u64 {
    let mut word = [0u8; 8];
    let n = digest.len().min(8);
    word[..n].copy_from_slice(&digest[..n]);
    u64::from_le_bytes(word)
}

/// SHA-256 with the default `0x00` / `0x01` domain separation.
#[cfg(feature = "sha256")]
#[derive(Clone, Default)]
pub struct Sha256(sha2::Sha256);

#[cfg(feature = "sha256")]
impl Sha256 {
    /// Creates a fresh hasher.
    pub fn new() -> Sha256 {
        Sha256(sha2::Sha256::new())
    }
}

#[cfg(feature = "sha256")]
impl fmt::Debug for Sha256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Sha256")
    }
}

#[cfg(feature = "sha256")]
impl Hasher for Sha256 {
    #[inline]
    fn write(&mut self, msg: &[u8]) {
        Digest::update(&mut self.0, msg)
    }

    fn finish(&self) -> u64 {
        low_word(&self.0.clone().finalize())
    }
}

#[cfg(feature = "sha256")]
impl Algorithm for Sha256 {
    #[inline]
    fn hash(&mut self) -> Checksum {
        self.0.finalize_reset().to_vec()
    }

    #[inline]
    fn reset(&mut self) {
        Digest::reset(&mut self.0);
    }

    fn checksum_len(&self) -> Option<usize> {
        Some(32)
    }
}

/// Bitcoin style double SHA-256: `sha256(sha256(x))`, no domain tags.
///
/// Leaves hash the raw block and branches hash the plain concatenation of
/// their children.
#[cfg(feature = "sha256")]
#[derive(Clone, Default)]
pub struct Sha256d(sha2::Sha256);

#[cfg(feature = "sha256")]
impl Sha256d {
    /// Creates a fresh hasher.
    pub fn new() -> Sha256d {
        Sha256d(sha2::Sha256::new())
    }
}

#[cfg(feature = "sha256")]
impl fmt::Debug for Sha256d {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Sha256d")
    }
}

#[cfg(feature = "sha256")]
impl Hasher for Sha256d {
    #[inline]
    fn write(&mut self, msg: &[u8]) {
        Digest::update(&mut self.0, msg)
    }

    fn finish(&self) -> u64 {
        low_word(&sha2::Sha256::digest(self.0.clone().finalize()))
    }
}

#[cfg(feature = "sha256")]
impl Algorithm for Sha256d {
    #[inline]
    fn hash(&mut self) -> Checksum {
        let first = self.0.finalize_reset();
        sha2::Sha256::digest(first).to_vec()
    }

    #[inline]
    fn reset(&mut self) {
        Digest::reset(&mut self.0);
    }

    fn checksum_len(&self) -> Option<usize> {
        Some(32)
    }

    fn leaf(&mut self, block: &[u8]) -> Checksum {
        self.reset();
        self.write(block);
        self.hash()
    }

    fn node(&mut self, left: &[u8], right: &[u8]) -> Checksum {
        self.reset();
        self.write(left);
        self.write(right);
        self.hash()
    }
}

/// BLAKE3 with the default `0x00` / `0x01` domain separation.
#[cfg(feature = "blake3")]
#[derive(Clone, Default)]
pub struct Blake3(blake3::Hasher);

#[cfg(feature = "blake3")]
impl Blake3 {
    /// Creates a fresh hasher.
    pub fn new() -> Blake3 {
        Blake3(blake3::Hasher::new())
    }
}

#[cfg(feature = "blake3")]
impl fmt::Debug for Blake3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Blake3")
    }
}

#[cfg(feature = "blake3")]
impl Hasher for Blake3 {
    #[inline]
    fn write(&mut self, msg: &[u8]) {
        self.0.update(msg);
    }

    fn finish(&self) -> u64 {
        low_word(self.0.finalize().as_bytes())
    }
}

#[cfg(feature = "blake3")]
impl Algorithm for Blake3 {
    #[inline]
    fn hash(&mut self) -> Checksum {
        let out = self.0.finalize();
        self.0.reset();
        out.as_bytes().to_vec()
    }

    #[inline]
    fn reset(&mut self) {
        self.0.reset();
    }

    fn checksum_len(&self) -> Option<usize> {
        Some(blake3::OUT_LEN)
    }
}

#[cfg(test)]
mod tests {
    #[allow(unused_imports)]
    use super::*;

    #[cfg(feature = "sha256")]
    #[test]
    fn test_sha256_leaf_is_tagged() {
        let mut a = Sha256::new();
        let expected = sha2::Sha256::digest([&[0x00u8][..], &b"alpha"[..]].concat()).to_vec();
        assert_eq!(a.leaf(b"alpha"), expected);
        assert_eq!(a.checksum_len(), Some(32));
    }

    #[cfg(feature = "sha256")]
    #[test]
    fn test_sha256d_leaf() {
        // https://bitcoin.stackexchange.com/questions/5671
        let mut a = Sha256d::new();
        let h = a.leaf(b"hello");
        let mut reversed = h.clone();
        reversed.reverse();
        assert_eq!(
            hex::encode(reversed),
            "503d8319a48348cdc610a582f7bf754b5833df65038606eb48510790dfc99595"
        );
    }

    #[cfg(feature = "sha256")]
    #[test]
    fn test_hash_resets_state() {
        let mut a = Sha256::new();
        a.write(b"alpha");
        let first = a.hash();
        a.write(b"alpha");
        assert_eq!(a.hash(), first);
    }

    #[cfg(feature = "blake3")]
    #[test]
    fn test_blake3_node_is_tagged() {
        let mut a = Blake3::new();
        let l = [1u8; 32];
        let r = [2u8; 32];
        let mut h = blake3::Hasher::new();
        h.update(&[0x01]);
        h.update(&l);
        h.update(&r);
        assert_eq!(a.node(&l, &r), h.finalize().as_bytes().to_vec());
        assert_eq!(a.checksum_len(), Some(32));
    }
}
