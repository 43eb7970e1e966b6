use thiserror::Error;

/// Errors from merkle tree construction and proof handling.
///
/// A proof that simply does not match a root is not an error: verification
/// reports it as `false`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MerkleError {
    /// The builder was handed something it cannot build a tree from.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The requested leaf checksum is not in the base row of the tree.
    #[error("leaf checksum not found in tree")]
    NotFound,
    /// The expected root checksum differs from the root of the tree.
    #[error("root checksum mismatch")]
    RootMismatch,
    /// A proof has an impossible shape, could not be decoded, or is too
    /// large to encode.
    #[error("malformed proof: {0}")]
    MalformedProof(String),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, MerkleError>;
