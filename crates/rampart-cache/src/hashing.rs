//! Key to node assignment.
//!
//! Plain modulo hashing: the SHA-256 digest of the key, read as a big-endian
//! unsigned integer, reduced modulo the number of active nodes. Any change in
//! node count remaps most keys, not only those of the lost node.

use sha2::{Digest, Sha256};

/// Returns the index of the node owning `key`, or `None` for an empty cluster.
pub fn shard_index(key: &str, node_count: usize) -> Option<usize> {
    if node_count == 0 {
        return None;
    }

    let digest = Sha256::digest(key.as_bytes());
    let modulus = node_count as u128;

    // Horner reduction keeps the accumulator below node_count
    let index = digest
        .iter()
        .fold(0u128, |acc, byte| (acc * 256 + u128::from(*byte)) % modulus);

    Some(index as usize)
}
