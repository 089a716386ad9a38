//! Content hashing and identifier types.
//!
//! Every entity in the chain is identified by a SHA-256 hash of its canonical
//! serialization. Hashing feeds fields into the hasher in a fixed order with
//! an ASCII domain tag, so identical logical content always produces the same
//! identifier across runs and processes. Nothing here is a security boundary:
//! hashes provide identity, equality and chain linkage only.

use sha2::{Digest, Sha256};

/// A 32-byte SHA-256 content hash.
pub type Sha256Hash = [u8; 32];

/// A stable account identifier, assigned at creation and never reassigned.
pub type Address = [u8; 32];

/// Hash an opaque byte string.
pub fn hash_bytes(bytes: &[u8]) -> Sha256Hash {
    Sha256::digest(bytes).into()
}

/// Abbreviated hex form used in log lines.
pub fn short_hex(bytes: &[u8; 32]) -> String {
    hex::encode(&bytes[..4])
}
