use rustc_hash::FxHasher;
use std::hash::Hasher;

/// Deterministic 64-bit hash for entity entries and series keys.
/// Stable across processes and runs; persisted series ids depend on it,
/// so changing the hasher requires a metadata migration.
pub fn stable_hash64(bytes: &[u8]) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write(bytes);
    hasher.finish()
}

/// The big-endian byte form used wherever a hash becomes part of a key.
pub fn stable_hash_bytes(bytes: &[u8]) -> [u8; 8] {
    stable_hash64(bytes).to_be_bytes()
}
