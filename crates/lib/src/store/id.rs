//! Generated document ids.
//!
//! When a caller saves without an id, the store assigns one: a short random
//! string over `[0-9a-z]`. The generator is non-cryptographic; collision
//! avoidance is statistical, sized for a single-user local store.

use rand::Rng;

use crate::constants::DEFAULT_ID_LENGTH;

const ID_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Returns a random id of `length` characters drawn uniformly from `[0-9a-z]`.
///
/// Pure and synchronous; not required to be unique across calls beyond
/// statistical improbability of collision. Not cryptographically secure.
pub fn uuid(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

/// Returns a random id of the default length.
pub(crate) fn generate_id() -> String {
    uuid(DEFAULT_ID_LENGTH)
}
