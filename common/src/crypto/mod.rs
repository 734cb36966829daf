pub mod hash;
pub mod keys;

pub use hash::{hash, Hash, HashError, HASH_SIZE};
pub use keys::{
    KeyError, KeyPair, PublicKey, SecretKey, Signature, PUBLIC_KEY_SIZE, SECRET_KEY_SIZE,
    SIGNATURE_SIZE,
};

/// Compute the deterministic address of a registry record.
///
/// Formula: address = blake3(0xfd || tag || key)
///
/// Records of different purposes (identity, last-tx, recovery authority,
/// two-auth parameters, transaction approval) use distinct tags so the same
/// key never collides across purposes.
pub fn derive_record_address(tag: &[u8], key: &PublicKey) -> Hash {
    let mut data = Vec::with_capacity(1 + tag.len() + PUBLIC_KEY_SIZE);
    data.push(0xfd);
    data.extend_from_slice(tag);
    data.extend_from_slice(key.as_bytes());
    hash(&data)
}
