use sha2::{Digest, Sha256};

/// Content fingerprint of the raw input bytes. The pipeline is a pure
/// function of its input, so this is a stable memoization key for
/// prepared tables.
pub fn fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    format!("sha256:{}", hex::encode(digest))
}
