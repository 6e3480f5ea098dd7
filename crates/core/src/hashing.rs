//! SHA-256 hex digests for refresh tokens.
//!
//! Only the digest of a refresh token is ever persisted. The digest is
//! deterministic so it can serve as an indexed equality lookup key.

use sha2::{Digest, Sha256};

/// Compute a SHA-256 hex digest of the given bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    format!("{hash:x}")
}

/// Hash a raw refresh token into the value stored in `user_sessions.token_hash`.
pub fn hash_token(token: &str) -> String {
    sha256_hex(token.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_produces_known_hash() {
        let hash = sha256_hex(b"");
        assert_eq!(
            hash,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn token_hash_is_stable_hex() {
        let token = "eyJhbGciOiJIUzI1NiJ9.payload.signature";
        assert_eq!(hash_token(token), hash_token(token));
        assert_eq!(hash_token(token).len(), 64);
        assert!(hash_token(token).chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn different_tokens_hash_differently() {
        assert_ne!(hash_token("token-a"), hash_token("token-b"));
    }
}
