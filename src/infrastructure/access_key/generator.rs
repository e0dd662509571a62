//! Opaque access token generation
//!
//! Tokens are cryptographically random, URL-safe strings; collisions are
//! negligible and the store enforces uniqueness as a backstop.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::RngCore;
use sha2::{Digest, Sha256};

const DEFAULT_TOKEN_BYTES: usize = 32;

/// Generator for opaque access key tokens
#[derive(Debug, Clone)]
pub struct AccessTokenGenerator {
    token_bytes: usize,
}

impl AccessTokenGenerator {
    pub fn new() -> Self {
        Self {
            token_bytes: DEFAULT_TOKEN_BYTES,
        }
    }

    pub fn with_token_bytes(mut self, bytes: usize) -> Self {
        self.token_bytes = bytes;
        self
    }

    /// Generate a fresh random token
    pub fn generate(&self) -> String {
        let mut random_bytes = vec![0u8; self.token_bytes];
        rand::thread_rng().fill_bytes(&mut random_bytes);
        URL_SAFE_NO_PAD.encode(&random_bytes)
    }

    /// Digest of a token, for audit logging without exposing the credential
    pub fn digest(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        URL_SAFE_NO_PAD.encode(hasher.finalize())
    }
}

impl Default for AccessTokenGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_uniqueness() {
        let generator = AccessTokenGenerator::new();
        let a = generator.generate();
        let b = generator.generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_token_length() {
        // 32 random bytes base64-encode to 43 characters without padding
        let token = AccessTokenGenerator::new().generate();
        assert_eq!(token.len(), 43);

        let long = AccessTokenGenerator::new().with_token_bytes(64).generate();
        assert!(long.len() > token.len());
    }

    #[test]
    fn test_token_is_url_safe() {
        let token = AccessTokenGenerator::new().generate();
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_digest_deterministic() {
        let d1 = AccessTokenGenerator::digest("some-token");
        let d2 = AccessTokenGenerator::digest("some-token");
        assert_eq!(d1, d2);
        assert_ne!(d1, AccessTokenGenerator::digest("other-token"));
    }
}
