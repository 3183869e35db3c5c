//! Opaque bearer secrets (refresh tokens, password reset tokens).
//!
//! The raw value goes to the client exactly once; the store only ever sees
//! the SHA-256 hex digest.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// 256 bits of entropy
pub const SECRET_BYTES: usize = 32;

#[derive(Clone, PartialEq, Eq)]
pub struct OpaqueSecret(String);

/// The raw refresh secret handed to the client
pub type RawRefreshSecret = OpaqueSecret;

impl OpaqueSecret {
    pub fn generate() -> Self {
        let mut bytes = [0u8; SECRET_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Wrap a value presented by a client
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// Digest stored in place of the secret
    pub fn digest(&self) -> String {
        hash_secret(&self.0)
    }
}

impl std::fmt::Debug for OpaqueSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("OpaqueSecret(<redacted>)")
    }
}

/// SHA-256 hex digest of a raw secret
pub fn hash_secret(raw: &str) -> String {
    format!("{:x}", Sha256::digest(raw.as_bytes()))
}
