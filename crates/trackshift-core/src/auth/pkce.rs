//! PKCE verifier/challenge/state generation (RFC 7636, S256 method).

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::session::AccountType;

/// Generates a cryptographically random code verifier.
///
/// 64 random bytes, URL-safe base64 without padding (86 characters,
/// within the 43-128 range RFC 7636 allows).
pub fn generate_code_verifier() -> String {
    let mut bytes = [0u8; 64];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Computes the S256 code challenge from a code verifier.
///
/// `challenge = BASE64URL(SHA256(verifier))`
pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Generates a cryptographically random CSRF state parameter.
///
/// 32 random bytes, hex-encoded (64 characters).
pub fn generate_state() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// The one-time verifier/challenge/state triple for an in-flight login.
///
/// Exactly one challenge is pending at a time; it is consumed on the first
/// callback regardless of outcome so an authorization code can never be
/// replayed against a stale verifier.
#[derive(Debug, Clone)]
pub struct PkceChallenge {
    pub code_verifier: String,
    pub state: String,
    pub account: AccountType,
    pub created_at: DateTime<Utc>,
}

impl PkceChallenge {
    /// Generate a fresh triple for the given account.
    pub fn generate(account: AccountType) -> Self {
        Self {
            code_verifier: generate_code_verifier(),
            state: generate_state(),
            account,
            created_at: Utc::now(),
        }
    }

    /// Challenge derived from this triple's verifier.
    pub fn code_challenge(&self) -> String {
        generate_code_challenge(&self.code_verifier)
    }
}
