//! PKCE (RFC 7636) verifier/challenge generation, S256 only.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};

/// Random bytes behind every token (43 characters once encoded)
const TOKEN_BYTES: usize = 32;

/// The only challenge method sent to the provider
pub const CHALLENGE_METHOD: &str = "S256";

/// Generate a URL-safe random token from the OS RNG.
///
/// Used for both the state nonce and the code verifier.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// base64url(SHA-256(verifier)) without padding
pub fn code_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

/// Verifier kept server-side plus the challenge sent to the provider
#[derive(Clone, Debug)]
pub struct PkcePair {
    pub verifier: String,
    pub challenge: String,
}

impl PkcePair {
    pub fn generate() -> Self {
        let verifier = generate_token();
        let challenge = code_challenge(&verifier);
        Self {
            verifier,
            challenge,
        }
    }
}
