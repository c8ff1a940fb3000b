//! Anti-CSRF state carried through the provider redirect.
//!
//! The `state` query parameter is `base64url(JSON)` of [`AuthState`]. The
//! same JSON is stored under the state key so the callback can compare
//! nonces.

use super::pkce::generate_token;
use crate::error::IntegrationError;
use base64::{
    alphabet,
    engine::{general_purpose::URL_SAFE, DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine,
};
use serde::{Deserialize, Serialize};

/// Decoder that accepts the blob with or without `=` padding
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// OAuth state: random nonce plus the session it belongs to
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthState {
    /// Random nonce
    pub state: String,
    pub user_id: String,
    pub org_id: String,
}

impl AuthState {
    /// Fresh state with a random nonce
    pub fn new(user_id: &str, org_id: &str) -> Self {
        Self {
            state: generate_token(),
            user_id: user_id.to_string(),
            org_id: org_id.to_string(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Encode for the `state` query parameter
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        Ok(URL_SAFE.encode(self.to_json()?))
    }

    /// Decode the `state` query parameter echoed back by the provider
    pub fn decode(encoded: &str) -> Result<Self, IntegrationError> {
        let bytes = URL_SAFE_LENIENT
            .decode(encoded)
            .map_err(|_| IntegrationError::Client("Invalid state parameter.".to_string()))?;

        serde_json::from_slice(&bytes)
            .map_err(|_| IntegrationError::Client("Invalid state parameter.".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    #[test]
    fn test_encode_decode_round_trip() {
        let state = AuthState::new("TestUser", "TestOrg");
        let decoded = AuthState::decode(&state.encode().unwrap()).unwrap();
        assert_eq!(decoded, state);
    }

    #[test]
    fn test_new_states_have_distinct_nonces() {
        let a = AuthState::new("u", "o");
        let b = AuthState::new("u", "o");
        assert_ne!(a.state, b.state);
    }

    #[test]
    fn test_decode_accepts_unpadded() {
        let json = r#"{"state":"abc","user_id":"u1","org_id":"o1"}"#;
        let decoded = AuthState::decode(&URL_SAFE_NO_PAD.encode(json)).unwrap();
        assert_eq!(decoded.state, "abc");
        assert_eq!(decoded.user_id, "u1");
        assert_eq!(decoded.org_id, "o1");
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = AuthState::decode("%%%not-base64%%%").unwrap_err();
        assert!(matches!(err, IntegrationError::Client(_)));

        // Valid base64, not the expected JSON
        let err = AuthState::decode(&URL_SAFE.encode(r#"{"foo":1}"#)).unwrap_err();
        assert!(matches!(err, IntegrationError::Client(_)));
    }
}
