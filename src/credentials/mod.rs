//! HubSpot OAuth credentials.
//!
//! The token response is kept whole: besides the standard fields HubSpot
//! returns extra metadata, which is preserved in `extra`. The session store
//! holds the provider's raw body; this type validates and reads it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Token response from the provider's token endpoint.
///
/// # Security
/// - Held in the session store for a short TTL and read exactly once
/// - Never log these values
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    /// OAuth access token (used for API requests)
    pub access_token: String,

    /// OAuth refresh token (used to obtain new access tokens)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Access token lifetime in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,

    /// Any other fields of the token response
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
