//! HubSpot authorization URL construction.

use super::pkce::CHALLENGE_METHOD;
use crate::config::HubSpotConfig;

/// Build the authorization URL the browser is sent to.
///
/// Scopes are space separated and therefore appear as `%20` in the query.
pub fn build_auth_url(config: &HubSpotConfig, state: &str, code_challenge: &str) -> String {
    let scopes = config.scopes.join(" ");
    format!(
        "{}?client_id={}&scope={}&redirect_uri={}&state={}&code_challenge={}&code_challenge_method={}",
        config.authorization_url,
        urlencoding::encode(&config.client_id),
        urlencoding::encode(&scopes),
        urlencoding::encode(&config.redirect_uri),
        urlencoding::encode(state),
        urlencoding::encode(code_challenge),
        CHALLENGE_METHOD
    )
}
