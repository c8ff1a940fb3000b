//! OAuth 2.0 authorization-code flow with PKCE for HubSpot.
//!
//! 1. Frontend posts user/org → [`HubSpotOAuth::authorize`] returns the provider URL
//!    (state and verifier stored for 10 minutes)
//! 2. User authorizes on HubSpot, which redirects to the callback
//! 3. [`HubSpotOAuth::handle_callback`] checks the state nonce, redeems the code with
//!    the verifier, stores the token response and closes the popup
//! 4. Frontend collects the token once via [`HubSpotOAuth::get_credentials`]

mod exchange;
mod pkce;
mod provider;
mod state;


pub use exchange::{exchange_code_for_token, TokenGrant};
pub use pkce::{code_challenge, generate_token, PkcePair, CHALLENGE_METHOD};
pub use provider::build_auth_url;
pub use state::AuthState;

use crate::config::HubSpotConfig;
use crate::credentials::Credential;
use crate::error::IntegrationError;
use crate::store::{credentials_key, state_key, verifier_key, KeyValueStore};
use axum::response::Html;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Page returned to the popup once the handshake completes
pub const CLOSE_WINDOW_HTML: &str = "<html><script>window.close();</script></html>";

/// OAuth callback query parameters
#[derive(Debug, Default, Deserialize)]
pub struct OAuthCallback {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// HubSpot OAuth handshake bound to a session store.
#[derive(Clone)]
pub struct HubSpotOAuth {
    config: Arc<HubSpotConfig>,
    store: Arc<dyn KeyValueStore>,
    http_client: reqwest::Client,
}

impl HubSpotOAuth {
    pub fn new(
        config: HubSpotConfig,
        store: Arc<dyn KeyValueStore>,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            config: Arc::new(config),
            store,
            http_client,
        }
    }

    pub fn config(&self) -> &HubSpotConfig {
        &self.config
    }

    fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.config.session_ttl_seconds)
    }

    /// Start the handshake for `(user_id, org_id)` and return the authorization URL.
    ///
    /// State and verifier are written concurrently; a failed write is logged
    /// and the callback will later reject the session.
    pub async fn authorize(&self, user_id: &str, org_id: &str) -> Result<String, IntegrationError> {
        if !self.config.is_configured() {
            error!("HubSpot OAuth client credentials are not configured");
            return Err(IntegrationError::Server(
                "OAuth not configured for HubSpot. Set HUBSPOT_CLIENT_ID and HUBSPOT_CLIENT_SECRET environment variables."
                    .to_string(),
            ));
        }

        let auth_state = AuthState::new(user_id, org_id);
        let pkce = PkcePair::generate();

        let state_json = auth_state.to_json().map_err(|e| {
            error!(error = %e, "Failed to serialize OAuth state");
            IntegrationError::Server("Failed to start authorization".to_string())
        })?;
        let encoded_state = auth_state.encode().map_err(|e| {
            error!(error = %e, "Failed to encode OAuth state");
            IntegrationError::Server("Failed to start authorization".to_string())
        })?;

        let ttl = self.session_ttl();
        let state_key = state_key(org_id, user_id);
        let verifier_key = verifier_key(org_id, user_id);
        let (state_result, verifier_result) = tokio::join!(
            self.store.set_with_expiry(&state_key, &state_json, ttl),
            self.store.set_with_expiry(&verifier_key, &pkce.verifier, ttl),
        );
        for (key, result) in [(&state_key, state_result), (&verifier_key, verifier_result)] {
            if let Err(e) = result {
                warn!(key = %key, error = %e, "Failed to persist OAuth session value");
            }
        }

        info!(org_id = %org_id, user_id = %user_id, "Built HubSpot authorization URL");

        Ok(build_auth_url(&self.config, &encoded_state, &pkce.challenge))
    }

    /// Finish the handshake: validate state, redeem the code, store the token.
    pub async fn handle_callback(
        &self,
        callback: OAuthCallback,
    ) -> Result<Html<&'static str>, IntegrationError> {
        debug!("HubSpot OAuth callback received");

        if let Some(error) = callback.error {
            let description = callback.error_description.unwrap_or_else(|| error.clone());
            warn!(
                error = %error,
                description = %description,
                "HubSpot authorization failed"
            );
            return Err(IntegrationError::Client(description));
        }

        let encoded_state = callback
            .state
            .ok_or_else(|| IntegrationError::Client("Missing 'state' parameter".to_string()))?;
        let returned = AuthState::decode(&encoded_state)?;
        let (org_id, user_id) = (returned.org_id.as_str(), returned.user_id.as_str());

        let state_key = state_key(org_id, user_id);
        let saved_nonce = self
            .store
            .get(&state_key)
            .await?
            .and_then(|raw| serde_json::from_str::<AuthState>(&raw).ok())
            .map(|saved| saved.state);

        if saved_nonce.as_deref() != Some(returned.state.as_str()) {
            warn!(org_id = %org_id, user_id = %user_id, "OAuth state mismatch (possible CSRF)");
            return Err(IntegrationError::Client("State does not match.".to_string()));
        }

        let verifier_key = verifier_key(org_id, user_id);
        let code_verifier = self.store.get(&verifier_key).await?.ok_or_else(|| {
            warn!(org_id = %org_id, user_id = %user_id, "PKCE verifier missing or expired");
            IntegrationError::Client("Code verifier not found".to_string())
        })?;

        let code = callback
            .code
            .ok_or_else(|| IntegrationError::Client("Missing 'code' parameter".to_string()))?;

        debug!(org_id = %org_id, user_id = %user_id, "State validated, exchanging code");
        let grant =
            exchange_code_for_token(&self.http_client, &self.config, &code, &code_verifier).await?;

        // Stored as received from the provider
        self.store
            .set_with_expiry(
                &credentials_key(org_id, user_id),
                &grant.raw,
                self.session_ttl(),
            )
            .await?;

        // Best-effort cleanup
        let (state_result, verifier_result) = tokio::join!(
            self.store.delete(&state_key),
            self.store.delete(&verifier_key),
        );
        for (key, result) in [(&state_key, state_result), (&verifier_key, verifier_result)] {
            if let Err(e) = result {
                warn!(key = %key, error = %e, "Failed to delete OAuth session value");
            }
        }

        info!(
            org_id = %org_id,
            user_id = %user_id,
            has_refresh_token = grant.credential.refresh_token.is_some(),
            "HubSpot OAuth flow completed successfully"
        );

        Ok(Html(CLOSE_WINDOW_HTML))
    }

    /// Hand out the stored token response, at most once per handshake.
    pub async fn get_credentials(
        &self,
        user_id: &str,
        org_id: &str,
    ) -> Result<Credential, IntegrationError> {
        let raw = self
            .store
            .take(&credentials_key(org_id, user_id))
            .await?
            .ok_or_else(|| {
                debug!(org_id = %org_id, user_id = %user_id, "No stored HubSpot credentials");
                IntegrationError::Client("No credentials found.".to_string())
            })?;

        serde_json::from_str(&raw).map_err(|e| {
            error!(org_id = %org_id, user_id = %user_id, error = %e, "Stored credentials are corrupt");
            IntegrationError::Server("Failed to read stored credentials".to_string())
        })
    }
}
